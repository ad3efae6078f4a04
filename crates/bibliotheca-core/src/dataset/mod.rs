//! Integer datasets read from text files, with an access-logging proxy.
mod source;
mod stats;

pub use source::{FileNumberSource, LoggingNumberSource};
pub use stats::{NumberService, NumberStats};

use std::path::PathBuf;

use crate::error::Result;
use crate::observer::Observer;

/// A provider of integers.
pub trait NumberSource {
    /// Current numbers, reloading first if the backing data changed.
    fn numbers(&mut self) -> Result<Vec<i64>>;

    fn refresh(&mut self) -> Result<()>;

    fn describe(&self) -> String;
}

/// Open a file-backed source wrapped in the logging proxy.
pub fn open_logged_source(
    path: impl Into<PathBuf>,
    sink: impl Observer + 'static,
) -> Result<LoggingNumberSource<FileNumberSource>> {
    Ok(LoggingNumberSource::new(FileNumberSource::open(path)?, sink))
}
