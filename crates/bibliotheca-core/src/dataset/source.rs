use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::Result;
use crate::observer::Observer;

use super::NumberSource;

/// One integer per line. Blank lines are skipped, unparsable lines are
/// logged and skipped, and a missing file reads as an empty dataset.
#[derive(Debug, Clone)]
pub struct FileNumberSource {
    path: PathBuf,
    numbers: Vec<i64>,
    last_modified: Option<SystemTime>,
}

impl FileNumberSource {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut source = Self {
            path: path.into(),
            numbers: Vec::new(),
            last_modified: None,
        };
        source.load()?;
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "number file does not exist");
            self.numbers.clear();
            self.last_modified = None;
            return Ok(());
        }

        let modified = fs::metadata(&self.path)?.modified()?;
        let contents = fs::read_to_string(&self.path)?;
        self.numbers = parse_numbers(&contents);
        self.last_modified = Some(modified);
        Ok(())
    }

    fn changed_on_disk(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let modified = fs::metadata(&self.path)?.modified()?;
        Ok(self.last_modified.is_none_or(|seen| modified > seen))
    }
}

fn parse_numbers(contents: &str) -> Vec<i64> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                tracing::warn!(line, "invalid number format");
                None
            }
        })
        .collect()
}

impl NumberSource for FileNumberSource {
    fn numbers(&mut self) -> Result<Vec<i64>> {
        if self.changed_on_disk()? {
            tracing::info!(path = %self.path.display(), "file change detected, reloading");
            self.load()?;
        }
        Ok(self.numbers.clone())
    }

    fn refresh(&mut self) -> Result<()> {
        self.load()
    }

    fn describe(&self) -> String {
        format!("File: {} (Numbers: {})", self.path.display(), self.numbers.len())
    }
}

/// Reports every access to the wrapped source to an observer.
pub struct LoggingNumberSource<S> {
    inner: S,
    sink: Box<dyn Observer>,
}

impl<S: NumberSource> LoggingNumberSource<S> {
    pub fn new(inner: S, sink: impl Observer + 'static) -> Self {
        Self {
            inner,
            sink: Box::new(sink),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn log(&self, message: &str) {
        if let Err(e) = self.sink.update(message) {
            tracing::warn!(error = %e, "failed to log number source access");
        }
    }
}

impl<S: NumberSource> NumberSource for LoggingNumberSource<S> {
    fn numbers(&mut self) -> Result<Vec<i64>> {
        self.log(&format!("Accessing numbers from: {}", self.inner.describe()));
        let numbers = self.inner.numbers()?;
        self.log(&format!("Retrieved {} numbers", numbers.len()));
        Ok(numbers)
    }

    fn refresh(&mut self) -> Result<()> {
        self.log(&format!("Refreshing data for: {}", self.inner.describe()));
        self.inner.refresh()?;
        self.log("Data refreshed successfully");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} (with logging proxy)", self.inner.describe())
    }
}
