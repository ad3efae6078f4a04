//! Pluggable serializers for one entity collection at a time.
mod binary;
mod delimited;
mod json;

pub use binary::BinaryExport;
pub use delimited::CsvExport;
pub use json::JsonExport;

use std::fmt;
use std::str::FromStr;

use crate::error::{BibliothecaError, Result};
use crate::models::Record;

/// Turns a collection of records into a document.
pub trait ExportStrategy {
    /// Short format name, e.g. `json`.
    fn name(&self) -> &'static str;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>>;
}

/// Built-in formats, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Binary,
}

impl ExportFormat {
    pub fn strategy(self) -> Box<dyn ExportStrategy> {
        match self {
            Self::Json => Box::new(JsonExport),
            Self::Csv => Box::new(CsvExport),
            Self::Binary => Box::new(BinaryExport),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

impl FromStr for ExportFormat {
    type Err = BibliothecaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "binary" | "bin" => Ok(Self::Binary),
            _ => Err(BibliothecaError::UnknownFormat(s.to_string())),
        }
    }
}
