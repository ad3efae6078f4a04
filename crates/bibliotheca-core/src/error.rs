use thiserror::Error;

/// All errors that can occur in bibliotheca-core.
///
/// Missing ids and invalid state transitions are not errors: repositories
/// and the facade report them with `Option`/`bool`.
#[derive(Debug, Error)]
pub enum BibliothecaError {
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Invalid book status: {0}")]
    InvalidStatus(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prototype not found: {0}")]
    PrototypeNotFound(String),

    #[error("Observer failed: {0}")]
    Observer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Binary encoding error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    Rejected = 4,
}

pub type Result<T> = std::result::Result<T, BibliothecaError>;
