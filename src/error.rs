use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while loading a dataset or its supporting files
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column '{0}' in input header")]
    MissingColumn(&'static str),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid recommendation file at line {line}: {reason}")]
    Recommendations { line: usize, reason: String },

    #[error("Unsupported input format: {0}")]
    UnsupportedInput(String),
}
