//! Common error types for Pragmaticon

use thiserror::Error;

/// Common result type for Pragmaticon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types. Per-row data problems are not errors; the ingest
/// pipeline reports them as issues and keeps going.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (bad path, missing header, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed CSV source
    #[error("CSV error: {0}")]
    Csv(String),
}
