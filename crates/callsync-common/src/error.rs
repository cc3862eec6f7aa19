//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by the shared helpers
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid datetime '{value}', expected format YYYY-MM-DD HH:MM:SS: {source}")]
    InvalidDateTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid duration '{0}', expected e.g. 4h, 60m, 45s or 12h15m30s")]
    InvalidDuration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
