//! Error types for Devreg

use thiserror::Error;

/// Result type alias for Devreg operations
pub type Result<T> = std::result::Result<T, DevregError>;

/// Main error type for Devreg
#[derive(Error, Debug)]
pub enum DevregError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DevregError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
