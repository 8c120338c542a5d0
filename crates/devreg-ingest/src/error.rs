//! Ingestion error types
//!
//! Only [`PipelineError`] ever reaches a caller of the pipeline. The other
//! kinds are handled at the stage that detects them and show up as counts in
//! [`crate::PipelineResult`].

use thiserror::Error;

/// Errors that prevent a run from starting
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// The upload stream could not be read; line production stops
#[derive(Debug, Error)]
pub enum SourceReadFault {
    #[error("IO error while reading upload stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line exceeds the maximum length of {max_length} bytes")]
    LineTooLong { max_length: usize },
}

/// A line failed structural validation and was dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejected {
    #[error("too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("line is not valid UTF-8 (invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },
}

/// A bulk write failed for one batch
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<PipelineError> for devreg_common::DevregError {
    fn from(err: PipelineError) -> Self {
        devreg_common::DevregError::config(err.to_string())
    }
}
