//! Server-specific error types
//!
//! Request-level failures are modelled per feature (see the `*ApiError`
//! types in each `routes.rs`). [`ServerError`] covers startup and
//! infrastructure: configuration, the connection pool, and migrations.

use thiserror::Error;

/// Result type alias for server operations
pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ingest configuration error: {0}")]
    Ingest(#[from] devreg_ingest::PipelineError),

    #[error("Devreg error: {0}")]
    Devreg(#[from] devreg_common::DevregError),

    #[error("Configuration error: {0}")]
    Config(String),
}
