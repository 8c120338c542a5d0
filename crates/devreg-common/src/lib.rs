//! Devreg Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging setup for the Devreg workspace.
//!
//! # Overview
//!
//! - **Error Handling**: The workspace-wide [`DevregError`] and [`Result`] alias
//! - **Logging**: Centralized `tracing` subscriber configuration
//!
//! # Example
//!
//! ```no_run
//! use devreg_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DevregError, Result};
