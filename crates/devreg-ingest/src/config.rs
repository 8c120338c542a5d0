//! Pipeline configuration
//!
//! The queue capacities and the chunk size are the memory ceiling of a run:
//! at most `line_queue_capacity` raw lines, `batch_queue_capacity` full
//! batches, plus one in-flight batch per worker and one in the batcher.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Maximum number of devices per batch (one bulk write per batch).
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Capacity of the raw line queue between the line source and the batcher.
pub const DEFAULT_LINE_QUEUE_CAPACITY: usize = 10_000;

/// Capacity of the batch queue between the batcher and the worker pool.
pub const DEFAULT_BATCH_QUEUE_CAPACITY: usize = 100;

/// Number of concurrent bulk-write workers.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Longest accepted line in bytes; longer lines end the read as a fault.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Tuning knobs for one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub line_queue_capacity: usize,
    pub batch_queue_capacity: usize,
    pub worker_count: usize,
    pub max_line_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            line_queue_capacity: DEFAULT_LINE_QUEUE_CAPACITY,
            batch_queue_capacity: DEFAULT_BATCH_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `INGEST_*` environment variables and defaults
    ///
    /// Unparseable values fall back to the default; the result is validated.
    pub fn from_env() -> Result<Self, PipelineError> {
        let config = Self {
            chunk_size: env_or("INGEST_CHUNK_SIZE", DEFAULT_CHUNK_SIZE),
            line_queue_capacity: env_or("INGEST_LINE_QUEUE_CAPACITY", DEFAULT_LINE_QUEUE_CAPACITY),
            batch_queue_capacity: env_or(
                "INGEST_BATCH_QUEUE_CAPACITY",
                DEFAULT_BATCH_QUEUE_CAPACITY,
            ),
            worker_count: env_or("INGEST_WORKER_COUNT", DEFAULT_WORKER_COUNT),
            max_line_length: env_or("INGEST_MAX_LINE_LENGTH", DEFAULT_MAX_LINE_LENGTH),
        };

        config.validate()?;

        Ok(config)
    }

    /// Every knob must be non-zero; a zero-capacity channel or an empty pool
    /// would never make progress.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let checks = [
            ("chunk_size", self.chunk_size),
            ("line_queue_capacity", self.line_queue_capacity),
            ("batch_queue_capacity", self.batch_queue_capacity),
            ("worker_count", self.worker_count),
            ("max_line_length", self.max_line_length),
        ];

        for (name, value) in checks {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_queue_capacities(mut self, lines: usize, batches: usize) -> Self {
        self.line_queue_capacity = lines;
        self.batch_queue_capacity = batches;
        self
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }
}

fn env_or(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_match_original_tuning() {
        let config = PipelineConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.line_queue_capacity, 10_000);
        assert_eq!(config.batch_queue_capacity, 100);
        assert_eq!(config.worker_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = PipelineConfig::default().with_worker_count(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("worker_count"));

        let config = PipelineConfig::default().with_queue_capacities(10, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("INGEST_CHUNK_SIZE", "250");
        std::env::set_var("INGEST_WORKER_COUNT", "not-a-number");

        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(config.chunk_size, 250);
        assert_eq!(config.worker_count, DEFAULT_WORKER_COUNT);

        std::env::remove_var("INGEST_CHUNK_SIZE");
        std::env::remove_var("INGEST_WORKER_COUNT");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero() {
        std::env::set_var("INGEST_BATCH_QUEUE_CAPACITY", "0");
        assert!(PipelineConfig::from_env().is_err());
        std::env::remove_var("INGEST_BATCH_QUEUE_CAPACITY");
    }
}
