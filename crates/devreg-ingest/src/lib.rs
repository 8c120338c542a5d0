//! Devreg Ingest Library
//!
//! Streaming bulk ingestion of delimited device records.
//!
//! # Pipeline
//!
//! - **Line source**: reads the upload incrementally, one raw line at a time
//! - **Parser/batcher**: validates lines and groups devices into batches
//! - **Worker pool**: a fixed set of workers issuing one bulk write per batch
//! - **Orchestrator**: bounded queues between the stages and a completion
//!   barrier over all workers
//!
//! Memory use is bounded by the two queue capacities and the batch size,
//! independent of the input size.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use devreg_ingest::{IngestPipeline, MemoryDeviceStore, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryDeviceStore::new());
//!     let pipeline = IngestPipeline::new(store, PipelineConfig::default())?;
//!
//!     let file = tokio::fs::File::open("devices.csv").await?;
//!     let result = pipeline.run(file).await;
//!     println!("accepted {} devices", result.accepted_count);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod batcher;
pub mod config;
pub mod device;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod pool;
pub mod source;
pub mod store;

use std::sync::Arc;
use tokio::io::AsyncRead;

pub use config::PipelineConfig;
pub use device::{Batch, Device};
pub use error::{PipelineError, RecordRejected, SourceReadFault, StoreError};
pub use parser::{parse_line, parse_record};
pub use pipeline::{IngestPipeline, PipelineResult};
pub use source::RawLine;
pub use store::{DeviceStore, MemoryDeviceStore};

#[cfg(feature = "database")]
pub use store::PgDeviceStore;

/// Run a single ingestion of `reader` into `store`
pub async fn ingest<R>(
    store: Arc<dyn DeviceStore>,
    config: PipelineConfig,
    reader: R,
) -> Result<PipelineResult, PipelineError>
where
    R: AsyncRead + Unpin + Send,
{
    let pipeline = IngestPipeline::new(store, config)?;
    Ok(pipeline.run(reader).await)
}
