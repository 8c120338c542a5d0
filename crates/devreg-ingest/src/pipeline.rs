//! Pipeline orchestrator
//!
//! Wires line source → parser/batcher → worker pool through two bounded
//! queues and waits for every worker to exit before reporting.
//!
//! ```text
//! reader ─▶ LineSource ─[line queue]─▶ Batcher ─[batch queue]─▶ N workers ─▶ DeviceStore
//! ```
//!
//! End of data is signalled only by queue closure: the line source drops the
//! line sender when it stops, the batcher drops the batch sender after its
//! final flush, and workers exit once the batch queue is drained.

use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::batcher::{run_batcher, BatcherReport};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pool::{PoolReport, WorkerPool};
use crate::source::{produce_lines, LineSource, RawLine, SourceReport};
use crate::store::DeviceStore;

/// Aggregate outcome of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub ingest_id: Uuid,
    /// Lines that parsed into a device
    pub accepted_count: u64,
    /// Lines dropped by the parser
    pub rejected_count: u64,
    /// Batches that were not persisted (write failures, undeliverable or
    /// lost to a crashed worker)
    pub failed_batch_count: u64,
    /// Batches produced by the batcher
    pub batch_count: u64,
    /// Rows the store reported as written
    pub persisted_count: u64,
    /// Lines read from the upload stream
    pub lines_read: u64,
    /// Read fault that cut the stream short, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_fault: Option<String>,
    pub cancelled: bool,
}

impl PipelineResult {
    fn assemble(ingest_id: Uuid, source: SourceReport, batcher: BatcherReport, pool: PoolReport) -> Self {
        let batch_count = batcher.batches_dispatched + batcher.batches_undelivered;
        let delivered_but_lost = batcher
            .batches_dispatched
            .saturating_sub(pool.batches_written + pool.batches_failed);

        Self {
            ingest_id,
            accepted_count: batcher.accepted,
            rejected_count: batcher.rejected,
            failed_batch_count: pool.batches_failed + batcher.batches_undelivered + delivered_but_lost,
            batch_count,
            persisted_count: pool.rows_written,
            lines_read: source.lines_read,
            read_fault: source.fault,
            cancelled: source.cancelled,
        }
    }

    /// True when the whole stream was read and every batch was persisted
    pub fn is_complete(&self) -> bool {
        self.read_fault.is_none() && !self.cancelled && self.failed_batch_count == 0
    }
}

/// Bulk ingestion pipeline bound to a store and a configuration
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn DeviceStore>,
    config: PipelineConfig,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline").field("config", &self.config).finish_non_exhaustive()
    }
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn DeviceStore>, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest `reader` to completion
    pub async fn run<R>(&self, reader: R) -> PipelineResult
    where
        R: AsyncRead + Unpin + Send,
    {
        self.run_with_cancel(reader, CancellationToken::new()).await
    }

    /// Ingest `reader`, stopping line production early if `cancel` fires
    ///
    /// Lines already queued when cancellation hits are still parsed and
    /// persisted. Returns only after every worker has exited.
    pub async fn run_with_cancel<R>(&self, reader: R, cancel: CancellationToken) -> PipelineResult
    where
        R: AsyncRead + Unpin + Send,
    {
        let ingest_id = Uuid::new_v4();
        let span = tracing::info_span!("ingest", %ingest_id);

        async move {
            tracing::info!(
                chunk_size = self.config.chunk_size,
                workers = self.config.worker_count,
                "Starting ingestion"
            );

            let (line_tx, line_rx) = mpsc::channel::<RawLine>(self.config.line_queue_capacity);
            let (batch_tx, batch_rx) = mpsc::channel(self.config.batch_queue_capacity);

            let pool = WorkerPool::spawn(self.config.worker_count, batch_rx, Arc::clone(&self.store));
            let batcher = tokio::spawn(
                run_batcher(line_rx, batch_tx, self.config.chunk_size).in_current_span(),
            );

            // The reader may borrow from the caller, so it is driven here
            // rather than spawned
            let source = LineSource::new(reader, self.config.max_line_length);
            let source_report = produce_lines(source, line_tx, cancel).await;

            let batcher_report = match batcher.await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, "Batcher task did not complete");
                    BatcherReport::default()
                },
            };

            let pool_report = pool.join().await;
            let result = PipelineResult::assemble(ingest_id, source_report, batcher_report, pool_report);

            tracing::info!(
                lines_read = result.lines_read,
                accepted = result.accepted_count,
                rejected = result.rejected_count,
                batches = result.batch_count,
                failed_batches = result.failed_batch_count,
                persisted = result.persisted_count,
                cancelled = result.cancelled,
                "Ingestion finished"
            );

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryDeviceStore;

    #[test]
    fn test_new_rejects_invalid_config() {
        let store = Arc::new(MemoryDeviceStore::new());
        let err = IngestPipeline::new(store, PipelineConfig::default().with_chunk_size(0)).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_assemble_counts_lost_batches() {
        let batcher = BatcherReport {
            accepted: 10,
            rejected: 1,
            batches_dispatched: 5,
            batches_undelivered: 1,
        };
        let pool = PoolReport {
            batches_written: 3,
            rows_written: 6,
            batches_failed: 1,
            workers_panicked: 1,
        };

        let result = PipelineResult::assemble(Uuid::nil(), SourceReport::default(), batcher, pool);
        assert_eq!(result.batch_count, 6);
        // one write failure, one undelivered, one lost with the crashed worker
        assert_eq!(result.failed_batch_count, 3);
        assert_eq!(result.persisted_count, 6);
        assert!(!result.is_complete());
    }

    #[tokio::test]
    async fn test_run_small_input() {
        let store = Arc::new(MemoryDeviceStore::new());
        let config = PipelineConfig::default().with_chunk_size(2).with_worker_count(2);
        let pipeline = IngestPipeline::new(store.clone(), config).unwrap();

        let input = "a,t,b,m,o,v,p,w,s,1\nb,t,b,m,o,v,p,w,s,2\nc,t,b,m,o,v,p,w,s,3\n";
        let result = pipeline.run(input.as_bytes()).await;

        assert_eq!(result.lines_read, 3);
        assert_eq!(result.accepted_count, 3);
        assert_eq!(result.batch_count, 2);
        assert_eq!(result.persisted_count, 3);
        assert!(result.is_complete());
        assert_eq!(store.device_count(), 3);
    }

    #[test]
    fn test_result_serializes_without_empty_fault() {
        let result = PipelineResult::assemble(
            Uuid::nil(),
            SourceReport::default(),
            BatcherReport::default(),
            PoolReport::default(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("read_fault").is_none());
        assert_eq!(json["accepted_count"], 0);
        assert_eq!(json["cancelled"], false);
    }
}
