//! Bulk-write worker pool
//!
//! A fixed number of workers share the receiving end of the batch queue.
//! Each batch goes to exactly one worker, which writes it with a single
//! [`DeviceStore::bulk_insert`] call. Failed batches are logged and counted,
//! never retried.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::device::Batch;
use crate::store::DeviceStore;

/// What a single worker did before exiting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub batches_written: u64,
    pub rows_written: u64,
    pub batches_failed: u64,
}

/// Aggregate of every worker in a pool
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub batches_written: u64,
    pub rows_written: u64,
    pub batches_failed: u64,
    /// Workers that panicked; whatever batch they held is lost
    pub workers_panicked: u64,
}

impl PoolReport {
    fn absorb(&mut self, worker: WorkerReport) {
        self.batches_written += worker.batches_written;
        self.rows_written += worker.rows_written;
        self.batches_failed += worker.batches_failed;
    }
}

/// Handles to a running set of workers
pub struct WorkerPool {
    workers: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerPool {
    /// Start `worker_count` workers draining `batches` into `store`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(worker_count: usize, batches: mpsc::Receiver<Batch>, store: Arc<dyn DeviceStore>) -> Self {
        let batches = Arc::new(Mutex::new(batches));

        let workers = (0..worker_count.max(1))
            .map(|worker_id| {
                let batches = Arc::clone(&batches);
                let store = Arc::clone(&store);
                tokio::spawn(
                    run_worker(worker_id, batches, store).instrument(tracing::Span::current()),
                )
            })
            .collect();

        Self { workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit
    ///
    /// Workers exit once the batch queue is closed and drained, so this is
    /// the completion barrier of a run.
    pub async fn join(self) -> PoolReport {
        let mut report = PoolReport::default();

        for (worker_id, handle) in self.workers.into_iter().enumerate() {
            match handle.await {
                Ok(worker) => report.absorb(worker),
                Err(e) => {
                    tracing::error!(worker_id, error = %e, "Worker task did not complete");
                    report.workers_panicked += 1;
                },
            }
        }

        report
    }
}

async fn run_worker(
    worker_id: usize,
    batches: Arc<Mutex<mpsc::Receiver<Batch>>>,
    store: Arc<dyn DeviceStore>,
) -> WorkerReport {
    let mut report = WorkerReport::default();

    loop {
        // Guard is released before the write so other workers can pull
        let batch = {
            let mut rx = batches.lock().await;
            rx.recv().await
        };

        let Some(batch) = batch else {
            break;
        };

        match store.bulk_insert(&batch).await {
            Ok(rows) => {
                report.batches_written += 1;
                report.rows_written += rows;
                tracing::debug!(worker_id, rows, "Batch persisted");
            },
            Err(e) => {
                report.batches_failed += 1;
                tracing::error!(
                    worker_id,
                    batch_size = batch.len(),
                    error = %e,
                    "Error inserting batch"
                );
            },
        }
    }

    tracing::debug!(
        worker_id,
        batches = report.batches_written,
        failed = report.batches_failed,
        "Worker exiting"
    );

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse_record;
    use crate::store::MemoryDeviceStore;

    fn batch(size: usize) -> Batch {
        (0..size)
            .map(|i| {
                parse_record(&format!("d{},phone,acme,x1,android,14,2024-01-01,2026-01-01,active,1", i))
                    .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pool_drains_queue_then_exits() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (tx, rx) = mpsc::channel(8);

        let pool = WorkerPool::spawn(3, rx, store.clone());
        assert_eq!(pool.size(), 3);

        for size in [2, 2, 2, 1] {
            tx.send(batch(size)).await.unwrap();
        }
        drop(tx);

        let report = pool.join().await;
        assert_eq!(report.batches_written, 4);
        assert_eq!(report.rows_written, 7);
        assert_eq!(report.batches_failed, 0);
        assert_eq!(store.device_count(), 7);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_worker() {
        let store = Arc::new(MemoryDeviceStore::failing_on([0]));
        let (tx, rx) = mpsc::channel(8);

        let pool = WorkerPool::spawn(1, rx, store.clone());
        for _ in 0..3 {
            tx.send(batch(1)).await.unwrap();
        }
        drop(tx);

        let report = pool.join().await;
        assert_eq!(report.batches_failed, 1);
        assert_eq!(report.batches_written, 2);
        assert_eq!(store.call_count(), 3);
    }

    #[tokio::test]
    async fn test_zero_workers_still_starts_one() {
        let store = Arc::new(MemoryDeviceStore::new());
        let (tx, rx) = mpsc::channel(1);
        let pool = WorkerPool::spawn(0, rx, store);
        assert_eq!(pool.size(), 1);
        drop(tx);
        assert_eq!(pool.join().await, PoolReport::default());
    }
}
