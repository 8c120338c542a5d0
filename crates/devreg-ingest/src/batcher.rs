//! Record parsing and batching stage
//!
//! Pulls raw lines off the line queue in order, parses each one, and groups
//! accepted devices into batches of `chunk_size`. Batch emission order equals
//! input line order.

use tokio::sync::mpsc;

use crate::device::{Batch, Device};
use crate::parser::parse_line;
use crate::source::RawLine;

/// Accumulates devices into fixed-capacity batches
#[derive(Debug)]
pub struct Batcher {
    chunk_size: usize,
    current: Batch,
}

impl Batcher {
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            current: Vec::with_capacity(chunk_size),
        }
    }

    /// Append a device, returning the batch if it just became full
    pub fn push(&mut self, device: Device) -> Option<Batch> {
        self.current.push(device);

        if self.current.len() >= self.chunk_size {
            Some(std::mem::replace(&mut self.current, Vec::with_capacity(self.chunk_size)))
        } else {
            None
        }
    }

    /// The final, possibly short, batch; `None` when nothing is pending
    pub fn finish(self) -> Option<Batch> {
        if self.current.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn pending(&self) -> usize {
        self.current.len()
    }
}

/// Outcome of the batching stage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatcherReport {
    pub accepted: u64,
    pub rejected: u64,
    /// Batches handed to the batch queue
    pub batches_dispatched: u64,
    /// Batches that could not be queued because every worker had exited
    pub batches_undelivered: u64,
}

/// Run the parse-and-batch loop until the line queue closes
///
/// The batch sender is dropped on return, closing the batch queue once the
/// final short batch (if any) is queued. If every worker has gone, the queue
/// is still drained so each line ends up counted as accepted or rejected;
/// the batches it would have formed are reported as undelivered.
pub async fn run_batcher(
    mut lines: mpsc::Receiver<RawLine>,
    batches: mpsc::Sender<Batch>,
    chunk_size: usize,
) -> BatcherReport {
    let mut batcher = Batcher::new(chunk_size);
    let mut report = BatcherReport::default();

    while let Some(line) = lines.recv().await {
        let device = match parse_line(&line) {
            Ok(device) => device,
            Err(reason) => {
                let record = String::from_utf8_lossy(&line);
                tracing::warn!(record = %record, reason = %reason, "Skipping invalid record");
                report.rejected += 1;
                continue;
            },
        };
        report.accepted += 1;

        if let Some(full) = batcher.push(device) {
            dispatch(&batches, full, &mut report).await;
        }
    }

    if let Some(last) = batcher.finish() {
        dispatch(&batches, last, &mut report).await;
    }

    tracing::debug!(
        accepted = report.accepted,
        rejected = report.rejected,
        batches = report.batches_dispatched,
        "Batcher finished"
    );

    report
}

async fn dispatch(batches: &mpsc::Sender<Batch>, batch: Batch, report: &mut BatcherReport) {
    let size = batch.len();
    match batches.send(batch).await {
        Ok(()) => report.batches_dispatched += 1,
        Err(_) => {
            tracing::error!(batch_size = size, "Batch queue closed, no workers left to persist batch");
            report.batches_undelivered += 1;
        },
    }
}
