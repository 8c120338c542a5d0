//! End-to-end pipeline tests over in-memory readers and the recording store

#![allow(clippy::unwrap_used)]

use devreg_ingest::{Batch, IngestPipeline, MemoryDeviceStore, PipelineConfig};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;

fn device_line(i: usize) -> String {
    format!(
        "device-{},phone,acme,x{},android,14,2024-01-01,2026-01-01,active,{}",
        i,
        i % 7,
        i * 10
    )
}

fn input_of(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|l| l + "\n").collect()
}

fn pipeline(store: Arc<MemoryDeviceStore>, chunk_size: usize, workers: usize) -> IngestPipeline {
    let config = PipelineConfig::default()
        .with_chunk_size(chunk_size)
        .with_worker_count(workers)
        .with_queue_capacities(8, 2);
    IngestPipeline::new(store, config).unwrap()
}

/// Batch sizes plus device names per batch, in a write-order-independent form
fn partition(batches: &[Batch]) -> Vec<Vec<String>> {
    let mut parts: Vec<Vec<String>> = batches
        .iter()
        .map(|b| b.iter().map(|d| d.device_name.clone()).collect())
        .collect();
    parts.sort();
    parts
}

/// Yields its payload, then fails every read
struct FailingReader {
    payload: Option<Vec<u8>>,
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.payload.take() {
            Some(payload) => {
                buf.put_slice(&payload);
                Poll::Ready(Ok(()))
            },
            None => Poll::Ready(Err(io::Error::new(io::ErrorKind::UnexpectedEof, "upload aborted"))),
        }
    }
}

#[tokio::test]
async fn test_well_formed_lines_are_partitioned_by_chunk_size() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = input_of((0..25).map(device_line));

    let result = pipeline(store.clone(), 10, 4).run(input.as_bytes()).await;

    assert_eq!(result.lines_read, 25);
    assert_eq!(result.accepted_count, 25);
    assert_eq!(result.rejected_count, 0);
    assert_eq!(result.batch_count, 3);
    assert_eq!(result.persisted_count, 25);
    assert!(result.is_complete());

    let mut sizes: Vec<usize> = store.batches().iter().map(Vec::len).collect();
    sizes.sort();
    assert_eq!(sizes, vec![5, 10, 10]);
    assert_eq!(store.device_count(), 25);
}

#[tokio::test]
async fn test_exact_multiple_has_no_short_batch() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = input_of((0..20).map(device_line));

    let result = pipeline(store.clone(), 10, 2).run(input.as_bytes()).await;

    assert_eq!(result.batch_count, 2);
    assert!(store.batches().iter().all(|b| b.len() == 10));
}

#[tokio::test]
async fn test_short_lines_are_rejected_without_affecting_others() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = input_of(vec![
        device_line(1),
        "only,three,fields".to_string(),
        device_line(2),
        String::new(),
        device_line(3),
    ]);

    let result = pipeline(store.clone(), 100, 2).run(input.as_bytes()).await;

    assert_eq!(result.lines_read, 5);
    assert_eq!(result.accepted_count, 3);
    assert_eq!(result.rejected_count, 2);
    assert_eq!(result.batch_count, 1);

    let names: Vec<String> = store.batches()[0].iter().map(|d| d.device_name.clone()).collect();
    assert_eq!(names, vec!["device-1", "device-2", "device-3"]);
}

#[tokio::test]
async fn test_non_numeric_price_is_accepted_as_zero() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = "p1,phone,acme,x1,android,14,2024-01-01,2026-01-01,active,cheap\n";

    let result = pipeline(store.clone(), 10, 1).run(input.as_bytes()).await;

    assert_eq!(result.accepted_count, 1);
    assert_eq!(result.rejected_count, 0);
    assert_eq!(store.batches()[0][0].price, 0);
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let input = input_of((0..57).map(device_line));

    let first = Arc::new(MemoryDeviceStore::new());
    let second = Arc::new(MemoryDeviceStore::new());

    let a = pipeline(first.clone(), 8, 5).run(input.as_bytes()).await;
    let b = pipeline(second.clone(), 8, 5).run(input.as_bytes()).await;

    assert_eq!(a.accepted_count, b.accepted_count);
    assert_eq!(a.rejected_count, b.rejected_count);
    assert_eq!(a.batch_count, b.batch_count);
    assert_eq!(a.persisted_count, b.persisted_count);
    assert_ne!(a.ingest_id, b.ingest_id);
    assert_eq!(partition(&first.batches()), partition(&second.batches()));
}

#[tokio::test]
async fn test_empty_input() {
    let store = Arc::new(MemoryDeviceStore::new());

    let result = pipeline(store.clone(), 10, 3).run(&b""[..]).await;

    assert_eq!(result.lines_read, 0);
    assert_eq!(result.accepted_count, 0);
    assert_eq!(result.batch_count, 0);
    assert_eq!(store.call_count(), 0);
    assert!(result.is_complete());
}

#[tokio::test]
async fn test_one_failing_batch_is_counted_and_others_persist() {
    let store = Arc::new(MemoryDeviceStore::failing_on([2]));
    let input = input_of((0..50).map(device_line));

    let result = pipeline(store.clone(), 10, 3).run(input.as_bytes()).await;

    assert_eq!(result.batch_count, 5);
    assert_eq!(result.failed_batch_count, 1);
    assert_eq!(result.persisted_count, 40);
    assert_eq!(store.batches().len(), 4);
    assert_eq!(store.call_count(), 5);
    assert!(!result.is_complete());
}

#[tokio::test]
async fn test_mixed_upload_scenario() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = "d1,phone,acme,x1,android,14,2024-01-01,2026-01-01,active,500\n\
                 badline\n \
                 d2,tablet,acme,x2,ios,17,2024-02-01,2026-02-01,active,abc";

    let result = pipeline(store.clone(), 1000, 10).run(input.as_bytes()).await;

    assert_eq!(result.accepted_count, 2);
    assert_eq!(result.rejected_count, 1);
    assert_eq!(result.batch_count, 1);

    let batches = store.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[0][0].price, 500);
    assert_eq!(batches[0][1].device_name, " d2");
    assert_eq!(batches[0][1].price, 0);
}

#[tokio::test]
async fn test_cancelled_before_input() {
    let store = Arc::new(MemoryDeviceStore::new());
    let input = input_of((0..10).map(device_line));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = pipeline(store.clone(), 5, 2).run_with_cancel(input.as_bytes(), cancel).await;

    assert!(result.cancelled);
    assert_eq!(result.lines_read, 0);
    assert_eq!(result.batch_count, 0);
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_read_fault_keeps_lines_before_it() {
    let store = Arc::new(MemoryDeviceStore::new());
    let mut payload = input_of((0..3).map(device_line)).into_bytes();
    payload.extend_from_slice(b"device-partial,phone");
    let reader = FailingReader { payload: Some(payload) };

    let result = pipeline(store.clone(), 2, 2).run(reader).await;

    assert_eq!(result.lines_read, 3);
    assert_eq!(result.accepted_count, 3);
    assert_eq!(result.persisted_count, 3);
    assert!(result.read_fault.as_deref().unwrap().contains("upload aborted"));
    assert!(!result.is_complete());
}

#[tokio::test]
async fn test_badly_encoded_line_is_rejected_and_reading_continues() {
    let store = Arc::new(MemoryDeviceStore::new());
    let mut payload = input_of([device_line(0)]).into_bytes();
    payload.extend_from_slice(b"caf\xe9,laptop,acme,x1,linux,6,2024-01-01,2026-01-01,active,900\n");
    payload.extend_from_slice(input_of((1..=1000).map(device_line)).as_bytes());

    let config = PipelineConfig::default();
    let result = devreg_ingest::ingest(store.clone(), config, &payload[..]).await.unwrap();

    assert_eq!(result.lines_read, 1002);
    assert_eq!(result.accepted_count, 1001);
    assert_eq!(result.rejected_count, 1);
    assert_eq!(result.persisted_count, 1001);
    assert!(result.read_fault.is_none());
    assert!(result.is_complete());
    assert_eq!(store.device_count(), 1001);
}

#[tokio::test]
async fn test_ingest_helper_validates_config() {
    let store = Arc::new(MemoryDeviceStore::new());
    let config = PipelineConfig::default().with_worker_count(0);

    let err = devreg_ingest::ingest(store, config, &b"x"[..]).await.unwrap_err();
    assert!(err.to_string().contains("worker_count"));
}
