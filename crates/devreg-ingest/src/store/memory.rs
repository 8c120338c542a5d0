use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::DeviceStore;
use crate::device::{Batch, Device};
use crate::error::StoreError;

/// In-memory [`DeviceStore`] that records every successful batch
///
/// Calls listed in `failing_calls` (0-based, in arrival order) fail with
/// [`StoreError::Unavailable`] and record nothing.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    batches: Mutex<Vec<Batch>>,
    calls: AtomicUsize,
    failing_calls: HashSet<usize>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `n`-th bulk insert calls fail
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing_calls: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Snapshot of the persisted batches, in write order
    pub fn batches(&self) -> Vec<Batch> {
        match self.batches.lock() {
            Ok(batches) => batches.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn device_count(&self) -> usize {
        self.batches().iter().map(Vec::len).sum()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn bulk_insert(&self, devices: &[Device]) -> Result<u64, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_calls.contains(&call) {
            return Err(StoreError::Unavailable(format!("injected failure on call {}", call)));
        }

        let mut batches = self
            .batches
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        batches.push(devices.to_vec());

        Ok(devices.len() as u64)
    }
}
