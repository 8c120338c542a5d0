//! Persistence seam of the pipeline
//!
//! Workers only know [`DeviceStore`]. The Postgres implementation lives behind
//! the `database` feature; [`memory::MemoryDeviceStore`] records batches in
//! memory and can inject write faults.

use async_trait::async_trait;

use crate::device::Device;
use crate::error::StoreError;

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::MemoryDeviceStore;
#[cfg(feature = "database")]
pub use postgres::PgDeviceStore;

/// Bulk-write capability consumed by the worker pool
///
/// Implementations must tolerate concurrent calls from every worker; the
/// pipeline applies no locking around them. No atomicity is assumed across
/// calls.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Insert all devices of one batch, returning the number of rows written
    async fn bulk_insert(&self, devices: &[Device]) -> Result<u64, StoreError>;
}
