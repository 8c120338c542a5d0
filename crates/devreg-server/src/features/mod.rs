//! Feature modules implementing the Devreg API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes:
//!
//! - **devices**: CRUD over the `devices` table
//! - **uploads**: Bulk CSV ingestion through the streaming pipeline
//!
//! Commands and queries implement `mediator::Request`, see
//! [`crate::cqrs::build_mediator`].

pub mod devices;
pub mod shared;
pub mod uploads;

use axum::Router;
use devreg_ingest::IngestPipeline;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for the CRUD handlers
    pub db: sqlx::PgPool,
    /// Pipeline bound to the device store, shared by every upload
    pub pipeline: IngestPipeline,
    /// Request body ceiling for uploads
    pub max_upload_bytes: usize,
}

/// Mounts every feature router
///
/// - `/device` - Device CRUD
/// - `/upload` - Bulk CSV upload
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/device", devices::devices_routes().with_state(state.db.clone()))
        .merge(uploads::uploads_routes(state.max_upload_bytes).with_state(state.pipeline.clone()))
}
