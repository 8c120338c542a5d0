//! Devreg Server Library
//!
//! HTTP server for the device registry.
//!
//! - **Device CRUD**: `/device` and `/device/:id`
//! - **Bulk upload**: `POST /upload` streams a CSV through
//!   [`devreg_ingest::IngestPipeline`] into Postgres
//! - **Health**: `GET /health` checks database connectivity
//!
//! Writes and reads are modelled as commands and queries per feature slice
//! (see [`features`]) and dispatched through [`cqrs::build_mediator`].
//!
//! # Example
//!
//! ```no_run
//! use devreg_server::{api, config::Config, db, features::FeatureState};
//! use devreg_ingest::{IngestPipeline, PgDeviceStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let store = Arc::new(PgDeviceStore::new(pool.clone()));
//!
//!     let state = FeatureState {
//!         db: pool,
//!         pipeline: IngestPipeline::new(store, config.ingest)?,
//!         max_upload_bytes: config.server.max_upload_bytes,
//!     };
//!     let app = api::create_router(state, &config.cors);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::{ServerError, ServerResult};
