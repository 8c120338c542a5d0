//! Shared fixtures for the HTTP tests
//!
//! The router is built over a lazily-connecting pool, so routes that fail
//! validation never touch a database. Uploads go to an in-memory store.

#![allow(dead_code, clippy::unwrap_used)]

use axum::{body::Body, http::Request, Router};
use devreg_ingest::{DeviceStore, IngestPipeline, PipelineConfig};
use devreg_server::{api, config::Config, db, features::FeatureState};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

pub const BOUNDARY: &str = "devreg-test-boundary";

pub fn lazy_pool() -> PgPool {
    let mut config = Config::default().database;
    config.min_connections = 0;
    db::create_lazy_pool(&config).unwrap()
}

pub fn setup_test_app(pool: PgPool, store: Arc<dyn DeviceStore>) -> Router {
    let config = Config::default();
    let pipeline_config = PipelineConfig::default().with_chunk_size(1000).with_worker_count(4);

    let state = FeatureState {
        db: pool,
        pipeline: IngestPipeline::new(store, pipeline_config).unwrap(),
        max_upload_bytes: config.server.max_upload_bytes,
    };

    api::create_router(state, &config.cors)
}

/// One multipart part: (field name, optional file name, content)
pub type Part<'a> = (&'a str, Option<&'a str>, &'a str);

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                name, file_name
            )),
            None => body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
