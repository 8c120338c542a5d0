pub mod ingest;

pub use ingest::{IngestUploadError, IngestUploadResponse};
