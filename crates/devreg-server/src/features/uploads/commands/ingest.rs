//! Bulk device ingestion from a multipart upload
//!
//! The `file` field is streamed straight into the ingest pipeline; the body is
//! never buffered in full. Other fields are skipped.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use devreg_ingest::{IngestPipeline, PipelineResult};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::StreamReader;

/// Multipart field carrying the CSV payload
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize)]
pub struct IngestUploadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// True when the whole upload was read and every batch persisted
    pub complete: bool,
    #[serde(flatten)]
    pub result: PipelineResult,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestUploadError {
    #[error("File is required")]
    FileRequired,

    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

#[tracing::instrument(skip(pipeline, multipart))]
pub async fn handle(
    pipeline: &IngestPipeline,
    mut multipart: Multipart,
) -> Result<IngestUploadResponse, IngestUploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        tracing::info!(file_name = ?file_name, "Streaming upload into ingest pipeline");

        // A transport error mid-file surfaces as a read fault in the result
        let reader = Box::pin(StreamReader::new(field.map_err(std::io::Error::other)));
        let result = pipeline.run(reader).await;

        return Ok(IngestUploadResponse {
            file_name,
            complete: result.is_complete(),
            result,
        });
    }

    Err(IngestUploadError::FileRequired)
}
