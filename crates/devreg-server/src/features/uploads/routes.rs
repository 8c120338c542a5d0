use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use devreg_ingest::IngestPipeline;

use super::commands::IngestUploadError;

/// `POST /upload`, accepting bodies up to `max_upload_bytes`
pub fn uploads_routes(max_upload_bytes: usize) -> Router<IngestPipeline> {
    Router::new()
        .route("/upload", post(upload_devices))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Stream a CSV upload into the device store
///
/// Responds `200 OK` with the run's counts once every batch has been written
/// or failed. Partial failure is visible in the counts and `complete` flag.
#[tracing::instrument(skip(pipeline, multipart))]
async fn upload_devices(
    State(pipeline): State<IngestPipeline>,
    multipart: Multipart,
) -> Result<Response, UploadApiError> {
    let response = super::commands::ingest::handle(&pipeline, multipart).await?;

    tracing::info!(
        ingest_id = %response.result.ingest_id,
        accepted = response.result.accepted_count,
        rejected = response.result.rejected_count,
        failed_batches = response.result.failed_batch_count,
        "Upload ingested via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
struct UploadApiError(IngestUploadError);

impl From<IngestUploadError> for UploadApiError {
    fn from(err: IngestUploadError) -> Self {
        Self(err)
    }
}

impl IntoResponse for UploadApiError {
    fn into_response(self) -> Response {
        match self.0 {
            IngestUploadError::FileRequired => {
                ErrorResponse::new("VALIDATION_ERROR", IngestUploadError::FileRequired.to_string())
                    .into_response_with(StatusCode::BAD_REQUEST)
            },
            IngestUploadError::Multipart(ref e) => {
                tracing::warn!(error = %e, "Rejected malformed multipart upload");
                ErrorResponse::new("MULTIPART_ERROR", self.0.to_string()).into_response_with(e.status())
            },
        }
    }
}
