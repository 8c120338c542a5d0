//! Device API routes
//!
//! - `POST /device` - Register a device
//! - `GET /device?page=&limit=` - List devices with pagination
//! - `GET /device/:id` - Get a single device
//! - `PUT /device/:id` - Partially update a device
//! - `DELETE /device/:id` - Delete a device

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::{
    commands::{
        CreateDeviceCommand, CreateDeviceError, DeleteDeviceCommand, DeleteDeviceError,
        UpdateDeviceCommand, UpdateDeviceError,
    },
    queries::{GetDeviceError, GetDeviceQuery, ListDevicesError, ListDevicesQuery},
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn devices_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_devices).post(create_device))
        .route("/:id", get(get_device).put(update_device).delete(delete_device))
}

fn parse_id(raw: &str) -> Result<i64, DeviceApiError> {
    raw.parse().map_err(|_| DeviceApiError::InvalidId(raw.to_string()))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /device`
///
/// - `201 Created` - Device stored, body carries the new row
/// - `400 Bad Request` - Validation error
#[tracing::instrument(skip(pool, command), fields(device_name = %command.device_name))]
async fn create_device(
    State(pool): State<PgPool>,
    Json(command): Json<CreateDeviceCommand>,
) -> Result<Response, DeviceApiError> {
    let device = super::commands::create::handle(pool, command).await?;

    tracing::info!(device_id = device.id, "Device created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(device))).into_response())
}

/// `PUT /device/:id`
///
/// - `200 OK` - Device updated
/// - `400 Bad Request` - Invalid id, no fields, or validation error
/// - `404 Not Found` - No such device
#[tracing::instrument(skip(pool, command), fields(id = %id))]
async fn update_device(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Json(mut command): Json<UpdateDeviceCommand>,
) -> Result<Response, DeviceApiError> {
    command.id = parse_id(&id)?;

    let device = super::commands::update::handle(pool, command).await?;

    tracing::info!(device_id = device.id, "Device updated via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(device))).into_response())
}

/// `DELETE /device/:id`
#[tracing::instrument(skip(pool), fields(id = %id))]
async fn delete_device(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, DeviceApiError> {
    let command = DeleteDeviceCommand { id: parse_id(&id)? };

    let response = super::commands::delete::handle(pool, command).await?;

    tracing::info!(device_id = response.id, "Device deleted via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(id = %id))]
async fn get_device(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<Response, DeviceApiError> {
    let query = GetDeviceQuery { id: parse_id(&id)? };

    let device = super::queries::get::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(device))).into_response())
}

/// `GET /device?page=1&limit=10`
///
/// Items are returned as `data`, pagination under `meta.pagination`.
#[tracing::instrument(skip(pool, query), fields(page = ?query.page, limit = ?query.limit))]
async fn list_devices(
    State(pool): State<PgPool>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Response, DeviceApiError> {
    let response = super::queries::list::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Devices listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for device API endpoints
#[derive(Debug)]
enum DeviceApiError {
    InvalidId(String),
    CreateError(CreateDeviceError),
    UpdateError(UpdateDeviceError),
    DeleteError(DeleteDeviceError),
    GetError(GetDeviceError),
    ListError(ListDevicesError),
}

impl From<CreateDeviceError> for DeviceApiError {
    fn from(err: CreateDeviceError) -> Self {
        Self::CreateError(err)
    }
}

impl From<UpdateDeviceError> for DeviceApiError {
    fn from(err: UpdateDeviceError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<DeleteDeviceError> for DeviceApiError {
    fn from(err: DeleteDeviceError) -> Self {
        Self::DeleteError(err)
    }
}

impl From<GetDeviceError> for DeviceApiError {
    fn from(err: GetDeviceError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListDevicesError> for DeviceApiError {
    fn from(err: ListDevicesError) -> Self {
        Self::ListError(err)
    }
}

impl IntoResponse for DeviceApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            DeviceApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, "INVALID_ID"),

            DeviceApiError::CreateError(CreateDeviceError::Validation(_))
            | DeviceApiError::UpdateError(UpdateDeviceError::Validation(_))
            | DeviceApiError::UpdateError(UpdateDeviceError::NoFieldsToUpdate)
            | DeviceApiError::ListError(ListDevicesError::InvalidPagination(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            },

            DeviceApiError::UpdateError(UpdateDeviceError::NotFound(_))
            | DeviceApiError::DeleteError(DeleteDeviceError::NotFound(_))
            | DeviceApiError::GetError(GetDeviceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },

            DeviceApiError::CreateError(CreateDeviceError::Database(_))
            | DeviceApiError::UpdateError(UpdateDeviceError::Database(_))
            | DeviceApiError::DeleteError(DeleteDeviceError::Database(_))
            | DeviceApiError::GetError(GetDeviceError::Database(_))
            | DeviceApiError::ListError(ListDevicesError::Database(_)) => {
                tracing::error!("Database error in device API: {}", self);
                return ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
            },
        };

        ErrorResponse::new(code, self.to_string()).into_response_with(status)
    }
}

impl std::fmt::Display for DeviceApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(_) => write!(f, "Invalid ID format"),
            Self::CreateError(e) => write!(f, "{}", e),
            Self::UpdateError(e) => write!(f, "{}", e),
            Self::DeleteError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::shared::validation::FieldValidationError;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(DeviceApiError::InvalidId(_))));
        assert!(parse_id("1.5").is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (DeviceApiError::InvalidId("x".into()), StatusCode::BAD_REQUEST),
            (
                DeviceApiError::CreateError(CreateDeviceError::Validation(
                    FieldValidationError::NameRequired,
                )),
                StatusCode::BAD_REQUEST,
            ),
            (DeviceApiError::UpdateError(UpdateDeviceError::NoFieldsToUpdate), StatusCode::BAD_REQUEST),
            (DeviceApiError::GetError(GetDeviceError::NotFound(1)), StatusCode::NOT_FOUND),
            (DeviceApiError::DeleteError(DeleteDeviceError::NotFound(1)), StatusCode::NOT_FOUND),
            (
                DeviceApiError::ListError(ListDevicesError::Database(sqlx::Error::RowNotFound)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DeviceApiError::InvalidId("abc".into()).to_string(), "Invalid ID format");
    }
}
