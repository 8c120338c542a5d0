//! Get device query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::devices::types::DeviceRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDeviceQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDeviceError {
    #[error("Device {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeviceRecord, GetDeviceError>> for GetDeviceQuery {}

impl crate::cqrs::middleware::Query for GetDeviceQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetDeviceQuery) -> Result<DeviceRecord, GetDeviceError> {
    sqlx::query_as::<_, DeviceRecord>(
        r#"
        SELECT id, device_name, device_type, brand, model, os, os_version,
               purchase_date, warranty_end, status, price, created_at, updated_at
        FROM devices
        WHERE id = $1
        "#,
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetDeviceError::NotFound(query.id))
}
