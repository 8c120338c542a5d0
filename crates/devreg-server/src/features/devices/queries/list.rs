//! List devices query
//!
//! Pages through devices in ascending id order.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::devices::types::DeviceRecord;
use crate::features::shared::pagination::{Paginated, PaginationParams};

/// `GET /device?page=&limit=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDevicesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

pub type ListDevicesResponse = Paginated<DeviceRecord>;

#[derive(Debug, thiserror::Error)]
pub enum ListDevicesError {
    #[error("{0}")]
    InvalidPagination(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListDevicesResponse, ListDevicesError>> for ListDevicesQuery {}

impl crate::cqrs::middleware::Query for ListDevicesQuery {}

impl ListDevicesQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.limit)
    }

    pub fn validate(&self) -> Result<(), ListDevicesError> {
        self.pagination().validate().map_err(ListDevicesError::InvalidPagination)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListDevicesQuery,
) -> Result<ListDevicesResponse, ListDevicesError> {
    query.validate()?;

    let params = query.pagination();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
        .fetch_one(&pool)
        .await?;

    let items = sqlx::query_as::<_, DeviceRecord>(
        r#"
        SELECT id, device_name, device_type, brand, model, os, os_version,
               purchase_date, warranty_end, status, price, created_at, updated_at
        FROM devices
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::from_items(items, &params, total))
}
