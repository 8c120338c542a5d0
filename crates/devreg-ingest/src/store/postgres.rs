use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::DeviceStore;
use crate::device::Device;
use crate::error::StoreError;

/// Columns written per device row
const DEVICE_COLUMNS: usize = 10;

/// Postgres caps a statement at 65535 bind parameters
const MAX_BIND_PARAMS: usize = 65_535;

const MAX_ROWS_PER_STATEMENT: usize = MAX_BIND_PARAMS / DEVICE_COLUMNS;

/// [`DeviceStore`] backed by the `devices` table
///
/// One batch is written in one transaction. Batches larger than a single
/// statement allows are split into several multi-row inserts inside it.
#[derive(Debug, Clone)]
pub struct PgDeviceStore {
    pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DeviceStore for PgDeviceStore {
    #[tracing::instrument(skip(self, devices), fields(batch_size = devices.len()))]
    async fn bulk_insert(&self, devices: &[Device]) -> Result<u64, StoreError> {
        if devices.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for rows in devices.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"
                INSERT INTO devices (
                    device_name, device_type, brand, model, os, os_version,
                    purchase_date, warranty_end, status, price
                )
                "#,
            );

            query_builder.push_values(rows, |mut b, device| {
                b.push_bind(&device.device_name)
                    .push_bind(&device.device_type)
                    .push_bind(&device.brand)
                    .push_bind(&device.model)
                    .push_bind(&device.os)
                    .push_bind(&device.os_version)
                    .push_bind(&device.purchase_date)
                    .push_bind(&device.warranty_end)
                    .push_bind(&device.status)
                    .push_bind(i64::try_from(device.price).unwrap_or(i64::MAX));
            });

            let result = query_builder.build().execute(&mut *tx).await?;
            written += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!(rows = written, "Batch inserted");
        Ok(written)
    }
}
