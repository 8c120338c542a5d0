//! Delete device command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDeviceCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDeviceResponse {
    pub id: i64,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDeviceError {
    #[error("Device {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteDeviceResponse, DeleteDeviceError>> for DeleteDeviceCommand {}

impl crate::cqrs::middleware::Command for DeleteDeviceCommand {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    command: DeleteDeviceCommand,
) -> Result<DeleteDeviceResponse, DeleteDeviceError> {
    let result = sqlx::query("DELETE FROM devices WHERE id = $1")
        .bind(command.id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteDeviceError::NotFound(command.id));
    }

    Ok(DeleteDeviceResponse {
        id: command.id,
        deleted: true,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(DeleteDeviceError::NotFound(42).to_string(), "Device 42 not found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_delete_twice(pool: PgPool) -> sqlx::Result<()> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO devices (device_name) VALUES ('doomed') RETURNING id",
        )
        .fetch_one(&pool)
        .await?;

        let response = handle(pool.clone(), DeleteDeviceCommand { id }).await.unwrap();
        assert!(response.deleted);

        let again = handle(pool, DeleteDeviceCommand { id }).await;
        assert!(matches!(again, Err(DeleteDeviceError::NotFound(_))));
        Ok(())
    }
}
