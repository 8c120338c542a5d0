//! Create device command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::devices::types::DeviceRecord;
use crate::features::shared::validation::{
    validate_max_length, validate_name, validate_price, FieldValidationError,
};

/// Command to register a single device
///
/// Every field except `device_name` may be omitted and defaults to empty
/// (or 0 for `price`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDeviceCommand {
    pub device_name: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
    pub purchase_date: String,
    pub warranty_end: String,
    pub status: String,
    pub price: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateDeviceError {
    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeviceRecord, CreateDeviceError>> for CreateDeviceCommand {}

impl crate::cqrs::middleware::Command for CreateDeviceCommand {}

impl CreateDeviceCommand {
    pub fn validate(&self) -> Result<(), CreateDeviceError> {
        validate_name(&self.device_name)?;

        for (field, value) in [
            ("device_type", &self.device_type),
            ("brand", &self.brand),
            ("model", &self.model),
            ("os", &self.os),
            ("os_version", &self.os_version),
            ("purchase_date", &self.purchase_date),
            ("warranty_end", &self.warranty_end),
            ("status", &self.status),
        ] {
            validate_max_length(field, value)?;
        }

        validate_price(self.price)?;

        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(device_name = %command.device_name))]
pub async fn handle(
    pool: PgPool,
    command: CreateDeviceCommand,
) -> Result<DeviceRecord, CreateDeviceError> {
    command.validate()?;

    let device = sqlx::query_as::<_, DeviceRecord>(
        r#"
        INSERT INTO devices (
            device_name, device_type, brand, model, os, os_version,
            purchase_date, warranty_end, status, price
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, device_name, device_type, brand, model, os, os_version,
                  purchase_date, warranty_end, status, price, created_at, updated_at
        "#,
    )
    .bind(&command.device_name)
    .bind(&command.device_type)
    .bind(&command.brand)
    .bind(&command.model)
    .bind(&command.os)
    .bind(&command.os_version)
    .bind(&command.purchase_date)
    .bind(&command.warranty_end)
    .bind(&command.status)
    .bind(command.price)
    .fetch_one(&pool)
    .await?;

    Ok(device)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn command(name: &str) -> CreateDeviceCommand {
        CreateDeviceCommand {
            device_name: name.to_string(),
            device_type: "laptop".to_string(),
            brand: "acme".to_string(),
            price: 1200,
            ..Default::default()
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command("laptop-01").validate().is_ok());
    }

    #[test]
    fn test_validation_blank_name() {
        let err = command("  ").validate().unwrap_err();
        assert!(matches!(err, CreateDeviceError::Validation(FieldValidationError::NameRequired)));
    }

    #[test]
    fn test_validation_long_field() {
        let mut cmd = command("laptop-01");
        cmd.status = "s".repeat(300);
        let err = cmd.validate().unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_validation_negative_price() {
        let mut cmd = command("laptop-01");
        cmd.price = -10;
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let cmd: CreateDeviceCommand = serde_json::from_str(r#"{"device_name":"tab-7"}"#).unwrap();
        assert_eq!(cmd.device_name, "tab-7");
        assert_eq!(cmd.brand, "");
        assert_eq!(cmd.price, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_handle_inserts_device(pool: PgPool) -> sqlx::Result<()> {
        let device = handle(pool.clone(), command("laptop-01")).await.unwrap();
        assert!(device.id > 0);
        assert_eq!(device.device_name, "laptop-01");
        assert_eq!(device.price, 1200);
        Ok(())
    }
}
