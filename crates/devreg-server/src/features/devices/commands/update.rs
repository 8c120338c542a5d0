//! Update device command
//!
//! Partially updates an existing device. Only the fields that are provided
//! are changed; others keep their stored value.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::devices::types::DeviceRecord;
use crate::features::shared::validation::{
    validate_max_length, validate_name, validate_price, FieldValidationError,
};

/// Command to update an existing device
///
/// `id` comes from the request path, never from the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeviceCommand {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateDeviceError {
    #[error("At least one field must be provided for update")]
    NoFieldsToUpdate,

    #[error(transparent)]
    Validation(#[from] FieldValidationError),

    #[error("Device {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeviceRecord, UpdateDeviceError>> for UpdateDeviceCommand {}

impl crate::cqrs::middleware::Command for UpdateDeviceCommand {}

impl UpdateDeviceCommand {
    fn text_fields(&self) -> [(&'static str, Option<&String>); 8] {
        [
            ("device_type", self.device_type.as_ref()),
            ("brand", self.brand.as_ref()),
            ("model", self.model.as_ref()),
            ("os", self.os.as_ref()),
            ("os_version", self.os_version.as_ref()),
            ("purchase_date", self.purchase_date.as_ref()),
            ("warranty_end", self.warranty_end.as_ref()),
            ("status", self.status.as_ref()),
        ]
    }

    pub fn validate(&self) -> Result<(), UpdateDeviceError> {
        let text_fields = self.text_fields();

        if self.device_name.is_none()
            && self.price.is_none()
            && text_fields.iter().all(|(_, value)| value.is_none())
        {
            return Err(UpdateDeviceError::NoFieldsToUpdate);
        }

        if let Some(ref name) = self.device_name {
            validate_name(name)?;
        }

        for (field, value) in text_fields {
            if let Some(value) = value {
                validate_max_length(field, value)?;
            }
        }

        if let Some(price) = self.price {
            validate_price(price)?;
        }

        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(id = command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateDeviceCommand,
) -> Result<DeviceRecord, UpdateDeviceError> {
    command.validate()?;

    let device = sqlx::query_as::<_, DeviceRecord>(
        r#"
        UPDATE devices
        SET device_name = COALESCE($2, device_name),
            device_type = COALESCE($3, device_type),
            brand = COALESCE($4, brand),
            model = COALESCE($5, model),
            os = COALESCE($6, os),
            os_version = COALESCE($7, os_version),
            purchase_date = COALESCE($8, purchase_date),
            warranty_end = COALESCE($9, warranty_end),
            status = COALESCE($10, status),
            price = COALESCE($11, price),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, device_name, device_type, brand, model, os, os_version,
                  purchase_date, warranty_end, status, price, created_at, updated_at
        "#,
    )
    .bind(command.id)
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
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateDeviceError::NotFound(command.id))?;

    Ok(device)
}
