//! Shared validation utilities for device fields

use thiserror::Error;

/// Column width of every text column on `devices`
pub const MAX_FIELD_LENGTH: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("Device name is required and cannot be empty")]
    NameRequired,

    #[error("{field} must be at most {max_length} characters")]
    TooLong { field: &'static str, max_length: usize },

    #[error("Price cannot be negative")]
    NegativePrice,
}

/// A device name must be non-blank and fit the column
pub fn validate_name(name: &str) -> Result<(), FieldValidationError> {
    if name.trim().is_empty() {
        return Err(FieldValidationError::NameRequired);
    }
    validate_max_length("device_name", name)
}

/// Length is counted in characters, matching `VARCHAR(255)`
pub fn validate_max_length(field: &'static str, value: &str) -> Result<(), FieldValidationError> {
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(FieldValidationError::TooLong {
            field,
            max_length: MAX_FIELD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_price(price: i64) -> Result<(), FieldValidationError> {
    if price < 0 {
        return Err(FieldValidationError::NegativePrice);
    }
    Ok(())
}
