//! Shared utilities and types for feature modules
//!
//! - **pagination**: Pagination parameters and response metadata
//! - **validation**: Input validation for device fields

pub mod pagination;
pub mod validation;

pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
pub use validation::{validate_max_length, validate_name, validate_price, FieldValidationError};
