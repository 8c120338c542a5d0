//! Row type shared by the device commands and queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `devices` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceRecord {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
