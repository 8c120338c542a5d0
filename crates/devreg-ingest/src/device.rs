use serde::{Deserialize, Serialize};

/// A device record as produced by the record parser
///
/// Fields are positional in the upload format:
/// `name,type,brand,model,os,os_version,purchase_date,warranty_end,status,price`.
/// Dates are kept as the raw strings the upload carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_name: String,
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub os: String,
    pub os_version: String,
    pub purchase_date: String,
    pub warranty_end: String,
    pub status: String,
    pub price: u64,
}

/// A group of devices written with one bulk insert
pub type Batch = Vec<Device>;
