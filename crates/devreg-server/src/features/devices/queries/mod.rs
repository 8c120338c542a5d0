pub mod get;
pub mod list;

pub use get::{GetDeviceError, GetDeviceQuery};
pub use list::{ListDevicesError, ListDevicesQuery, ListDevicesResponse};
