pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateDeviceCommand, CreateDeviceError};
pub use delete::{DeleteDeviceCommand, DeleteDeviceError, DeleteDeviceResponse};
pub use update::{UpdateDeviceCommand, UpdateDeviceError};
