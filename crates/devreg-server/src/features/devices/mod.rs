pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use commands::{
    CreateDeviceCommand, CreateDeviceError, DeleteDeviceCommand, DeleteDeviceError,
    DeleteDeviceResponse, UpdateDeviceCommand, UpdateDeviceError,
};
pub use queries::{
    GetDeviceError, GetDeviceQuery, ListDevicesError, ListDevicesQuery, ListDevicesResponse,
};
pub use routes::devices_routes;
pub use types::DeviceRecord;
