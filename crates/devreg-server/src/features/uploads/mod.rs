pub mod commands;
pub mod routes;

pub use commands::{IngestUploadError, IngestUploadResponse};
pub use routes::uploads_routes;
