//! Database initialization and the upload store

pub mod init;
pub mod uploads;

pub use init::*;
pub use uploads::{UploadStore, RETENTION_LIMIT};
