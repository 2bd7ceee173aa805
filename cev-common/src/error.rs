//! Library error type shared by the store, config and database layers
//!
//! Parser and pipeline failures have their own enums ([`crate::ParseError`],
//! `ingest::IngestError`); this type covers everything underneath them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query, transaction or pool failure
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem access (root folder, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparsable `config.toml`
    #[error("Configuration error: {0}")]
    Config(String),

    /// No upload with the requested id, or no uploads at all
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data that cannot be decoded (e.g. a corrupt timestamp)
    #[error("Internal error: {0}")]
    Internal(String),
}
