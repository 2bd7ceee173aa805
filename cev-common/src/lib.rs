//! # CEV Common Library
//!
//! Shared code for the Chemical Equipment Visualizer API and desktop client:
//! - Error types
//! - Configuration and root folder resolution
//! - Tabular upload parsing and summary aggregation
//! - Upload store with bounded history (requires the `sqlx` feature)
//! - Ingestion pipeline (requires the `sqlx` feature)
//! - API request/response types and credential helpers

pub mod aggregate;
pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
#[cfg(feature = "sqlx")]
pub mod ingest;
pub mod models;
pub mod tabular;

pub use aggregate::{aggregate, Summary};
pub use error::{Error, Result};
pub use models::UploadSummary;
pub use tabular::{parse, ParseError, Row, REQUIRED_COLUMNS};
