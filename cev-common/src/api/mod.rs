//! API module for shared HTTP API functionality
//!
//! Credential helpers and the JSON payloads exchanged between `cev-api` and
//! `cev-desktop`.
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx, behind the `sqlx` feature)
//! - Shared types
//!
//! The server wraps these with axum middleware; the client consumes the types.

pub mod auth;
pub mod types;

pub use auth::{
    decode_basic_auth, encode_basic_auth, generate_salt, hash_password, verify_password,
    ApiAuthError, BasicCredentials,
};
#[cfg(feature = "sqlx")]
pub use auth::{upsert_user, verify_user};
pub use types::{ErrorResponse, HistoryResponse, UploadResponse};
