//! HTTP Basic credential handling
//!
//! Passwords are stored as `hex(SHA-256(salt || password))` with a random
//! per-user salt in the `users` table.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiAuthError {
    /// No `Authorization` header present
    MissingCredentials,

    /// Header present but not a decodable `Basic` credential
    MalformedHeader(String),

    /// Unknown user or wrong password
    InvalidCredentials,

    /// Database error loading or storing users
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingCredentials => {
                write!(f, "Authentication credentials were not provided.")
            }
            ApiAuthError::MalformedHeader(reason) => {
                write!(f, "Invalid basic header: {}", reason)
            }
            ApiAuthError::InvalidCredentials => write!(f, "Invalid username/password."),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Basic Header
// ========================================

/// Username/password pair from an `Authorization: Basic` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Decode an `Authorization` header value
///
/// # Examples
///
/// ```
/// use cev_common::api::auth::{decode_basic_auth, encode_basic_auth};
///
/// let header = encode_basic_auth("admin", "admin123");
/// let creds = decode_basic_auth(&header).unwrap();
/// assert_eq!(creds.username, "admin");
/// assert_eq!(creds.password, "admin123");
/// ```
pub fn decode_basic_auth(header_value: &str) -> Result<BasicCredentials, ApiAuthError> {
    let (scheme, encoded) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ApiAuthError::MalformedHeader("no credentials provided".to_string()))?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(ApiAuthError::MalformedHeader(format!(
            "unsupported scheme '{}'",
            scheme
        )));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiAuthError::MalformedHeader(e.to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| ApiAuthError::MalformedHeader("credentials not UTF-8".to_string()))?;

    // Passwords may contain ':'; usernames may not
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| ApiAuthError::MalformedHeader("missing ':' separator".to_string()))?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Build an `Authorization` header value for Basic auth
pub fn encode_basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

// ========================================
// Password Hashing
// ========================================

/// Random 16-byte salt as 32 hex characters
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Salted SHA-256 of a password, as 64 hex characters
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    if calculated.len() != expected_hash.len() {
        return false;
    }
    // Compare every byte regardless of where the first mismatch is
    calculated
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

// ========================================
// User Storage
// ========================================

/// Create a user, or reset the password of an existing one
///
/// Returns `true` when a new user was created.
#[cfg(feature = "sqlx")]
pub async fn upsert_user(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, ApiAuthError> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    if existing.is_some() {
        sqlx::query(
            "UPDATE users SET password_hash = ?, password_salt = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE username = ?",
        )
        .bind(&hash)
        .bind(&salt)
        .bind(username)
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO users (username, password_hash, password_salt) VALUES (?, ?, ?)")
        .bind(username)
        .bind(&hash)
        .bind(&salt)
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(true)
}

/// Validate credentials against the `users` table
#[cfg(feature = "sqlx")]
pub async fn verify_user(
    db: &SqlitePool,
    credentials: &BasicCredentials,
) -> Result<(), ApiAuthError> {
    let stored: Option<(String, String)> =
        sqlx::query_as("SELECT password_hash, password_salt FROM users WHERE username = ?")
            .bind(&credentials.username)
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match stored {
        Some((hash, salt)) if verify_password(&credentials.password, &salt, &hash) => Ok(()),
        _ => Err(ApiAuthError::InvalidCredentials),
    }
}
