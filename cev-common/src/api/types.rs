//! Shared API request/response types
//!
//! Serialized by `cev-api`, deserialized by `cev-desktop`.

use crate::models::UploadSummary;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /api/upload` (201)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub data: UploadSummary,
}

/// Body of `GET /api/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub data: Vec<UploadSummary>,
}

/// JSON error body for every non-2xx response
///
/// # Examples
///
/// ```
/// use cev_common::api::types::ErrorResponse;
///
/// let body = ErrorResponse::new("No valid data found in CSV");
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["error"], "No valid data found in CSV");
/// assert!(json.get("missing_columns").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Columns absent from an upload's header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_columns: Option<Vec<String>>,

    /// Full required-column list, sent with missing-column failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_columns: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            missing_columns: None,
            required_columns: None,
        }
    }
}
