//! Error types for cev-api
//!
//! Maps ingestion, store and request failures onto HTTP status codes with a
//! JSON `{"error": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cev_common::api::ErrorResponse;
use cev_common::ingest::IngestError;
use cev_common::ParseError;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload body is not a decodable table (400)
    #[error("Invalid CSV format: {0}")]
    MalformedInput(String),

    /// Required columns absent from the upload header (400)
    #[error("Missing columns: {}", missing.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// No valid rows in the upload (400)
    #[error("No valid data found in CSV")]
    EmptyDataset,

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Insert + retention failed as a unit (500)
    #[error("Error processing file: {0}")]
    StorageFailure(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// cev-common error
    #[error("{0}")]
    Common(#[from] cev_common::Error),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Invalid(ParseError::MalformedInput { reason }) => {
                ApiError::MalformedInput(reason)
            }
            IngestError::Invalid(ParseError::MissingColumns { missing, required }) => {
                ApiError::MissingColumns { missing, required }
            }
            IngestError::Invalid(ParseError::EmptyDataset) => ApiError::EmptyDataset,
            IngestError::StorageFailure(msg) => ApiError::StorageFailure(msg),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_)
            | ApiError::MissingColumns { .. }
            | ApiError::EmptyDataset
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Common(cev_common::Error::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::StorageFailure(_) | ApiError::Internal(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorResponse::new(self.to_string());

        if let ApiError::MissingColumns { missing, required } = self {
            body.missing_columns = Some(missing);
            body.required_columns = Some(required);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
