//! HTTP client for the cev-api endpoints
//!
//! Every failure is translated into a user-facing message; non-2xx bodies are
//! surfaced verbatim when the server sent one.

use cev_common::api::{HistoryResponse, UploadResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const USER_AGENT: &str = concat!("cev-desktop/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client errors, displayed as the message shown to the user
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(
        "Connection Error: Unable to connect to API.\nMake sure the API server is running on {0}"
    )]
    Connection(String),

    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(String),
}

/// Credentials and base URL for one API server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

/// PDF report downloaded from the API
#[derive(Debug, Clone)]
pub struct ReportDownload {
    /// Suggested filename from `Content-Disposition`
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// cev-api client
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Other(e.to_string()))?;

        Ok(Self {
            http_client,
            config: ClientConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Upload a CSV file as multipart field `csv_file`
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        debug!("Uploading {} ({} bytes)", filename, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("text/csv")
            .map_err(|e| ClientError::Other(e.to_string()))?;
        let form = Form::new().part("csv_file", part);

        let request = self.http_client.post(self.url("/api/upload/")).multipart(form);
        let response = self.send(request).await?;
        if response.status() != StatusCode::CREATED {
            return Err(api_error(response).await);
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| ClientError::Other(format!("Unexpected response: {}", e)))
    }

    /// Retained upload history, newest first
    pub async fn history(&self) -> Result<HistoryResponse, ClientError> {
        let request = self.http_client.get(self.url("/api/history/"));
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| ClientError::Other(format!("Unexpected response: {}", e)))
    }

    /// Download the PDF report for an upload (latest when `upload_id` is None)
    pub async fn download_report(
        &self,
        upload_id: Option<i64>,
    ) -> Result<ReportDownload, ClientError> {
        let mut request = self.http_client.get(self.url("/api/report/"));
        if let Some(id) = upload_id {
            request = request.query(&[("upload_id", id)]);
        }

        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| "equipment_report.pdf".to_string());

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        Ok(ReportDownload {
            filename,
            bytes: bytes.to_vec(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        request
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(self.config.base_url.clone())
        } else {
            ClientError::Other(err.to_string())
        }
    }
}

/// Build an [`ClientError::Api`] from a non-success response
async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    ClientError::Api {
        status,
        message: error_message(&text),
    }
}

/// Server-supplied message: `error`, then `detail`, then the raw body
pub fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["error", "detail"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.to_string()
        }
    })
}

/// Extract `filename="..."` from a Content-Disposition value
pub fn attachment_filename(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
