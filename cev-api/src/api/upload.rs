//! CSV upload endpoint
//!
//! POST /api/upload with multipart field `csv_file`.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use cev_common::api::UploadResponse;
use std::path::Path;
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "csv_file";

/// POST /api/upload
///
/// Runs the file through the ingestion pipeline and returns the stored
/// summary with 201 Created.
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().map(base_name).ok_or_else(|| {
            ApiError::BadRequest(
                "The submitted data was not a file. Check the encoding type on the form."
                    .to_string(),
            )
        })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e.body_text())))?;

        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file was submitted.".to_string()))?;

    if !filename.ends_with(".csv") {
        return Err(ApiError::BadRequest("File must be a CSV file.".to_string()));
    }

    info!("Received upload {} ({} bytes)", filename, bytes.len());
    let summary = state.ingestor.ingest(&bytes, &filename).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "CSV uploaded successfully".to_string(),
            data: summary,
        }),
    ))
}

/// Strip any client-side directory components from a filename
fn base_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}
