//! PDF report endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use cev_common::models::UploadSummary;
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};

use crate::{report, ApiError, ApiResult, AppState};

/// Query parameters for report generation
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Upload to report on; most recent upload when absent
    pub upload_id: Option<String>,
}

/// GET /api/report?upload_id=<id>
///
/// Returns the PDF as a download named `equipment_report_<id>.pdf`.
pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Response> {
    let upload = resolve_upload(&state, query.upload_id.as_deref()).await?;

    let pdf = report::render(&upload, Utc::now()).map_err(|e| {
        error!("Report generation failed for upload {}: {}", upload.id, e);
        ApiError::Internal(format!("Error generating PDF report: {}", e))
    })?;

    info!("Generated report for upload {} ({} bytes)", upload.id, pdf.len());

    let disposition = format!("attachment; filename=\"equipment_report_{}.pdf\"", upload.id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

async fn resolve_upload(state: &AppState, upload_id: Option<&str>) -> ApiResult<UploadSummary> {
    let upload_id = upload_id.map(str::trim).filter(|id| !id.is_empty());

    match upload_id {
        Some(raw) => {
            let id: i64 = raw
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid upload_id '{}'", raw)))?;
            state.store().get(id).await.map_err(|e| match e {
                cev_common::Error::NotFound(_) => {
                    ApiError::NotFound(format!("Upload with ID {} not found.", id))
                }
                other => other.into(),
            })
        }
        None => state.store().latest().await.map_err(|e| match e {
            cev_common::Error::NotFound(_) => ApiError::NotFound(
                "No uploads found. Please upload a CSV file first.".to_string(),
            ),
            other => other.into(),
        }),
    }
}
