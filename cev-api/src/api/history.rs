//! Upload history endpoint

use axum::{extract::State, Json};
use cev_common::api::HistoryResponse;
use cev_common::db::RETENTION_LIMIT;

use crate::{ApiResult, AppState};

/// GET /api/history
///
/// Retained uploads, newest first (at most five).
pub async fn get_history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    let uploads = state.store().list_recent(RETENTION_LIMIT).await?;

    Ok(Json(HistoryResponse {
        count: uploads.len(),
        data: uploads,
    }))
}
