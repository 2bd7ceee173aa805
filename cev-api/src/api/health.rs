//! Liveness endpoint used by deployment checks and the desktop client

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

const MODULE_NAME: &str = "cev-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process can answer requests
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

/// GET /health (public)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: MODULE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted outside the auth layer
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
