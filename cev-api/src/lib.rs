//! cev-api library - Chemical Equipment Visualizer HTTP API
//!
//! Accepts CSV uploads of equipment readings, keeps the five most recent
//! summaries and renders PDF reports for them.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use cev_common::db::UploadStore;
use cev_common::ingest::Ingestor;
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod report;

pub use crate::error::{ApiError, ApiResult};

/// Largest accepted request body
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Requests running longer than this are aborted with 408
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Upload pipeline (owns the upload store)
    pub ingestor: Ingestor,
    /// When false every protected route is open (local use and tests)
    pub auth_enabled: bool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, auth_enabled: bool) -> Self {
        let ingestor = Ingestor::new(UploadStore::new(db.clone()));
        Self {
            db,
            ingestor,
            auth_enabled,
        }
    }

    pub fn store(&self) -> &UploadStore {
        self.ingestor.store()
    }
}

/// Build application router
///
/// Health and build info are public; upload, history and report require
/// Basic credentials.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require authentication), with trailing-slash aliases
    let protected = Router::new()
        .route("/api/upload", post(api::upload_csv))
        .route("/api/upload/", post(api::upload_csv))
        .route("/api/history", get(api::get_history))
        .route("/api/history/", get(api::get_history))
        .route("/api/report", get(api::get_report))
        .route("/api/report/", get(api::get_report))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
