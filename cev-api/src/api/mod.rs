//! HTTP API handlers for cev-api

pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod history;
pub mod report;
pub mod upload;

pub use auth::auth_middleware;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use history::get_history;
pub use report::get_report;
pub use upload::upload_csv;
