//! Persisted upload summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for one successful upload, as stored and served
///
/// Serializes to the JSON shape returned by `/api/upload` and `/api/history`;
/// `uploaded_at` is emitted as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub id: i64,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub equipment_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    #[serde(default)]
    pub type_distribution: BTreeMap<String, u64>,
}
