//! Summary statistics over parsed equipment rows

use crate::tabular::Row;
use std::collections::BTreeMap;

/// Aggregated statistics for one upload
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub equipment_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    /// Rows per equipment type; values sum to `equipment_count`
    pub type_distribution: BTreeMap<String, u64>,
}

/// Reduce rows to count, means and type distribution
///
/// Callers must pass a non-empty slice; the parser guarantees this by
/// rejecting empty datasets.
pub fn aggregate(rows: &[Row]) -> Summary {
    debug_assert!(!rows.is_empty(), "aggregate requires at least one row");

    let count = rows.len() as f64;
    let mut avg_flowrate = 0.0;
    let mut avg_pressure = 0.0;
    let mut avg_temperature = 0.0;
    let mut type_distribution: BTreeMap<String, u64> = BTreeMap::new();

    // Each term is at most max|x| / n, so the running mean stays finite
    // even when the plain sum of finite values would overflow.
    for row in rows {
        avg_flowrate += row.flowrate / count;
        avg_pressure += row.pressure / count;
        avg_temperature += row.temperature / count;
        *type_distribution
            .entry(row.equipment_type.clone())
            .or_insert(0) += 1;
    }

    Summary {
        equipment_count: rows.len() as u64,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
        type_distribution,
    }
}
