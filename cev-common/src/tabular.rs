//! Tabular upload parser
//!
//! Turns raw uploaded bytes into validated equipment rows. Rows with any
//! missing or unparsable field are dropped, never partially kept.

use csv::{ReaderBuilder, Trim};
use thiserror::Error;
use tracing::debug;

/// Column names every upload must carry (case-sensitive, exact)
///
/// Order maps onto [`Row`] fields: name, type, flowrate, pressure, temperature.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Equipment Name",
    "Type",
    "Flowrate",
    "Pressure",
    "Temperature",
];

/// Cell values treated as absent, matching common spreadsheet/pandas exports
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "N/A", "NA", "NULL", "NaN", "-NaN", "None", "n/a", "nan",
    "-nan", "null",
];

/// One fully-populated equipment reading
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Validation failures for an uploaded table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Bytes do not decode as a delimited table with a header row
    #[error("Invalid CSV format: {reason}")]
    MalformedInput { reason: String },

    /// Header lacks one or more required columns
    #[error("Missing columns: {}", missing.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// No row survived validity filtering
    #[error("No valid data found in CSV")]
    EmptyDataset,
}

impl ParseError {
    fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedInput {
            reason: reason.into(),
        }
    }
}

/// Parse an uploaded table into valid rows
///
/// `required_columns` names the header cells holding equipment name, type,
/// flowrate, pressure and temperature, in that order. Extra columns are
/// ignored and column order in the file does not matter.
pub fn parse(bytes: &[u8], required_columns: &[&str; 5]) -> Result<Vec<Row>, ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let text = std::str::from_utf8(bytes)
        .map_err(|e| ParseError::malformed(format!("file is not valid UTF-8 ({})", e)))?;
    if text.trim().is_empty() {
        return Err(ParseError::malformed("no columns to parse from file"));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        // Header cells are matched verbatim; only data cells are trimmed
        .trim(Trim::Fields)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ParseError::malformed(e.to_string()))?
        .clone();
    let header_width = headers.len();

    let mut indices = [0usize; 5];
    let mut missing = Vec::new();
    for (slot, name) in indices.iter_mut().zip(required_columns.iter()) {
        match headers.iter().position(|h| h == *name) {
            Some(index) => *slot = index,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns {
            missing,
            required: required_columns.iter().map(|c| c.to_string()).collect(),
        });
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ParseError::malformed(e.to_string()))?;
        // Short records leave trailing cells empty; long ones are structural errors.
        if record.len() > header_width {
            return Err(ParseError::malformed(format!(
                "expected {} fields in line {}, saw {}",
                header_width,
                line + 2,
                record.len()
            )));
        }

        let cell = |i: usize| record.get(indices[i]);
        let row = text_cell(cell(0)).and_then(|equipment_name| {
            Some(Row {
                equipment_name,
                equipment_type: text_cell(cell(1))?,
                flowrate: numeric_cell(cell(2))?,
                pressure: numeric_cell(cell(3))?,
                temperature: numeric_cell(cell(4))?,
            })
        });

        match row {
            Some(row) => rows.push(row),
            None => dropped += 1,
        }
    }

    debug!("Parsed {} valid rows, dropped {}", rows.len(), dropped);

    if rows.is_empty() {
        return Err(ParseError::EmptyDataset);
    }
    Ok(rows)
}

fn is_absent(value: &str) -> bool {
    NA_MARKERS.contains(&value)
}

fn text_cell(value: Option<&str>) -> Option<String> {
    value.filter(|v| !is_absent(v)).map(str::to_string)
}

fn numeric_cell(value: Option<&str>) -> Option<f64> {
    value
        .filter(|v| !is_absent(v))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
