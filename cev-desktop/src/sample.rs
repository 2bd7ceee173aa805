//! Bundled sample dataset

use cev_common::REQUIRED_COLUMNS;
use std::path::Path;

/// (name, type, flowrate, pressure, temperature)
pub const SAMPLE_ROWS: [(&str, &str, f64, f64, f64); 8] = [
    ("Pump A", "Centrifugal", 100.5, 50.2, 25.1),
    ("Pump B", "Reciprocating", 85.3, 45.8, 26.5),
    ("Compressor X", "Rotary", 120.0, 60.5, 30.2),
    ("Valve Y", "Ball", 45.8, 40.1, 22.0),
    ("Turbine Z", "Centrifugal", 200.5, 75.3, 35.8),
    ("Motor W", "Electric", 75.2, 52.1, 28.5),
    ("Blower V", "Axial", 110.3, 55.8, 24.3),
    ("Filter U", "Mechanical", 30.1, 38.5, 20.1),
];

/// Serialize the sample dataset as CSV
pub fn sample_csv() -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REQUIRED_COLUMNS)?;
    for (name, equipment_type, flowrate, pressure, temperature) in SAMPLE_ROWS {
        writer.write_record([
            name.to_string(),
            equipment_type.to_string(),
            flowrate.to_string(),
            pressure.to_string(),
            temperature.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write the sample dataset to `path`
pub fn write_sample_csv(path: &Path) -> anyhow::Result<()> {
    let bytes = sample_csv()?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cev_common::{aggregate, parse};

    #[test]
    fn test_sample_parses_cleanly() {
        let bytes = sample_csv().unwrap();
        let rows = parse(&bytes, &REQUIRED_COLUMNS).unwrap();
        assert_eq!(rows.len(), SAMPLE_ROWS.len());

        let summary = aggregate(&rows);
        assert_eq!(summary.equipment_count, 8);
        assert_eq!(summary.type_distribution["Centrifugal"], 2);
    }

    #[test]
    fn test_write_sample_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample_equipment_data.csv");

        write_sample_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Equipment Name,Type,Flowrate,Pressure,Temperature"));
        assert!(text.contains("Turbine Z,Centrifugal,200.5,75.3,35.8"));
    }
}
