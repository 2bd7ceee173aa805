//! Terminal rendering of an upload summary
//!
//! Text stand-ins for the distribution pie chart, the average-measurements
//! bar chart, the statistics panel and the details view.

use cev_common::UploadSummary;
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

/// "Equipment Type Distribution": one bar per type with share and count
pub fn type_distribution_chart(upload: &UploadSummary) -> String {
    let mut out = String::from("Equipment Type Distribution\n");
    let total: u64 = upload.type_distribution.values().sum();
    if total == 0 {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = label_width(upload.type_distribution.keys().map(String::as_str));
    for (equipment_type, count) in &upload.type_distribution {
        let share = *count as f64 / total as f64;
        let _ = writeln!(
            out,
            "  {:<width$} {} {:>5.1}% ({})",
            equipment_type,
            bar(share),
            share * 100.0,
            count,
            width = label_width
        );
    }
    out
}

/// "Average Measurements": bars scaled to the largest magnitude
pub fn averages_chart(upload: &UploadSummary) -> String {
    let mut out = String::from("Average Measurements\n");
    let metrics = [
        ("Flowrate", upload.avg_flowrate),
        ("Pressure", upload.avg_pressure),
        ("Temperature", upload.avg_temperature),
    ];

    let max = metrics
        .iter()
        .map(|(_, value)| value.abs())
        .fold(0.0_f64, f64::max);
    let label_width = label_width(metrics.iter().map(|(label, _)| *label));

    for (label, value) in metrics {
        let share = if max > 0.0 { value.abs() / max } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:<width$} {} {:.2}",
            label,
            bar(share),
            value,
            width = label_width
        );
    }
    out
}

/// Statistics panel shown after an upload
pub fn statistics_panel(upload: &UploadSummary) -> String {
    format!(
        "Total Equipment: {}\nAvg Flowrate:    {:.2}\nAvg Pressure:    {:.2}\nAvg Temperature: {:.2}\n",
        upload.equipment_count, upload.avg_flowrate, upload.avg_pressure, upload.avg_temperature
    )
}

/// Full details view: summary block followed by the type breakdown
pub fn details(upload: &UploadSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset:     {}", upload.filename);
    let _ = writeln!(out, "Upload ID:   {}", upload.id);
    let _ = writeln!(
        out,
        "Uploaded at: {}",
        upload.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out.push('\n');
    out.push_str(&statistics_panel(upload));
    out.push_str("\nEquipment Types:\n");
    for (equipment_type, count) in &upload.type_distribution {
        let _ = writeln!(out, "  {}: {}", equipment_type, count);
    }
    out
}

/// One history line: "#id filename (time) - N items"
pub fn history_line(upload: &UploadSummary) -> String {
    format!(
        "#{} {} ({}) - {} items",
        upload.id,
        upload.filename,
        upload.uploaded_at.format("%Y-%m-%d %H:%M"),
        upload.equipment_count
    )
}

fn bar(share: f64) -> String {
    let filled = (share.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(BAR_WIDTH - filled))
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn summary() -> UploadSummary {
        let mut type_distribution = BTreeMap::new();
        type_distribution.insert("Centrifugal".to_string(), 2);
        type_distribution.insert("Ball".to_string(), 1);
        UploadSummary {
            id: 3,
            filename: "plant.csv".to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
            equipment_count: 3,
            avg_flowrate: 63.3333,
            avg_pressure: 31.6667,
            avg_temperature: -15.5,
            type_distribution,
        }
    }

    #[test]
    fn test_distribution_shares() {
        let chart = type_distribution_chart(&summary());
        assert!(chart.starts_with("Equipment Type Distribution"));
        assert!(chart.contains("66.7% (2)"));
        assert!(chart.contains("33.3% (1)"));
    }

    #[test]
    fn test_distribution_empty() {
        let mut upload = summary();
        upload.type_distribution.clear();
        assert!(type_distribution_chart(&upload).contains("(no data)"));
    }

    #[test]
    fn test_averages_two_decimals() {
        let chart = averages_chart(&summary());
        assert!(chart.contains("63.33"));
        assert!(chart.contains("31.67"));
        assert!(chart.contains("-15.50"));
    }

    #[test]
    fn test_largest_average_gets_full_bar() {
        let chart = averages_chart(&summary());
        let flowrate_line = chart.lines().find(|l| l.contains("Flowrate")).unwrap();
        assert!(flowrate_line.contains(&"█".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_history_line() {
        assert_eq!(
            history_line(&summary()),
            "#3 plant.csv (2026-10-19 09:30) - 3 items"
        );
    }

    #[test]
    fn test_details_lists_types() {
        let text = details(&summary());
        assert!(text.contains("Upload ID:   3"));
        assert!(text.contains("  Ball: 1"));
        assert!(text.contains("Total Equipment: 3"));
    }
}
