//! PDF report renderer
//!
//! Fixed single-page US Letter layout built from one stored upload summary.
//! Rendering never touches the store.

use cev_common::models::UploadSummary;
use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;
const ROW_HEIGHT: f32 = 9.0;

const TITLE_BLUE: (u8, u8, u8) = (0x1f, 0x47, 0x88);
const HEADING_BLUE: (u8, u8, u8) = (0x2e, 0x5c, 0x8a);
const GRID_GREY: (u8, u8, u8) = (0xcc, 0xcc, 0xcc);
const FOOTER_GREY: (u8, u8, u8) = (0x66, 0x66, 0x66);
const BLACK: (u8, u8, u8) = (0, 0, 0);

/// Report rendering failure
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}

/// Render the report for one upload
pub fn render(upload: &UploadSummary, generated_at: DateTime<Utc>) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        "Equipment Analysis Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Report",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut page = PageWriter {
        layer: doc.get_page(page).get_layer(layer),
        regular,
        bold,
        cursor: PAGE_HEIGHT - MARGIN,
    };

    page.centered_title("Equipment Analysis Report");

    page.heading("Report Information");
    page.table(
        &[50.8, 101.6],
        &[
            vec!["Dataset Name:".to_string(), upload.filename.clone()],
            vec!["Generated:".to_string(), long_timestamp(&generated_at)],
            vec!["Upload Time:".to_string(), long_timestamp(&upload.uploaded_at)],
            vec!["Report ID:".to_string(), format!("Upload #{}", upload.id)],
        ],
        false,
    );

    page.heading("Summary Statistics");
    page.table(
        &[63.5, 88.9],
        &[
            vec!["Metric".to_string(), "Value".to_string()],
            vec![
                "Total Equipment Count".to_string(),
                upload.equipment_count.to_string(),
            ],
            vec!["Average Flowrate".to_string(), format!("{:.2}", upload.avg_flowrate)],
            vec!["Average Pressure".to_string(), format!("{:.2}", upload.avg_pressure)],
            vec![
                "Average Temperature".to_string(),
                temperature_label(upload.avg_temperature),
            ],
        ],
        true,
    );

    page.heading("Equipment Type Distribution");
    if upload.type_distribution.is_empty() {
        page.paragraph("No equipment type distribution data available.");
    } else {
        // BTreeMap iteration is already sorted by type name
        let mut rows = vec![vec!["Equipment Type".to_string(), "Count".to_string()]];
        rows.extend(
            upload
                .type_distribution
                .iter()
                .map(|(equipment_type, count)| vec![equipment_type.clone(), count.to_string()]),
        );
        page.table(&[76.2, 76.2], &rows, true);
    }

    page.footer(
        "This report was automatically generated by the Chemical Equipment Parameter Visualizer.",
    );

    Ok(doc.save_to_bytes()?)
}

/// "October 19, 2026 at 14:05:09"
fn long_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%B %d, %Y at %H:%M:%S").to_string()
}

/// Builtin fonts carry no reliable glyph for `°`, so keep report text ASCII
fn temperature_label(value: f64) -> String {
    format!("{:.2} deg C", value)
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

/// Top-down text cursor over one page layer
struct PageWriter {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, in mm from the bottom edge
    cursor: f32,
}

impl PageWriter {
    fn centered_title(&mut self, text: &str) {
        let size = 24.0;
        let x = (PAGE_WIDTH - approx_text_width(text, size)) / 2.0;
        self.layer.set_fill_color(rgb(TITLE_BLUE));
        self.layer
            .use_text(text, size, Mm(x.max(MARGIN)), Mm(self.cursor), &self.bold);
        self.cursor -= 18.0;
    }

    fn heading(&mut self, text: &str) {
        self.cursor -= 4.0;
        self.layer.set_fill_color(rgb(HEADING_BLUE));
        self.layer
            .use_text(text, 14.0, Mm(MARGIN), Mm(self.cursor), &self.bold);
        self.cursor -= 8.0;
    }

    fn paragraph(&mut self, text: &str) {
        self.layer.set_fill_color(rgb(BLACK));
        self.layer
            .use_text(text, 11.0, Mm(MARGIN), Mm(self.cursor), &self.regular);
        self.cursor -= ROW_HEIGHT;
    }

    /// Grid table; with `header_row` the first row is bold, otherwise the
    /// first column is
    fn table(&mut self, widths: &[f32], rows: &[Vec<String>], header_row: bool) {
        let total_width: f32 = widths.iter().sum();
        let top = self.cursor;

        for (r, row) in rows.iter().enumerate() {
            let baseline = top - ROW_HEIGHT * (r as f32) - ROW_HEIGHT + 3.0;
            let mut x = MARGIN;
            for (c, (cell, width)) in row.iter().zip(widths).enumerate() {
                let font = if (header_row && r == 0) || (!header_row && c == 0) {
                    &self.bold
                } else {
                    &self.regular
                };
                self.layer.set_fill_color(rgb(BLACK));
                self.layer
                    .use_text(cell.as_str(), 10.0, Mm(x + 2.0), Mm(baseline), font);
                x += width;
            }
        }

        let bottom = top - ROW_HEIGHT * rows.len() as f32;
        self.layer.set_outline_color(rgb(GRID_GREY));
        self.layer.set_outline_thickness(0.75);

        for r in 0..=rows.len() {
            let y = top - ROW_HEIGHT * r as f32;
            self.line((MARGIN, y), (MARGIN + total_width, y));
        }
        let mut x = MARGIN;
        self.line((x, top), (x, bottom));
        for width in widths {
            x += width;
            self.line((x, top), (x, bottom));
        }

        self.cursor = bottom - 8.0;
    }

    fn footer(&mut self, text: &str) {
        let size = 9.0;
        let x = (PAGE_WIDTH - approx_text_width(text, size)) / 2.0;
        self.layer.set_fill_color(rgb(FOOTER_GREY));
        self.layer
            .use_text(text, size, Mm(x.max(MARGIN)), Mm(self.cursor), &self.regular);
    }

    fn line(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }
}

/// Rough Helvetica width (average glyph ≈ 0.5 em) for centering
fn approx_text_width(text: &str, size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 0.3528;
    text.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM
}
