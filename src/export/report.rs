//! PDF test report
//!
//! Page 1 carries the title, the metadata block, the chart image and the
//! start of the sample table. Rows that do not fit continue on further A4
//! pages, each starting with the table header again.

use crate::error::{LoggerError, Result, ResultExt};
use crate::types::{ReportMetadata, Sample, COLUMN_HEADERS};
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::ops::Range;
use std::path::Path;

/// Report title
pub const REPORT_TITLE: &str = "Reporte de Prueba - Celda de Carga";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;

/// Width of each table column
pub const COLUMN_WIDTH_MM: f32 = 60.0;
/// Height of each table row
pub const ROW_HEIGHT_MM: f32 = 8.0;

const TITLE_SIZE_PT: f32 = 16.0;
const BODY_SIZE_PT: f32 = 11.0;
const LINE_SPACING_MM: f32 = 7.0;

/// Width of the chart on the page; height follows the image aspect ratio
const CHART_WIDTH_MM: f32 = 180.0;

/// Where the table starts on page 1 and on continuation pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableLayout {
    /// Top of the header row on page 1
    pub first_top_mm: f32,
    /// Top of the header row on continuation pages
    pub next_top_mm: f32,
    /// Lowest usable y coordinate
    pub bottom_mm: f32,
}

impl TableLayout {
    /// Data rows that fit below the header between `top` and the bottom margin
    fn capacity(&self, top: f32) -> usize {
        let rows = ((top - self.bottom_mm) / ROW_HEIGHT_MM).floor() as usize;
        rows.saturating_sub(1).max(1)
    }

    /// Data rows on page 1
    pub fn first_page_rows(&self) -> usize {
        self.capacity(self.first_top_mm)
    }

    /// Data rows on each continuation page
    pub fn next_page_rows(&self) -> usize {
        self.capacity(self.next_top_mm)
    }

    /// Split `total` rows into per-page ranges
    pub fn paginate(&self, total: usize) -> Vec<Range<usize>> {
        let mut pages = Vec::new();
        let mut start = 0;
        let mut capacity = self.first_page_rows();

        loop {
            let end = (start + capacity).min(total);
            pages.push(start..end);
            if end >= total {
                break;
            }
            start = end;
            capacity = self.next_page_rows();
        }
        pages
    }
}

/// Sample rows as printed in the table (two decimals)
pub fn table_rows(samples: &[Sample]) -> Vec<[String; 3]> {
    samples
        .iter()
        .map(|s| {
            [
                format!("{:.2}", s.time_s),
                format!("{:.2}", s.weight_kg),
                format!("{:.2}", s.rate_kg_per_s),
            ]
        })
        .collect()
}

fn report_err<E: std::fmt::Display>(e: E) -> LoggerError {
    LoggerError::Report(e.to_string())
}

/// Cursor over a single page layer
struct PageWriter<'a> {
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

impl PageWriter<'_> {
    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { self.bold } else { self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn cell_border(&self, x: f32, top: f32) {
        let points = vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + COLUMN_WIDTH_MM), Mm(top)), false),
            (Point::new(Mm(x + COLUMN_WIDTH_MM), Mm(top - ROW_HEIGHT_MM)), false),
            (Point::new(Mm(x), Mm(top - ROW_HEIGHT_MM)), false),
        ];
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    /// Draw one bordered row with its top edge at `top`
    fn row(&self, cells: &[&str; 3], top: f32, bold: bool) {
        for (i, cell) in cells.iter().enumerate() {
            let x = MARGIN_MM + i as f32 * COLUMN_WIDTH_MM;
            self.cell_border(x, top);
            self.text(cell, BODY_SIZE_PT - 1.0, x + 2.0, top - ROW_HEIGHT_MM + 2.5, bold);
        }
    }

    /// Draw the header and `rows` starting at `top`; returns the data rows drawn
    fn table(&self, rows: &[[String; 3]], top: f32) -> usize {
        self.row(&COLUMN_HEADERS, top, true);
        let mut drawn = 0;
        for (i, row) in rows.iter().enumerate() {
            let row_top = top - (i + 1) as f32 * ROW_HEIGHT_MM;
            self.row(&[&row[0], &row[1], &row[2]], row_top, false);
            drawn += 1;
        }
        drawn
    }
}

/// Load the chart PNG as a PDF image
fn load_chart(path: &Path) -> Result<(Image, (u32, u32))> {
    let mut file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
    let decoder = PngDecoder::new(&mut file).map_err(report_err)?;
    let size = printpdf::image_crate::ImageDecoder::dimensions(&decoder);
    let image = Image::try_from(decoder).map_err(report_err)?;
    Ok((image, size))
}

/// What a written report contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub pages: usize,
    /// Data rows drawn across all pages, headers excluded
    pub table_rows: usize,
}

/// Write the report for `samples` to `path`, embedding `chart_png`.
pub fn write_report(
    path: &Path,
    metadata: &ReportMetadata,
    chart_png: &Path,
    samples: &[Sample],
) -> Result<ReportSummary> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(report_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(report_err)?;

    let page = PageWriter {
        layer: doc.get_page(first_page).get_layer(first_layer),
        regular: &regular,
        bold: &bold,
    };
    page.layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    page.layer.set_outline_thickness(0.5);

    // Title and metadata
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM - 5.0;
    page.text(REPORT_TITLE, TITLE_SIZE_PT, MARGIN_MM, y, true);
    y -= LINE_SPACING_MM + 3.0;
    for (label, value) in metadata.labeled_fields() {
        page.text(&format!("{}: {}", label, value), BODY_SIZE_PT, MARGIN_MM, y, false);
        y -= LINE_SPACING_MM;
    }

    // Chart, scaled to CHART_WIDTH_MM
    let (image, (width_px, height_px)) = load_chart(chart_png)?;
    let dpi = width_px as f32 * 25.4 / CHART_WIDTH_MM;
    let chart_height_mm = height_px as f32 * 25.4 / dpi;
    let chart_bottom = y - chart_height_mm;
    image.add_to_layer(
        page.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM)),
            translate_y: Some(Mm(chart_bottom)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    let layout = TableLayout {
        first_top_mm: chart_bottom - LINE_SPACING_MM,
        next_top_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        bottom_mm: MARGIN_MM,
    };

    let rows = table_rows(samples);
    let pages = layout.paginate(rows.len());
    let mut drawn = page.table(&rows[pages[0].clone()], layout.first_top_mm);

    for (n, range) in pages.iter().enumerate().skip(1) {
        let (page_index, layer_index) = doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Layer {}", n + 1),
        );
        let page = PageWriter {
            layer: doc.get_page(page_index).get_layer(layer_index),
            regular: &regular,
            bold: &bold,
        };
        page.layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        page.layer.set_outline_thickness(0.5);
        drawn += page.table(&rows[range.clone()], layout.next_top_mm);
    }

    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    doc.save(&mut BufWriter::new(file)).map_err(report_err)?;

    tracing::debug!(
        "Wrote report with {} rows on {} pages to {:?}",
        drawn,
        pages.len(),
        path
    );
    Ok(ReportSummary {
        pages: pages.len(),
        table_rows: drawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TableLayout {
        TableLayout {
            first_top_mm: 120.0,
            next_top_mm: 282.0,
            bottom_mm: 15.0,
        }
    }

    #[test]
    fn test_table_rows_two_decimals() {
        let rows = table_rows(&[Sample::new(0.5, 1.2, 0.4), Sample::new(1.005, -3.0, 12.3456)]);
        assert_eq!(rows[0], ["0.50", "1.20", "0.40"]);
        assert_eq!(rows[1][1], "-3.00");
        assert_eq!(rows[1][2], "12.35");
    }

    #[test]
    fn test_capacity() {
        // (120 - 15) / 8 = 13 rows, one of them the header
        assert_eq!(layout().first_page_rows(), 12);
        // (282 - 15) / 8 = 33 rows
        assert_eq!(layout().next_page_rows(), 32);
    }

    #[test]
    fn test_small_table_fits_first_page() {
        assert_eq!(layout().paginate(3), vec![0..3]);
        assert_eq!(layout().paginate(12), vec![0..12]);
    }

    #[test]
    fn test_rows_flow_onto_continuation_pages() {
        let pages = layout().paginate(100);
        assert_eq!(pages, vec![0..12, 12..44, 44..76, 76..100]);

        let covered: usize = pages.iter().map(|r| r.len()).sum();
        assert_eq!(covered, 100);
    }

    #[test]
    fn test_empty_table_is_one_page() {
        assert_eq!(layout().paginate(0), vec![0..0]);
    }
}
