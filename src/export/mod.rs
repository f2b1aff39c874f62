//! Test data export
//!
//! An export turns a dataset snapshot into three files derived from the
//! CSV path the user picked:
//!
//! | File | Name | Lifetime |
//! |------|------|----------|
//! | CSV | `<stem>.csv` (as chosen) | kept |
//! | Chart | `<stem>_grafico.png` | removed once the report is written or fails |
//! | Report | `<stem>.pdf` | kept |
//!
//! Steps run in order and stop at the first failure. A CSV already written
//! is left in place.

pub mod chart;
pub mod csv;
pub mod report;

pub use chart::{ChartRenderer, PlottersChart};

use crate::error::{LoggerError, Result, ResultExt};
use crate::types::{PlotSeries, ReportMetadata, Sample};
use std::path::{Path, PathBuf};

/// Suffix appended to the CSV stem for the chart image
pub const CHART_SUFFIX: &str = "_grafico";

/// Files produced by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub chart: PathBuf,
    pub report: PathBuf,
}

impl ExportPaths {
    /// Derive the chart and report paths from the chosen CSV path
    pub fn from_csv(csv: impl Into<PathBuf>) -> Self {
        let csv = csv.into();
        let stem = csv
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reporte".to_string());

        let chart = csv.with_file_name(format!("{}{}.png", stem, CHART_SUFFIX));
        let report = csv.with_file_name(format!("{}.pdf", stem));
        Self { csv, chart, report }
    }
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub csv: PathBuf,
    pub report: PathBuf,
    /// Data rows written to the CSV
    pub rows: usize,
    /// Data rows drawn in the report table
    pub table_rows: usize,
    /// Pages in the report
    pub pages: usize,
}

/// Removes a file when dropped
struct TransientFile<'a>(&'a Path);

impl Drop for TransientFile<'_> {
    fn drop(&mut self) {
        match std::fs::remove_file(self.0) {
            Ok(()) => tracing::trace!("Removed {:?}", self.0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {:?}: {}", self.0, e),
        }
    }
}

/// Writes CSV, chart and report for a dataset snapshot
pub struct Exporter {
    chart: Box<dyn ChartRenderer>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Exporter using the `plotters` chart renderer
    pub fn new() -> Self {
        Self::with_renderer(Box::new(PlottersChart))
    }

    /// Exporter using a custom chart renderer
    pub fn with_renderer(chart: Box<dyn ChartRenderer>) -> Self {
        Self { chart }
    }

    /// Export `samples` next to `csv_path`.
    ///
    /// Fails with [`LoggerError::NothingToExport`] before touching the
    /// filesystem when `samples` is empty.
    pub fn export(
        &self,
        samples: &[Sample],
        metadata: &ReportMetadata,
        csv_path: &Path,
    ) -> Result<ExportSummary> {
        if samples.is_empty() {
            return Err(LoggerError::NothingToExport);
        }

        let paths = ExportPaths::from_csv(csv_path);
        tracing::info!("Exporting {} samples to {:?}", samples.len(), paths.csv);

        csv::write_csv(&paths.csv, samples).context("Exportando CSV")?;

        let _chart_guard = TransientFile(&paths.chart);
        self.chart
            .render(&PlotSeries::from_samples(samples), &paths.chart)
            .context("Generando gráfico")?;

        let written = report::write_report(&paths.report, metadata, &paths.chart, samples)
            .context("Generando PDF")?;

        tracing::info!("Export finished: {:?}, {:?}", paths.csv, paths.report);
        Ok(ExportSummary {
            csv: paths.csv,
            report: paths.report,
            rows: samples.len(),
            table_rows: written.table_rows,
            pages: written.pages,
        })
    }
}
