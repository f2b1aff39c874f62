//! Integration tests for the export workflow
//!
//! These tests validate the files an export leaves behind:
//! - Nothing at all for an empty dataset
//! - CSV, PDF and no chart image after success
//! - No chart image after a failed report

mod common;

use common::builders::{ramp, MetadataBuilder};
use common::mock_helpers::{script_opener, BlankChart};
use common::test_timeout;
use loadcell_logger::backend::Acquisition;
use loadcell_logger::error::LoggerError;
use loadcell_logger::export::chart::ChartRenderer;
use loadcell_logger::export::{report, ExportPaths, Exporter};
use loadcell_logger::session::Session;
use loadcell_logger::types::PlotSeries;
use std::sync::Arc;

fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_empty_dataset_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::with_renderer(Box::new(BlankChart));

    let err = exporter
        .export(&[], &MetadataBuilder::new().build(), &dir.path().join("vacio.csv"))
        .unwrap_err();

    assert!(matches!(err, LoggerError::NothingToExport));
    assert!(files_in(dir.path()).is_empty());
}

#[test]
fn test_capture_then_export() {
    let mut acquisition = Acquisition::new(
        Arc::new(Session::new()),
        script_opener("0.0,1.00,0.00\n0.5,1.20,0.40\n1.0,garbage,0.10\n1.5,1.50,0.20\n"),
        "script",
    );
    acquisition.start().unwrap();
    assert!(acquisition.wait_idle(test_timeout()));
    let snapshot = acquisition.session().snapshot();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ensayo.csv");
    let exporter = Exporter::with_renderer(Box::new(BlankChart));
    let summary = exporter
        .export(&snapshot, &MetadataBuilder::new().test_number("7").build(), &csv_path)
        .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.table_rows, 3);
    assert_eq!(summary.pages, 1);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Tiempo (s),Peso (kg),Cambio (kg/s)",
            "0.0,1.0,0.0",
            "0.5,1.2,0.4",
            "1.5,1.5,0.2",
        ]
    );

    let pdf = std::fs::read(dir.path().join("ensayo.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    // The chart image is transient
    assert_eq!(files_in(dir.path()), vec!["ensayo.csv", "ensayo.pdf"]);
}

#[test]
fn test_long_capture_spans_pages() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("largo.csv");
    let samples = ramp(200);

    let summary = Exporter::with_renderer(Box::new(BlankChart))
        .export(&samples, &MetadataBuilder::new().build(), &csv_path)
        .unwrap();

    assert_eq!(summary.rows, 200);
    assert!(summary.pages > 1);
    // Each continuation page repeats the header, not data rows
    assert_eq!(summary.table_rows, 200);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 201);
}

#[test]
fn test_report_draws_every_sample_once() {
    let dir = tempfile::tempdir().unwrap();
    let chart = dir.path().join("grafico.png");
    BlankChart
        .render(&PlotSeries::from_samples(&ramp(1)), &chart)
        .unwrap();

    for n in [1, 12, 13, 45] {
        let pdf = dir.path().join(format!("tabla_{}.pdf", n));
        let written =
            report::write_report(&pdf, &MetadataBuilder::new().build(), &chart, &ramp(n)).unwrap();
        assert_eq!(written.table_rows, n);
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    }
}

#[test]
fn test_report_failure_removes_chart_image() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("fallo.csv");
    let paths = ExportPaths::from_csv(&csv_path);

    // A directory where the PDF should go makes the report step fail
    std::fs::create_dir(&paths.report).unwrap();

    let err = Exporter::with_renderer(Box::new(BlankChart))
        .export(&ramp(3), &MetadataBuilder::new().build(), &csv_path)
        .unwrap_err();

    assert!(!err.is_nothing_to_export());
    assert!(!paths.chart.exists());
    assert!(csv_path.exists());
    assert!(paths.report.is_dir());
}

#[test]
fn test_export_overwrites_previous_files() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("repetido.csv");
    let exporter = Exporter::with_renderer(Box::new(BlankChart));
    let metadata = MetadataBuilder::new().responsible("Ana").build();

    exporter.export(&ramp(10), &metadata, &csv_path).unwrap();
    exporter.export(&ramp(2), &metadata, &csv_path).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
}
