//! Core data types for the load cell logger
//!
//! This module contains the fundamental data structures shared by the
//! acquisition backend, the live plot and the exporter.
//!
//! # Main Types
//!
//! - [`Sample`] - One (time, weight, rate) measurement from the load cell
//! - [`PlotSeries`] - The two plotted curves derived from a dataset
//! - [`ReportMetadata`] - Free-text fields printed on the PDF report
//! - [`AcquisitionStats`] - Per-run line counters
//! - [`SessionStatus`] - Idle/running state of the capture session

use serde::{Deserialize, Serialize};

/// Title shared by the live plot and the exported chart
pub const PLOT_TITLE: &str = "Peso y Cambio en Tiempo Real";

/// X axis label
pub const TIME_LABEL: &str = "Tiempo (s)";

/// Y axis label (both curves share the axis)
pub const VALUE_LABEL: &str = "Valores";

/// Legend name of the weight curve
pub const WEIGHT_LABEL: &str = "Peso (kg)";

/// Legend name of the rate-of-change curve
pub const RATE_LABEL: &str = "Cambio (kg/s)";

/// Column headers used by the CSV file and the report table
pub const COLUMN_HEADERS: [&str; 3] = [TIME_LABEL, WEIGHT_LABEL, RATE_LABEL];

/// A single measurement received from the load cell.
///
/// Samples are produced only by the parser and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Device time in seconds
    pub time_s: f64,
    /// Measured weight in kilograms
    pub weight_kg: f64,
    /// Rate of change of the weight in kilograms per second
    pub rate_kg_per_s: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(time_s: f64, weight_kg: f64, rate_kg_per_s: f64) -> Self {
        Self {
            time_s,
            weight_kg,
            rate_kg_per_s,
        }
    }

    /// Weight as a plot point `[time, weight]`
    pub fn weight_point(&self) -> [f64; 2] {
        [self.time_s, self.weight_kg]
    }

    /// Rate as a plot point `[time, rate]`
    pub fn rate_point(&self) -> [f64; 2] {
        [self.time_s, self.rate_kg_per_s]
    }
}

/// Plot-ready copy of a dataset: one point list per curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotSeries {
    /// Weight vs time
    pub weight: Vec<[f64; 2]>,
    /// Rate of change vs time
    pub rate: Vec<[f64; 2]>,
}

impl PlotSeries {
    /// Build the series for a full dataset
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut series = Self::default();
        series.extend(samples);
        series
    }

    /// Append samples in arrival order
    pub fn extend(&mut self, samples: &[Sample]) {
        self.weight.reserve(samples.len());
        self.rate.reserve(samples.len());
        for sample in samples {
            self.weight.push(sample.weight_point());
            self.rate.push(sample.rate_point());
        }
    }

    /// Drop all points
    pub fn clear(&mut self) {
        self.weight.clear();
        self.rate.clear();
    }

    /// Number of samples represented
    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Data bounds as `(x_min, x_max, y_min, y_max)` over both curves.
    ///
    /// Degenerate ranges are widened so a single sample still yields a
    /// drawable area. Returns `None` for an empty series.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }

        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for point in self.weight.iter().chain(self.rate.iter()) {
            x_min = x_min.min(point[0]);
            x_max = x_max.max(point[0]);
            y_min = y_min.min(point[1]);
            y_max = y_max.max(point[1]);
        }

        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }

        if x_max - x_min < f64::EPSILON {
            x_min -= 0.5;
            x_max += 0.5;
        }
        if y_max - y_min < f64::EPSILON {
            y_min -= 0.5;
            y_max += 0.5;
        }

        // 5% headroom on the value axis
        let margin = (y_max - y_min) * 0.05;
        Some((x_min, x_max, y_min - margin, y_max + margin))
    }
}

/// Free-text fields printed at the top of the report.
///
/// Everything except `pc_time` is typed by the operator; `pc_time` is
/// stamped by the application when a capture starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Test day
    pub day: String,
    /// Scheduled start time
    pub scheduled_start: String,
    /// PC clock time captured at Start (read-only in the UI)
    pub pc_time: String,
    /// Test number
    pub test_number: String,
    /// Person responsible for the test
    pub responsible: String,
}

impl ReportMetadata {
    /// Labeled fields in report order
    pub fn labeled_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("Día", self.day.as_str()),
            ("Hora de inicio", self.scheduled_start.as_str()),
            ("Hora PC", self.pc_time.as_str()),
            ("N° Prueba", self.test_number.as_str()),
            ("Responsable", self.responsible.as_str()),
        ]
    }
}

/// Counters for one acquisition run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionStats {
    /// Non-empty lines read from the device
    pub lines_read: u64,
    /// Lines accepted and appended to the dataset
    pub samples_accepted: u64,
    /// Lines discarded as malformed
    pub lines_rejected: u64,
}

impl AcquisitionStats {
    /// Percentage of lines that parsed successfully
    pub fn acceptance_rate(&self) -> f64 {
        if self.lines_read == 0 {
            100.0
        } else {
            (self.samples_accepted as f64 / self.lines_read as f64) * 100.0
        }
    }
}

/// State of the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
}

impl SessionStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SessionStatus::Running)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Detenido"),
            SessionStatus::Running => write!(f, "Adquiriendo"),
        }
    }
}
