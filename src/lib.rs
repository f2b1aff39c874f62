//! # Load Cell Logger
//!
//! A desktop tool that captures weight measurements from a load cell over a
//! serial link, plots them live and exports each test as CSV plus a PDF
//! report.
//!
//! ## Architecture
//!
//! - **Backend**: reads and parses the serial stream on its own thread
//! - **Session**: the dataset and run flag shared with the UI through `Arc`
//! - **Frontend**: eframe/egui window with an egui_plot live chart
//! - **Export**: CSV writer, plotters chart image, printpdf report
//! - **Communication**: a crossbeam channel carries acquisition events to the UI
//!
//! ## Configuration
//!
//! `config.toml` (serial port, baud rate, read timeout, plot style) lives in
//! the platform config directory under `dev.loadcell.logger`. Application
//! state and logs live in the platform data directory:
//!
//! - **Linux**: `~/.local/share/dev.loadcell.logger/`
//! - **macOS**: `~/Library/Application Support/dev.loadcell.logger/`
//! - **Windows**: `%APPDATA%\dev.loadcell.logger\`
//!
//! ## Example
//!
//! ```ignore
//! use loadcell_logger::{
//!     backend::Acquisition,
//!     config::{AppConfig, AppState},
//!     frontend::LoggerApp,
//!     session::Session,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let app_state = AppState::load_or_default();
//!     let acquisition = Acquisition::from_config(Arc::new(Session::new()), &config.serial);
//!
//!     eframe::run_native(
//!         "Load Cell Logger",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(LoggerApp::new(cc, acquisition, config, app_state)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod frontend;
pub mod logging;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use backend::{Acquisition, AcquisitionEvent, FinishReason};
pub use config::{AppConfig, AppState};
pub use error::{LoggerError, Result};
pub use export::{ExportSummary, Exporter};
pub use frontend::LoggerApp;
pub use session::Session;
pub use types::{ReportMetadata, Sample};
