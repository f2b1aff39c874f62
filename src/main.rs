//! Load Cell Logger - Main Entry Point
//!
//! Captures weight data from a serial load cell, plots it live and exports
//! CSV and PDF test reports.

use loadcell_logger::{
    backend::Acquisition,
    config::{AppConfig, AppState},
    frontend::{describe_config_source, window_title, LoggerApp},
    logging,
    session::Session,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let _log_guard = logging::init();

    tracing::info!("Starting Load Cell Logger");
    tracing::info!("Config: {}", describe_config_source());

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();

    tracing::info!(
        "Serial port {} at {} baud",
        config.serial.port,
        config.serial.baud_rate
    );

    let session = Arc::new(Session::new());
    let acquisition = Acquisition::from_config(session, &config.serial);

    let title = window_title(&config);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(|cc| Ok(Box::new(LoggerApp::new(cc, acquisition, config, app_state)))),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))?;

    tracing::info!("Shutting down...");
    Ok(())
}
