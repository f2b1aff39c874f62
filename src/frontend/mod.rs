//! Frontend module - egui control surface
//!
//! A single window: report metadata form and controls on top, the live
//! plot in the middle and a status bar at the bottom.
//!
//! # Architecture
//!
//! - [`LoggerApp`] - `eframe::App` owning the [`Acquisition`] controller
//! - [`plot::PlotUpdater`] - incremental live plot
//! - [`toolbar`] / [`status_bar`] - panels returning [`AppAction`]s
//! - [`notifications`] - blocking message boxes
//!
//! The acquisition thread never touches UI state. It appends to the shared
//! session and asks for a repaint; the next frame drains its events and
//! pulls the new samples into the plot.

pub mod notifications;
pub mod plot;
pub mod state;
pub mod status_bar;
pub mod toolbar;

pub use notifications::Notification;
pub use plot::PlotUpdater;
pub use state::{AppAction, MetadataForm};

use crate::backend::{Acquisition, AcquisitionEvent, FinishReason};
use crate::config::{AppConfig, AppState};
use crate::export::Exporter;
use crate::types::AcquisitionStats;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Repaint interval while a capture is running
const RUNNING_REPAINT: Duration = Duration::from_millis(100);

/// Time allowed for the acquisition thread to exit on close
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Main application state
pub struct LoggerApp {
    acquisition: Acquisition,
    exporter: Exporter,
    app_state: AppState,
    form: MetadataForm,
    plot: PlotUpdater,
    stats: AcquisitionStats,
    last_error: Option<String>,
    notifications: Vec<Notification>,
}

impl LoggerApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut acquisition: Acquisition,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.iter_mut().for_each(|(_, font_id)| {
            font_id.size *= app_state.ui_preferences.font_scale;
        });
        cc.egui_ctx.set_style(style);

        if app_state.ui_preferences.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let repaint_ctx = cc.egui_ctx.clone();
        acquisition.set_redraw_signal(Arc::new(move || repaint_ctx.request_repaint()));

        let form = MetadataForm::with_responsible(app_state.last_responsible.as_deref());
        let plot = PlotUpdater::new(&config.plot);

        Self {
            acquisition,
            exporter: Exporter::new(),
            app_state,
            form,
            plot,
            stats: AcquisitionStats::default(),
            last_error: None,
            notifications: Vec::new(),
        }
    }

    fn process_acquisition_events(&mut self) {
        for event in self.acquisition.drain() {
            match event {
                AcquisitionEvent::SampleAppended { .. } => {}
                AcquisitionEvent::DeviceUnavailable { port, message } => {
                    self.last_error = Some(message);
                    self.notifications
                        .push(Notification::DeviceUnavailable { port });
                }
                AcquisitionEvent::Finished { reason, stats } => {
                    self.stats = stats;
                    if let FinishReason::ReadError(e) = reason {
                        self.last_error = Some(format!("Error de lectura: {}", e));
                    }
                }
            }
        }
    }

    fn handle_action(&mut self, action: AppAction) {
        tracing::debug!("Action: {:?}", action);
        match action {
            AppAction::Start => {
                if let Some(run) = self.acquisition.start() {
                    self.form.stamp_pc_time(run.pc_time());
                    self.stats = AcquisitionStats::default();
                    self.last_error = None;
                }
            }
            AppAction::Stop => self.acquisition.stop(),
            AppAction::Reset => {
                self.acquisition.reset();
                self.plot.clear();
                self.stats = AcquisitionStats::default();
                self.last_error = None;
            }
            AppAction::Export => self.export(),
        }
    }

    fn export(&mut self) {
        // Freeze the dataset before the dialog opens
        let samples = self.acquisition.session().snapshot();
        if samples.is_empty() {
            self.notifications.push(Notification::NothingToExport);
            return;
        }

        let mut dialog = rfd::FileDialog::new()
            .set_title("Guardar datos")
            .add_filter("CSV", &["csv"])
            .set_file_name(default_file_name(&self.form.metadata.test_number));
        if let Some(dir) = self.app_state.export_dir() {
            dialog = dialog.set_directory(dir);
        }

        let Some(mut path) = dialog.save_file() else {
            tracing::debug!("Export cancelled");
            return;
        };
        if path.extension().is_none() {
            path.set_extension("csv");
        }

        match self.exporter.export(&samples, &self.form.metadata, &path) {
            Ok(summary) => {
                tracing::info!(
                    "Exported {} samples ({} report pages)",
                    summary.rows,
                    summary.pages
                );
                self.app_state.record_export(&path);
                self.notifications.push(Notification::Exported);
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.notifications.push(Notification::from_export_error(&e));
            }
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::Key;

        // Text fields own the keyboard while focused
        if ctx.wants_keyboard_input() {
            return;
        }

        let mut actions = Vec::new();
        let running = self.acquisition.session().is_running();

        ctx.input(|i| {
            if i.key_pressed(Key::Space) && !i.modifiers.any() {
                actions.push(if running { AppAction::Stop } else { AppAction::Start });
            }
            if i.key_pressed(Key::S) && i.modifiers.command_only() {
                actions.push(AppAction::Export);
            }
            if i.key_pressed(Key::L) && i.modifiers.command_only() {
                actions.push(AppAction::Reset);
            }
        });

        for action in actions {
            self.handle_action(action);
        }
    }

    fn show_notifications(&mut self) {
        for notification in self.notifications.drain(..) {
            notification.show();
        }
    }
}

/// Suggested CSV file name for the save dialog
fn default_file_name(test_number: &str) -> String {
    let cleaned: String = test_number
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if cleaned.is_empty() {
        "prueba.csv".to_string()
    } else {
        format!("prueba_{}.csv", cleaned)
    }
}

impl eframe::App for LoggerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_acquisition_events();
        self.handle_keyboard_shortcuts(ctx);
        self.plot.refresh(self.acquisition.session());

        let session = self.acquisition.session().clone();
        let status = session.status();
        if status.is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            let mut toolbar_ctx = toolbar::ToolbarContext {
                status,
                has_data: !session.is_empty(),
                form: &mut self.form,
            };
            actions = toolbar::render_toolbar(ui, &mut toolbar_ctx);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let start_label = session.start_label();
            let status_ctx = status_bar::StatusBarContext {
                status,
                port: self.acquisition.port(),
                samples: self.plot.series().len(),
                stats: &self.stats,
                start_label: start_label.as_deref(),
                last_error: self.last_error.as_deref(),
            };
            status_bar::render_status_bar(ui, &status_ctx);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot.render(ui);
        });

        for action in actions {
            self.handle_action(action);
        }

        self.show_notifications();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.acquisition.shutdown(SHUTDOWN_TIMEOUT);

        let responsible = self.form.metadata.responsible.trim();
        self.app_state.last_responsible =
            (!responsible.is_empty()).then(|| responsible.to_string());

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}

/// Window title including the configured port
pub fn window_title(config: &AppConfig) -> String {
    format!("Celda de Carga - {}", config.serial.port)
}

/// Path shown in logs for the config file in use
pub fn describe_config_source() -> String {
    crate::config::config_path()
        .map(|p: PathBuf| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name(""), "prueba.csv");
        assert_eq!(default_file_name(" 12 "), "prueba_12.csv");
        assert_eq!(default_file_name("A/7"), "prueba_A7.csv");
    }

    #[test]
    fn test_window_title_names_port() {
        let config = AppConfig::default();
        assert_eq!(window_title(&config), "Celda de Carga - COM4");
    }
}
