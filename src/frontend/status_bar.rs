//! Status bar panel: bottom bar showing session state, counters and errors.

use egui::{Color32, RichText, Ui};

use crate::types::{AcquisitionStats, SessionStatus};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: SessionStatus,
    pub port: &'a str,
    pub samples: usize,
    pub stats: &'a AcquisitionStats,
    pub start_label: Option<&'a str>,
    pub last_error: Option<&'a str>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let status_color = match ctx.status {
            SessionStatus::Running => Color32::GREEN,
            SessionStatus::Idle => Color32::GRAY,
        };
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(format!("{}: {}", ctx.status, ctx.port)).small());

        ui.separator();

        if let Some(label) = ctx.start_label {
            ui.label(RichText::new(format!("Inicio: {}", label)).small());
            ui.separator();
        }

        ui.label(RichText::new(format!("Muestras: {}", ctx.samples)).small());

        ui.separator();

        let rejected_color = if ctx.stats.lines_rejected > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            rejected_color,
            RichText::new(format!("Descartadas: {}", ctx.stats.lines_rejected)).small(),
        );

        if let Some(error) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
