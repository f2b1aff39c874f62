//! Toolbar panel: metadata form and the Start/Stop/Reset/Export buttons.
//!
//! Sits at the top of the window, above the live plot.

use egui::{Color32, RichText, Ui};

use crate::frontend::state::{AppAction, MetadataForm};
use crate::types::SessionStatus;

/// Context needed to render the toolbar.
pub struct ToolbarContext<'a> {
    pub status: SessionStatus,
    pub has_data: bool,
    pub form: &'a mut MetadataForm,
}

/// Render the metadata form and the control buttons.
///
/// Returns the actions to be applied by the app.
pub fn render_toolbar(ui: &mut Ui, ctx: &mut ToolbarContext<'_>) -> Vec<AppAction> {
    let mut actions = Vec::new();

    render_metadata_form(ui, ctx.form);

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;
        render_control_group(ui, ctx.status, ctx.has_data, &mut actions);
    });

    actions
}

fn render_metadata_form(ui: &mut Ui, form: &mut MetadataForm) {
    let meta = &mut form.metadata;

    egui::Grid::new("report_metadata")
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Día:");
            ui.add(egui::TextEdit::singleline(&mut meta.day).desired_width(140.0));
            ui.label("Hora de inicio:");
            ui.add(egui::TextEdit::singleline(&mut meta.scheduled_start).desired_width(140.0));
            ui.end_row();

            ui.label("Hora PC:");
            // Stamped at Start
            ui.add(
                egui::TextEdit::singleline(&mut meta.pc_time)
                    .interactive(false)
                    .desired_width(140.0),
            );
            ui.label("N° Prueba:");
            ui.add(egui::TextEdit::singleline(&mut meta.test_number).desired_width(140.0));
            ui.end_row();

            ui.label("Responsable:");
            ui.add(egui::TextEdit::singleline(&mut meta.responsible).desired_width(140.0));
            ui.end_row();
        });
}

fn render_control_group(
    ui: &mut Ui,
    status: SessionStatus,
    has_data: bool,
    actions: &mut Vec<AppAction>,
) {
    let running = status.is_running();

    let start = egui::Button::new(RichText::new("▶ Iniciar Prueba").color(Color32::WHITE))
        .fill(Color32::from_rgb(50, 120, 50));
    if ui
        .add_enabled(!running, start)
        .on_hover_text("Abrir el puerto y comenzar la captura (Espacio)")
        .clicked()
    {
        actions.push(AppAction::Start);
    }

    let stop = egui::Button::new(RichText::new("■ Detener").color(Color32::WHITE))
        .fill(Color32::from_rgb(180, 50, 50));
    if ui
        .add_enabled(running, stop)
        .on_hover_text("Detener la captura (Espacio)")
        .clicked()
    {
        actions.push(AppAction::Stop);
    }

    if ui
        .button("🔄 Reset")
        .on_hover_text("Detener y borrar los datos (Ctrl+L)")
        .clicked()
    {
        actions.push(AppAction::Reset);
    }

    ui.separator();

    if ui
        .button("💾 Exportar")
        .on_hover_text(if has_data {
            "Guardar CSV y reporte PDF (Ctrl+S)"
        } else {
            "No hay datos para exportar"
        })
        .clicked()
    {
        actions.push(AppAction::Export);
    }
}
