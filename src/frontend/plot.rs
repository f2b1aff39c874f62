//! Live plot of the capture session
//!
//! [`PlotUpdater`] keeps a plot-ready copy of the dataset. On every frame it
//! pulls only the samples added since its last refresh; when the session
//! generation changes (Start or Reset) it reloads everything and resets the
//! plot view to its initial appearance.

use crate::config::PlotConfig;
use crate::session::Session;
use crate::types::{PlotSeries, PLOT_TITLE, RATE_LABEL, TIME_LABEL, VALUE_LABEL, WEIGHT_LABEL};
use egui::{Color32, RichText, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};

/// Color of the weight curve
pub const WEIGHT_COLOR: Color32 = Color32::from_rgb(0, 0, 255);

/// Color of the rate-of-change curve
pub const RATE_COLOR: Color32 = Color32::from_rgb(0, 128, 0);

/// Incrementally updated plot view
#[derive(Debug, Clone)]
pub struct PlotUpdater {
    generation: u64,
    series: PlotSeries,
    line_width: f32,
    show_grid: bool,
    reset_view: bool,
}

impl Default for PlotUpdater {
    fn default() -> Self {
        Self::new(&PlotConfig::default())
    }
}

impl PlotUpdater {
    pub fn new(config: &PlotConfig) -> Self {
        Self {
            generation: 0,
            series: PlotSeries::default(),
            line_width: config.line_width,
            show_grid: config.show_grid,
            reset_view: false,
        }
    }

    /// Pull new samples from the session.
    ///
    /// Returns `true` if the cached series changed.
    pub fn refresh(&mut self, session: &Session) -> bool {
        let delta = session.delta_since(self.generation, self.series.len());

        if delta.replaced {
            tracing::trace!(
                "Plot reloaded: generation {} -> {}",
                self.generation,
                delta.generation
            );
            self.generation = delta.generation;
            self.series = PlotSeries::from_samples(&delta.samples);
            self.reset_view = true;
            return true;
        }

        if delta.samples.is_empty() {
            return false;
        }
        self.series.extend(&delta.samples);
        true
    }

    /// Drop the cached curves
    pub fn clear(&mut self) {
        self.series.clear();
        self.reset_view = true;
    }

    /// Cached series
    pub fn series(&self) -> &PlotSeries {
        &self.series
    }

    /// Draw title, legend and both curves
    pub fn render(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(PLOT_TITLE).heading());
        });

        let mut plot = Plot::new("live_plot")
            .show_axes(true)
            .show_grid(self.show_grid)
            .x_axis_label(TIME_LABEL)
            .y_axis_label(VALUE_LABEL)
            .auto_bounds([true, true])
            .legend(Legend::default().position(Corner::LeftTop));

        if std::mem::take(&mut self.reset_view) {
            plot = plot.reset();
        }

        let line_width = self.line_width;
        let series = &self.series;

        plot.show(ui, |plot_ui| {
            if series.is_empty() {
                return;
            }

            plot_ui.line(
                Line::new(WEIGHT_LABEL, PlotPoints::from(series.weight.clone()))
                    .color(WEIGHT_COLOR)
                    .width(line_width),
            );
            plot_ui.line(
                Line::new(RATE_LABEL, PlotPoints::from(series.rate.clone()))
                    .color(RATE_COLOR)
                    .width(line_width),
            );
        });
    }
}
