//! Static chart image
//!
//! Renders the same two curves as the live plot into a PNG with the
//! `plotters` bitmap backend. The image is embedded into the PDF report.

use crate::error::{LoggerError, Result};
use crate::types::{PlotSeries, PLOT_TITLE, RATE_LABEL, TIME_LABEL, VALUE_LABEL, WEIGHT_LABEL};
use plotters::prelude::*;
use std::path::Path;

/// Chart image size in pixels
pub const CHART_SIZE: (u32, u32) = (800, 450);

/// Color of the weight curve
pub const WEIGHT_COLOR: RGBColor = RGBColor(0, 0, 255);

/// Color of the rate-of-change curve
pub const RATE_COLOR: RGBColor = RGBColor(0, 128, 0);

/// Renders a plot series to an image file
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send {
    /// Write the chart for `series` to `path`
    fn render(&self, series: &PlotSeries, path: &Path) -> Result<()>;
}

/// PNG renderer backed by `plotters`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersChart;

fn chart_err<E: std::fmt::Display>(e: E) -> LoggerError {
    LoggerError::Chart(e.to_string())
}

impl ChartRenderer for PlottersChart {
    fn render(&self, series: &PlotSeries, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (x_min, x_max, y_min, y_max) = series.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));

        let mut chart = ChartBuilder::on(&root)
            .caption(PLOT_TITLE, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc(TIME_LABEL)
            .y_desc(VALUE_LABEL)
            .axis_desc_style(("sans-serif", 15))
            .draw()
            .map_err(chart_err)?;

        if !series.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    series.weight.iter().map(|p| (p[0], p[1])),
                    WEIGHT_COLOR.stroke_width(2),
                ))
                .map_err(chart_err)?
                .label(WEIGHT_LABEL)
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], WEIGHT_COLOR));

            chart
                .draw_series(LineSeries::new(
                    series.rate.iter().map(|p| (p[0], p[1])),
                    RATE_COLOR.stroke_width(2),
                ))
                .map_err(chart_err)?
                .label(RATE_LABEL)
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RATE_COLOR));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_err)?;
        }

        root.present().map_err(chart_err)?;
        tracing::debug!("Rendered chart with {} points to {:?}", series.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    #[test]
    #[ignore = "requires system fonts"]
    fn test_renders_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let series = PlotSeries::from_samples(&[
            Sample::new(0.0, 1.0, 0.0),
            Sample::new(0.5, 1.2, 0.4),
            Sample::new(1.5, 1.5, 0.2),
        ]);

        PlottersChart.render(&series, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
