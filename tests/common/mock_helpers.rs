//! Line sources, openers and renderers for tests

use crossbeam_channel::{unbounded, Receiver, Sender};
use loadcell_logger::backend::{LineSource, ReadOutcome, ReaderSource, SourceOpener};
use loadcell_logger::error::{LoggerError, Result};
use loadcell_logger::export::ChartRenderer;
use loadcell_logger::types::PlotSeries;
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Opener whose every run reads `text` and then hits end of stream
pub fn script_opener(text: &str) -> Arc<dyn SourceOpener> {
    let text = text.to_string();
    Arc::new(move || -> Result<Box<dyn LineSource>> {
        Ok(Box::new(ReaderSource::new(
            Cursor::new(text.clone().into_bytes()),
            "script",
        )))
    })
}

/// Line source fed by the test through a channel.
///
/// Reports `Timeout` when nothing is queued, like a quiet serial port.
pub struct ChannelSource {
    lines: Receiver<String>,
}

impl LineSource for ChannelSource {
    fn read_line(&mut self) -> std::io::Result<ReadOutcome> {
        match self.lines.recv_timeout(Duration::from_millis(10)) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(ReadOutcome::Timeout),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Ok(ReadOutcome::Closed),
        }
    }

    fn describe(&self) -> String {
        "channel".to_string()
    }
}

/// A simulated device: lines sent on the returned sender are read by
/// whichever run currently has the port open.
pub fn channel_device() -> (Sender<String>, Arc<dyn SourceOpener>) {
    let (tx, rx) = unbounded();
    let opener: Arc<dyn SourceOpener> = Arc::new(move || -> Result<Box<dyn LineSource>> {
        Ok(Box::new(ChannelSource { lines: rx.clone() }))
    });
    (tx, opener)
}

/// Chart renderer drawing a plain white PNG (no text, so no fonts needed)
pub struct BlankChart;

impl ChartRenderer for BlankChart {
    fn render(&self, _series: &PlotSeries, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (80, 45)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| LoggerError::Chart(e.to_string()))?;
        root.present()
            .map_err(|e| LoggerError::Chart(e.to_string()))?;
        Ok(())
    }
}
