//! Action and form types for the frontend
//!
//! Widgets return [`AppAction`]s instead of touching the session or the
//! backend directly; `LoggerApp` handles them in one place.

use crate::types::ReportMetadata;

/// Actions the control surface can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Start a capture (no-op while running)
    Start,
    /// Stop the running capture, keeping its data
    Stop,
    /// Stop and clear the data and the plot
    Reset,
    /// Export CSV, chart and PDF report
    Export,
}

/// Editable copy of the report metadata shown in the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataForm {
    pub metadata: ReportMetadata,
}

impl MetadataForm {
    /// Form prefilled with the last responsible person
    pub fn with_responsible(responsible: Option<&str>) -> Self {
        let mut form = Self::default();
        if let Some(name) = responsible {
            form.metadata.responsible = name.to_string();
        }
        form
    }

    /// Stamp the PC time captured at Start
    pub fn stamp_pc_time(&mut self, pc_time: String) {
        self.metadata.pc_time = pc_time;
    }
}
