//! Persistent UI state
//!
//! Unlike `config.toml`, this file is written by the application itself:
//! it remembers where the last export went and the operator's display
//! preferences. Captured data is never persisted here.

use crate::config::{ensure_app_data_dir, app_data_dir};
use crate::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

/// State remembered between runs of the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Directory of the last successful export
    #[serde(default)]
    pub last_export_dir: Option<PathBuf>,

    /// Name typed in the "Responsable" field last time
    #[serde(default)]
    pub last_responsible: Option<String>,

    /// Display preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_export_dir: None,
            last_responsible: None,
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from a file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| LoggerError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| LoggerError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = app_state_path() else {
            return Self::default();
        };
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to a file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LoggerError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| LoggerError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Remember the directory of an exported CSV file
    pub fn record_export(&mut self, csv_path: &Path) {
        self.last_export_dir = csv_path.parent().map(Path::to_path_buf);
    }

    /// Last export directory, if it still exists
    pub fn export_dir(&self) -> Option<&Path> {
        self.last_export_dir
            .as_deref()
            .filter(|p| p.is_dir())
    }
}

/// Display preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default)]
    pub dark_mode: bool,

    /// Font scale factor
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            font_scale: 1.0,
        }
    }
}
