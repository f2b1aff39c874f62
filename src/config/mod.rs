//! Configuration module for the load cell logger
//!
//! This module handles application configuration including:
//! - Serial link settings (port, baud rate, read timeout), fixed at startup
//! - Plot appearance
//! - Persistent UI state (see [`settings`])
//!
//! # Locations
//!
//! - `config.toml` lives in the platform config directory under
//!   `dev.loadcell.logger` and is meant to be edited by hand.
//! - `app_state.json` and the log files live in the platform data
//!   directory under the same identifier.
//!
//! A missing `config.toml` means defaults; a malformed one is reported in
//! the log and defaults are used.
//!
//! # Example
//!
//! ```toml
//! [serial]
//! port = "COM4"
//! baud_rate = 115200
//! read_timeout_ms = 1000
//!
//! [plot]
//! line_width = 1.5
//! show_grid = true
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config and data directories
pub const APP_ID: &str = "dev.loadcell.logger";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default serial port of the load cell
pub const DEFAULT_PORT: &str = "COM4";

/// Default baud rate of the load cell
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default serial read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Port name that selects the simulated load cell (`mock-serial` feature)
pub const MOCK_PORT: &str = "MOCK";

// ==================== Directories ====================

/// Directory holding `config.toml`
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Directory holding app state and logs
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        LoggerError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Directory for rolling log files
pub fn log_dir() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join("logs"))
}

/// Path of the user config file
pub fn config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Serial Config ====================

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port identifier (`COM4`, `/dev/ttyUSB0`, ...)
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Read timeout; bounds how long Stop takes to be observed
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl SerialConfig {
    /// Read timeout as a Duration (at least 10 ms)
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(10))
    }

    /// Whether the simulated load cell is selected
    pub fn is_mock(&self) -> bool {
        self.port.eq_ignore_ascii_case(MOCK_PORT)
    }

    fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(LoggerError::Config("serial.port must not be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(LoggerError::Config(
                "serial.baud_rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Plot Config ====================

/// Live plot appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Line width of both curves
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Whether to show grid lines
    #[serde(default = "default_true")]
    pub show_grid: bool,
}

fn default_line_width() -> f32 {
    1.5
}

fn default_true() -> bool {
    true
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            show_grid: true,
        }
    }
}

// ==================== App Config ====================

/// Startup configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl AppConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LoggerError::Config(format!("Failed to parse config: {}", e)))?;
        config.serial.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the user config, returning defaults if it is missing or invalid.
    ///
    /// A missing file is created from the defaults so it can be edited.
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_or_create(&path)
    }

    /// Load `path`, writing the defaults there first if it does not exist
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            match config.save(path) {
                Ok(()) => tracing::info!("No config at {:?}, wrote defaults", path),
                Err(e) => tracing::warn!("No config at {:?}, using defaults: {}", path, e),
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Invalid config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Write the config as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| LoggerError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            LoggerError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }
}
