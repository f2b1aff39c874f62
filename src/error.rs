//! Error handling for the load cell logger
//!
//! This module defines the crate error type and a Result alias. Malformed
//! serial lines have their own error type in [`crate::backend::parser`]
//! because they never leave the acquisition loop.

use thiserror::Error;

/// Main error type for logger operations
#[derive(Error, Debug)]
pub enum LoggerError {
    /// The configured serial port could not be opened
    #[error("No se pudo abrir el puerto {port}: {source}")]
    DeviceUnavailable {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Export was requested while the dataset is empty
    #[error("No hay datos para exportar.")]
    NothingToExport,

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors while rendering the static chart image
    #[error("Chart error: {0}")]
    Chart(String),

    /// Errors while assembling the PDF report
    #[error("Report error: {0}")]
    Report(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LoggerError>,
    },
}

impl LoggerError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LoggerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &LoggerError {
        match self {
            LoggerError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error means there was nothing to export
    pub fn is_nothing_to_export(&self) -> bool {
        matches!(self.root(), LoggerError::NothingToExport)
    }
}

/// Result type alias for logger operations
pub type Result<T> = std::result::Result<T, LoggerError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| LoggerError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LoggerError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoggerError::Config("bad baud rate".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad baud rate");
    }

    #[test]
    fn test_device_unavailable_names_port() {
        let err = LoggerError::DeviceUnavailable {
            port: "COM4".to_string(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "not found"),
        };
        assert!(err.to_string().contains("COM4"));
    }

    #[test]
    fn test_error_with_context() {
        let err = LoggerError::NothingToExport.with_context("Export failed");
        assert!(err.to_string().starts_with("Export failed"));
        assert!(err.is_nothing_to_export());
    }

    #[test]
    fn test_io_result_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.context("Writing CSV").unwrap_err();
        assert!(matches!(err.root(), LoggerError::Io(_)));
        assert!(err.to_string().contains("Writing CSV"));
    }
}
