//! Blocking message boxes shown to the operator

use crate::error::LoggerError;
use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Message shown after a successful export
pub const EXPORT_OK: &str = "Datos exportados a CSV y PDF correctamente.";

/// A message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The serial port could not be opened
    DeviceUnavailable { port: String },
    /// Export requested with an empty dataset
    NothingToExport,
    /// Export finished
    Exported,
    /// Any other failure
    Failed { message: String },
}

impl Notification {
    /// Notification for an export error
    pub fn from_export_error(err: &LoggerError) -> Self {
        if err.is_nothing_to_export() {
            Notification::NothingToExport
        } else {
            Notification::Failed {
                message: err.to_string(),
            }
        }
    }

    pub fn level(&self) -> MessageLevel {
        match self {
            Notification::DeviceUnavailable { .. } | Notification::Failed { .. } => {
                MessageLevel::Error
            }
            Notification::NothingToExport => MessageLevel::Warning,
            Notification::Exported => MessageLevel::Info,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notification::DeviceUnavailable { .. } | Notification::Failed { .. } => "Error",
            Notification::NothingToExport => "Advertencia",
            Notification::Exported => "Éxito",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notification::DeviceUnavailable { port } => {
                format!("No se pudo abrir el puerto {}", port)
            }
            Notification::NothingToExport => LoggerError::NothingToExport.to_string(),
            Notification::Exported => EXPORT_OK.to_string(),
            Notification::Failed { message } => message.clone(),
        }
    }

    /// Show the message box and block until it is dismissed
    pub fn show(&self) {
        tracing::debug!("Notification: {}", self.message());
        MessageDialog::new()
            .set_level(self.level())
            .set_title(self.title())
            .set_description(self.message())
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_unavailable_names_port() {
        let n = Notification::DeviceUnavailable {
            port: "COM4".to_string(),
        };
        assert_eq!(n.message(), "No se pudo abrir el puerto COM4");
        assert!(matches!(n.level(), MessageLevel::Error));
    }

    #[test]
    fn test_export_error_mapping() {
        let nothing = LoggerError::NothingToExport.with_context("Exportando");
        assert_eq!(
            Notification::from_export_error(&nothing),
            Notification::NothingToExport
        );
        assert_eq!(
            Notification::NothingToExport.message(),
            "No hay datos para exportar."
        );

        let failed = LoggerError::Report("disk full".to_string());
        assert!(matches!(
            Notification::from_export_error(&failed),
            Notification::Failed { message } if message.contains("disk full")
        ));
    }
}
