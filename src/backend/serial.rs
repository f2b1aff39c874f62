//! Line sources backed by byte streams
//!
//! [`ReaderSource`] turns any buffered byte stream into newline-terminated
//! text lines. The serial port is one such stream; tests feed in-memory
//! cursors through the same code path.
//!
//! A device at the wrong baud rate produces noise with no line breaks, so
//! lines are capped at [`MAX_LINE_BYTES`].

use crate::backend::{LineSource, ReadOutcome, SourceOpener};
use crate::config::SerialConfig;
use crate::error::{LoggerError, Result};
use std::io::{BufRead, BufReader, ErrorKind, Read};

/// Longest line kept; longer ones are reported as [`ReadOutcome::Overlong`]
pub const MAX_LINE_BYTES: usize = 256;

/// Line reader over a buffered byte stream.
///
/// Bytes read before a timeout are kept, so a line split across two reads
/// is still delivered whole.
pub struct ReaderSource<R> {
    reader: R,
    pending: Vec<u8>,
    /// Skipping the rest of an overlong line
    discarding: bool,
    description: String,
}

impl<R: BufRead + Send> ReaderSource<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R, description: impl Into<String>) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(64),
            discarding: false,
            description: description.into(),
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

impl<R: BufRead + Send> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> std::io::Result<ReadOutcome> {
        let limit = (MAX_LINE_BYTES + 1 - self.pending.len()) as u64;
        let read = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.pending);

        match read {
            Ok(0) => {
                if self.pending.is_empty() {
                    Ok(ReadOutcome::Closed)
                } else {
                    Ok(ReadOutcome::Line(self.take_line()))
                }
            }
            Ok(_) if self.discarding => {
                // Tail of an overlong line
                if self.pending.last() == Some(&b'\n') {
                    self.discarding = false;
                }
                self.pending.clear();
                Ok(ReadOutcome::Timeout)
            }
            Ok(_) if self.pending.last() != Some(&b'\n') && self.pending.len() > MAX_LINE_BYTES => {
                tracing::warn!(
                    "{}: line longer than {} bytes discarded, check the baud rate",
                    self.description,
                    MAX_LINE_BYTES
                );
                self.pending.clear();
                self.discarding = true;
                Ok(ReadOutcome::Overlong)
            }
            // Without a trailing '\n' the stream ended; the next call reports Closed
            Ok(_) => Ok(ReadOutcome::Line(self.take_line())),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(ReadOutcome::Timeout)
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(ReadOutcome::Timeout),
            Err(e) => Err(e),
        }
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Opens the configured serial port
#[derive(Debug, Clone)]
pub struct SerialOpener {
    config: SerialConfig,
}

impl SerialOpener {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl SourceOpener for SerialOpener {
    fn open(&self) -> Result<Box<dyn LineSource>> {
        #[cfg(feature = "mock-serial")]
        if self.config.is_mock() {
            tracing::info!("Using simulated load cell");
            return Ok(Box::new(crate::backend::mock_source::SimulatedLoadCell::new()));
        }

        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .timeout(self.config.read_timeout())
            .open()
            .map_err(|source| {
                log_available_ports();
                LoggerError::DeviceUnavailable {
                    port: self.config.port.clone(),
                    source,
                }
            })?;

        tracing::info!(
            "Opened serial port {} at {} baud",
            self.config.port,
            self.config.baud_rate
        );

        let description = format!("{} @ {}", self.config.port, self.config.baud_rate);
        Ok(Box::new(ReaderSource::new(BufReader::new(port), description)))
    }
}

/// Log the ports the OS reports, to help diagnose a wrong port setting
fn log_available_ports() {
    match serialport::available_ports() {
        Ok(ports) if ports.is_empty() => tracing::warn!("No serial ports detected"),
        Ok(ports) => {
            let names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
            tracing::warn!("Available serial ports: {}", names.join(", "));
        }
        Err(e) => tracing::debug!("Could not enumerate serial ports: {}", e),
    }
}
