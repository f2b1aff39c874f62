//! Acquisition backend
//!
//! This module bridges the load cell's serial stream into the shared
//! [`Session`]. Reading happens on a dedicated thread so the UI stays
//! responsive; the UI only talks to the backend through [`Acquisition`].
//!
//! # Architecture
//!
//! - [`Acquisition`] - UI-side controller: Start/Stop/Reset and event drain
//! - [`AcquisitionWorker`] - The per-run loop: read, parse, append, signal
//! - [`LineSource`] - Anything that yields text lines with a bounded wait
//! - [`SourceOpener`] - Opens a fresh [`LineSource`] for each run
//! - [`AcquisitionEvent`] - Messages sent from the worker to the UI
//!
//! Each accepted sample is appended to the session first and then
//! announced (event + redraw request), so a redraw always sees the sample
//! that triggered it. `SampleAppended` is coalesced: at most one is queued
//! until the UI receives it. Run-ending events are never dropped.
//!
//! # Example
//!
//! ```ignore
//! use loadcell_logger::backend::Acquisition;
//! use loadcell_logger::config::AppConfig;
//! use loadcell_logger::session::Session;
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let mut acquisition = Acquisition::from_config(Arc::new(Session::new()), &config.serial);
//!
//! acquisition.start();
//! for event in acquisition.drain() {
//!     // Handle events on the UI thread
//! }
//! acquisition.stop();
//! ```

#[cfg(feature = "mock-serial")]
pub mod mock_source;
pub mod parser;
pub mod serial;
pub mod worker;

pub use parser::{parse_sample, MalformedSample};
pub use serial::{ReaderSource, SerialOpener};
pub use worker::AcquisitionWorker;

use crate::config::SerialConfig;
use crate::error::Result;
use crate::session::{RunStart, Session};
use crate::types::AcquisitionStats;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Capacity of the worker → UI event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 10_000;

/// How long the worker waits to deliver a run-ending event
pub const TERMINAL_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Result of one bounded read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete line (terminator included, if any)
    Line(String),
    /// No complete line within the read timeout
    Timeout,
    /// A line exceeded the length limit; its bytes were discarded
    Overlong,
    /// The stream ended
    Closed,
}

/// A source of text lines with bounded blocking.
///
/// `read_line` must return within roughly one read timeout so the loop can
/// observe Stop.
pub trait LineSource: Send {
    /// Read the next line
    fn read_line(&mut self) -> std::io::Result<ReadOutcome>;

    /// Human readable description for logs
    fn describe(&self) -> String {
        "line source".to_string()
    }
}

/// Opens a fresh line source for each run
pub trait SourceOpener: Send + Sync {
    /// Open the device. Fails with `DeviceUnavailable` when it cannot be opened.
    fn open(&self) -> Result<Box<dyn LineSource>>;
}

impl<F> SourceOpener for F
where
    F: Fn() -> Result<Box<dyn LineSource>> + Send + Sync,
{
    fn open(&self) -> Result<Box<dyn LineSource>> {
        self()
    }
}

/// Callback asking the UI to repaint
pub type RedrawSignal = Arc<dyn Fn() + Send + Sync>;

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Stop or Reset was requested
    Stopped,
    /// The device closed the stream
    EndOfStream,
    /// A read failed with something other than a timeout
    ReadError(String),
}

/// Message sent from the acquisition thread to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    /// A sample was appended; `len` is the new dataset length
    SampleAppended { len: usize },
    /// The port could not be opened; the run ended without reading
    DeviceUnavailable { port: String, message: String },
    /// The run ended
    Finished {
        reason: FinishReason,
        stats: AcquisitionStats,
    },
}

/// UI-side controller of the acquisition thread
pub struct Acquisition {
    session: Arc<Session>,
    opener: Arc<dyn SourceOpener>,
    port: String,
    event_tx: Sender<AcquisitionEvent>,
    event_rx: Receiver<AcquisitionEvent>,
    sample_pending: Arc<AtomicBool>,
    redraw: RedrawSignal,
    worker: Option<JoinHandle<()>>,
}

impl Acquisition {
    /// Create a controller using `opener` for every run
    pub fn new(session: Arc<Session>, opener: Arc<dyn SourceOpener>, port: impl Into<String>) -> Self {
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        Self {
            session,
            opener,
            port: port.into(),
            event_tx,
            event_rx,
            sample_pending: Arc::new(AtomicBool::new(false)),
            redraw: Arc::new(|| {}),
            worker: None,
        }
    }

    /// Create a controller reading the configured serial port
    pub fn from_config(session: Arc<Session>, config: &SerialConfig) -> Self {
        let port = config.port.clone();
        Self::new(session, Arc::new(SerialOpener::new(config.clone())), port)
    }

    /// Install the callback used to request a redraw after each append
    pub fn set_redraw_signal(&mut self, redraw: RedrawSignal) {
        self.redraw = redraw;
    }

    /// The shared session
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Configured port name
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Start a run. No-op (returns `None`) while a run is active.
    ///
    /// The port is opened on the acquisition thread; failure arrives as
    /// [`AcquisitionEvent::DeviceUnavailable`].
    pub fn start(&mut self) -> Option<RunStart> {
        let run = self.session.begin_run()?;

        let worker = AcquisitionWorker::new(
            self.session.clone(),
            run.token.clone(),
            self.port.clone(),
            self.event_tx.clone(),
            self.redraw.clone(),
        )
        .with_sample_pending(self.sample_pending.clone());
        let opener = self.opener.clone();
        let previous = self.worker.take();

        let spawned = std::thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || worker.run(opener.as_ref(), previous));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Some(run)
            }
            Err(e) => {
                tracing::error!("Failed to spawn acquisition thread: {}", e);
                run.token.deactivate();
                None
            }
        }
    }

    /// Stop the active run. Idempotent; the dataset is kept.
    pub fn stop(&self) {
        self.session.stop();
    }

    /// Stop any run and clear the dataset
    pub fn reset(&self) {
        self.session.reset();
    }

    /// Receive all pending events
    pub fn drain(&self) -> Vec<AcquisitionEvent> {
        self.event_rx
            .try_iter()
            .inspect(|event| self.mark_received(event))
            .collect()
    }

    /// Block for the next event, up to `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AcquisitionEvent> {
        let event = self.event_rx.recv_timeout(timeout).ok()?;
        self.mark_received(&event);
        Some(event)
    }

    fn mark_received(&self, event: &AcquisitionEvent) {
        if matches!(event, AcquisitionEvent::SampleAppended { .. }) {
            self.sample_pending.store(false, Ordering::SeqCst);
        }
    }

    /// Wait for the acquisition thread to exit.
    ///
    /// Returns `false` if it is still running after `timeout`.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.worker.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.worker = Some(handle);
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        if handle.join().is_err() {
            tracing::error!("Acquisition thread panicked");
        }
        true
    }

    /// Stop and wait for the thread, bounded by `timeout`
    pub fn shutdown(&mut self, timeout: Duration) {
        self.stop();
        if !self.wait_idle(timeout) {
            tracing::warn!("Acquisition thread did not exit within {:?}", timeout);
        }
    }
}
