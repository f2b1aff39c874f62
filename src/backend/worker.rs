//! Acquisition worker loop
//!
//! One [`AcquisitionWorker`] exists per run. It runs on its own thread and
//! owns the line source for the whole run.
//!
//! # Loop
//!
//! 1. Wait for the previous run's thread so two loops never read one port
//! 2. Open the source; on failure report `DeviceUnavailable` and end the run
//! 3. While the run token is active, read a line with a bounded wait:
//!    - blank lines are skipped
//!    - well-formed lines are appended to the session, then announced;
//!      `SampleAppended` is only queued when the UI has taken the last one
//!    - malformed lines are counted and dropped
//! 4. Release the source, mark the run inactive and report `Finished`

use crate::backend::parser::parse_sample;
use crate::backend::{
    AcquisitionEvent, FinishReason, LineSource, ReadOutcome, RedrawSignal, SourceOpener,
    TERMINAL_SEND_TIMEOUT,
};
use crate::session::{RunToken, Session};
use crate::types::AcquisitionStats;
use crossbeam_channel::{SendTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// The loop of a single acquisition run
pub struct AcquisitionWorker {
    session: Arc<Session>,
    token: RunToken,
    port: String,
    events: Sender<AcquisitionEvent>,
    sample_pending: Arc<AtomicBool>,
    redraw: RedrawSignal,
    stats: AcquisitionStats,
}

impl AcquisitionWorker {
    pub fn new(
        session: Arc<Session>,
        token: RunToken,
        port: String,
        events: Sender<AcquisitionEvent>,
        redraw: RedrawSignal,
    ) -> Self {
        Self {
            session,
            token,
            port,
            events,
            sample_pending: Arc::new(AtomicBool::new(false)),
            redraw,
            stats: AcquisitionStats::default(),
        }
    }

    /// Share the flag the receiver clears when it takes a `SampleAppended`
    pub fn with_sample_pending(mut self, sample_pending: Arc<AtomicBool>) -> Self {
        self.sample_pending = sample_pending;
        self
    }

    /// Run to completion on the current thread
    pub fn run(mut self, opener: &dyn SourceOpener, previous: Option<JoinHandle<()>>) {
        if let Some(handle) = previous {
            if handle.join().is_err() {
                tracing::error!("Previous acquisition thread panicked");
            }
        }

        if !self.token.is_active() {
            tracing::debug!("Run cancelled before the port was opened");
            self.finish(FinishReason::Stopped);
            return;
        }

        let mut source = match opener.open() {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("{}", e);
                self.token.deactivate();
                self.send_terminal(AcquisitionEvent::DeviceUnavailable {
                    port: self.port.clone(),
                    message: e.to_string(),
                });
                (self.redraw)();
                return;
            }
        };

        tracing::info!("Acquisition started on {}", source.describe());
        let reason = self.drive(source.as_mut());

        // Close the port before announcing the end of the run
        drop(source);
        self.finish(reason);
    }

    /// Read until the token is deactivated or the source ends
    pub fn drive(&mut self, source: &mut dyn LineSource) -> FinishReason {
        while self.token.is_active() {
            match source.read_line() {
                Ok(ReadOutcome::Line(line)) => self.handle_line(&line),
                Ok(ReadOutcome::Timeout) => continue,
                Ok(ReadOutcome::Overlong) => {
                    self.stats.lines_read += 1;
                    self.stats.lines_rejected += 1;
                    tracing::debug!("Discarding overlong line");
                }
                Ok(ReadOutcome::Closed) => {
                    tracing::info!("Device closed the stream");
                    return FinishReason::EndOfStream;
                }
                Err(e) => {
                    tracing::error!("Serial read failed: {}", e);
                    return FinishReason::ReadError(e.to_string());
                }
            }
        }
        FinishReason::Stopped
    }

    fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.stats.lines_read += 1;

        match parse_sample(line) {
            Ok(sample) => {
                // Append first so the redraw sees this sample
                let Some(len) = self.session.append(&self.token, sample) else {
                    return;
                };
                self.stats.samples_accepted += 1;
                self.announce_sample(len);
                (self.redraw)();
            }
            Err(e) => {
                self.stats.lines_rejected += 1;
                tracing::debug!("Discarding line {:?}: {}", line.trim_end(), e);
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        self.token.deactivate();
        tracing::info!(
            "Acquisition finished ({:?}): {} lines, {} samples, {} rejected ({:.1}% accepted)",
            reason,
            self.stats.lines_read,
            self.stats.samples_accepted,
            self.stats.lines_rejected,
            self.stats.acceptance_rate()
        );
        self.send_terminal(AcquisitionEvent::Finished {
            reason,
            stats: self.stats,
        });
        (self.redraw)();
    }

    fn announce_sample(&self, len: usize) {
        if self.sample_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.events.try_send(AcquisitionEvent::SampleAppended { len }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.sample_pending.store(false, Ordering::SeqCst);
                tracing::trace!("Event channel full, dropping sample event");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Blocking send, bounded so a vanished UI cannot hold the thread
    fn send_terminal(&self, event: AcquisitionEvent) {
        match self.events.send_timeout(event, TERMINAL_SEND_TIMEOUT) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(event)) => {
                tracing::warn!("Event channel full, run-ending event lost: {:?}", event);
            }
            Err(SendTimeoutError::Disconnected(_)) => {}
        }
    }

    /// Counters of this run so far
    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReaderSource;
    use crate::types::Sample;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    fn worker(session: &Arc<Session>) -> (AcquisitionWorker, crossbeam_channel::Receiver<AcquisitionEvent>) {
        let run = session.begin_run().unwrap();
        let (tx, rx) = unbounded();
        let worker = AcquisitionWorker::new(
            session.clone(),
            run.token,
            "test".to_string(),
            tx,
            Arc::new(|| {}),
        );
        (worker, rx)
    }

    #[test]
    fn test_drive_appends_valid_lines_in_order() {
        let session = Arc::new(Session::new());
        let (mut worker, _rx) = worker(&session);
        let mut source = ReaderSource::new(
            Cursor::new("0.0,1.0,0.0\n0.5,1.2,0.4\n1.0,1.5,0.6\n"),
            "test",
        );

        assert_eq!(worker.drive(&mut source), FinishReason::EndOfStream);
        assert_eq!(
            session.snapshot(),
            vec![
                Sample::new(0.0, 1.0, 0.0),
                Sample::new(0.5, 1.2, 0.4),
                Sample::new(1.0, 1.5, 0.6),
            ]
        );
    }

    #[test]
    fn test_malformed_and_blank_lines() {
        let session = Arc::new(Session::new());
        let (mut worker, _rx) = worker(&session);
        let mut source = ReaderSource::new(
            Cursor::new("0.0,1.0,0.0\n\nabc,1,2\n1,2\n\r\n1.0,2.0,1.0\n"),
            "test",
        );

        worker.drive(&mut source);

        assert_eq!(session.len(), 2);
        assert_eq!(
            worker.stats(),
            AcquisitionStats {
                lines_read: 4,
                samples_accepted: 2,
                lines_rejected: 2,
            }
        );
    }

    #[test]
    fn test_overlong_line_counted_as_rejected() {
        let session = Arc::new(Session::new());
        let (mut worker, _rx) = worker(&session);
        let text = format!("{}\n0.5,1.2,0.4\n", "9".repeat(crate::backend::serial::MAX_LINE_BYTES * 2));
        let mut source = ReaderSource::new(Cursor::new(text), "test");

        worker.drive(&mut source);

        assert_eq!(session.snapshot(), vec![Sample::new(0.5, 1.2, 0.4)]);
        assert_eq!(worker.stats().lines_rejected, 1);
        assert_eq!(worker.stats().lines_read, 2);
    }

    #[test]
    fn test_stopped_run_reads_nothing() {
        let session = Arc::new(Session::new());
        let (mut worker, _rx) = worker(&session);
        session.stop();

        let mut source = ReaderSource::new(Cursor::new("0.0,1.0,0.0\n"), "test");
        assert_eq!(worker.drive(&mut source), FinishReason::Stopped);
        assert!(session.is_empty());
    }

    #[test]
    fn test_sample_events_coalesce_until_received() {
        let session = Arc::new(Session::new());
        let (worker, rx) = worker(&session);
        let pending = Arc::new(AtomicBool::new(false));
        let mut worker = worker.with_sample_pending(pending.clone());
        let mut source = ReaderSource::new(
            Cursor::new("0.0,1.0,0.0\n0.5,1.2,0.4\n1.0,1.5,0.6\n"),
            "test",
        );

        worker.drive(&mut source);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![AcquisitionEvent::SampleAppended { len: 1 }]);

        pending.store(false, Ordering::SeqCst);
        let mut source = ReaderSource::new(Cursor::new("1.5,1.7,0.4\n"), "test");
        worker.drive(&mut source);
        assert_eq!(rx.try_recv().unwrap(), AcquisitionEvent::SampleAppended { len: 4 });
    }

    #[test]
    fn test_finished_waits_for_room_in_full_channel() {
        let session = Arc::new(Session::new());
        let run = session.begin_run().unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);
        tx.send(AcquisitionEvent::SampleAppended { len: 0 }).unwrap();
        let worker = AcquisitionWorker::new(session, run.token, "test".to_string(), tx, Arc::new(|| {}));

        let consumer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            rx.iter().collect::<Vec<_>>()
        });
        let opener = || -> crate::error::Result<Box<dyn LineSource>> {
            Ok(Box::new(ReaderSource::new(Cursor::new(""), "empty")))
        };
        worker.run(&opener, None);

        let events = consumer.join().unwrap();
        assert!(matches!(
            events.last(),
            Some(AcquisitionEvent::Finished { reason: FinishReason::EndOfStream, .. })
        ));
    }

    #[test]
    fn test_sample_event_follows_append() {
        let session = Arc::new(Session::new());
        let (mut worker, rx) = worker(&session);
        let mut source = ReaderSource::new(Cursor::new("0.0,1.0,0.0\n"), "test");

        worker.drive(&mut source);

        assert_eq!(rx.try_recv().unwrap(), AcquisitionEvent::SampleAppended { len: 1 });
        assert_eq!(session.len(), 1);
    }
}
