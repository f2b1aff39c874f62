//! Shared capture session state
//!
//! [`Session`] is the only state shared between the UI thread and the
//! acquisition thread. It is handed around as `Arc<Session>`.
//!
//! # Synchronization
//!
//! - The dataset lives behind an `RwLock`: the acquisition loop is the only
//!   writer of samples, the plot and the exporter take read snapshots.
//! - The run flag is a per-run [`RunToken`]. Appends check the token while
//!   holding the dataset write lock, so nothing is appended once a run has
//!   been stopped.
//! - A generation counter is bumped (under the write lock) every time the
//!   dataset is cleared, letting readers detect that a cached view is stale.

use crate::session::token::RunToken;
use crate::types::{Sample, SessionStatus};
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Format of the session start label
pub const START_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the PC time stamped into the report metadata
pub const PC_TIME_FORMAT: &str = "%H:%M:%S";

/// Information about a run that was just started
#[derive(Debug, Clone)]
pub struct RunStart {
    /// Token the acquisition loop must poll
    pub token: RunToken,
    /// Wall-clock time of the Start
    pub started_at: DateTime<Local>,
    /// Dataset generation created by this Start
    pub generation: u64,
}

impl RunStart {
    /// Session start label (`YYYY-MM-DD HH:MM:SS`)
    pub fn start_label(&self) -> String {
        self.started_at.format(START_LABEL_FORMAT).to_string()
    }

    /// PC time for the report metadata (`HH:MM:SS`)
    pub fn pc_time(&self) -> String {
        self.started_at.format(PC_TIME_FORMAT).to_string()
    }
}

/// Samples read since a known position of a known generation
#[derive(Debug, Clone, Default)]
pub struct DatasetDelta {
    /// Generation the samples belong to
    pub generation: u64,
    /// True when the caller's view was stale and `samples` is the full dataset
    pub replaced: bool,
    /// New samples in arrival order
    pub samples: Vec<Sample>,
}

/// Capture session shared by the control surface and the acquisition loop
#[derive(Debug, Default)]
pub struct Session {
    dataset: RwLock<Vec<Sample>>,
    current_run: Mutex<Option<RunToken>>,
    start_label: Mutex<Option<String>>,
    generation: AtomicU64,
}

impl Session {
    /// Create an idle session with an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    fn read_dataset(&self) -> RwLockReadGuard<'_, Vec<Sample>> {
        self.dataset.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_dataset(&self) -> RwLockWriteGuard<'_, Vec<Sample>> {
        self.dataset.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_slot(&self) -> MutexGuard<'_, Option<RunToken>> {
        self.current_run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a new run.
    ///
    /// Returns `None` without touching anything if a run is already active.
    /// Otherwise clears the dataset, stamps the start label and installs a
    /// fresh run token.
    pub fn begin_run(&self) -> Option<RunStart> {
        let mut slot = self.run_slot();
        if slot.as_ref().is_some_and(RunToken::is_active) {
            tracing::debug!("Start ignored: acquisition already running");
            return None;
        }

        let started_at = Local::now();
        let token = RunToken::new();

        let generation = {
            let mut data = self.write_dataset();
            data.clear();
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let run = RunStart {
            token: token.clone(),
            started_at,
            generation,
        };

        *self
            .start_label
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(run.start_label());
        *slot = Some(token);

        tracing::info!("Session started at {}", run.start_label());
        Some(run)
    }

    /// Stop the active run, if any. Does not clear the dataset.
    pub fn stop(&self) {
        if let Some(token) = self.run_slot().as_ref() {
            if token.is_active() {
                tracing::info!("Stopping acquisition ({} samples)", self.len());
            }
            token.deactivate();
        }
    }

    /// Stop any active run and clear the dataset.
    pub fn reset(&self) {
        self.stop();
        let mut data = self.write_dataset();
        data.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!("Session reset");
    }

    /// Append a sample on behalf of the run owning `token`.
    ///
    /// Returns the new dataset length, or `None` if the run has been
    /// stopped, in which case nothing is appended.
    pub fn append(&self, token: &RunToken, sample: Sample) -> Option<usize> {
        let mut data = self.write_dataset();
        if !token.is_active() {
            return None;
        }
        data.push(sample);
        Some(data.len())
    }

    /// Current session status
    pub fn status(&self) -> SessionStatus {
        if self.is_running() {
            SessionStatus::Running
        } else {
            SessionStatus::Idle
        }
    }

    /// Whether a run is active
    pub fn is_running(&self) -> bool {
        self.run_slot().as_ref().is_some_and(RunToken::is_active)
    }

    /// Number of samples in the dataset
    pub fn len(&self) -> usize {
        self.read_dataset().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_dataset().is_empty()
    }

    /// Dataset generation, bumped on every Start and Reset
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start label of the latest run, if any
    pub fn start_label(&self) -> Option<String> {
        self.start_label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Copy of the dataset as it is right now.
    ///
    /// Samples appended after this call are not part of the snapshot.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.read_dataset().clone()
    }

    /// Samples added since position `from` of `generation`.
    ///
    /// If the dataset has been cleared since (different generation, or
    /// fewer samples than `from`), the full dataset is returned with
    /// `replaced` set.
    pub fn delta_since(&self, generation: u64, from: usize) -> DatasetDelta {
        let data = self.read_dataset();
        let current = self.generation.load(Ordering::SeqCst);

        if current != generation || from > data.len() {
            DatasetDelta {
                generation: current,
                replaced: true,
                samples: data.clone(),
            }
        } else {
            DatasetDelta {
                generation: current,
                replaced: false,
                samples: data[from..].to_vec(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> Sample {
        Sample::new(t, t * 2.0, 0.1)
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.is_empty());
        assert!(session.start_label().is_none());
    }

    #[test]
    fn test_begin_run_is_noop_while_running() {
        let session = Session::new();
        let run = session.begin_run().unwrap();
        session.append(&run.token, sample(0.0));

        assert!(session.begin_run().is_none());
        assert_eq!(session.len(), 1);
        assert!(session.is_running());
    }

    #[test]
    fn test_append_grows_by_one() {
        let session = Session::new();
        let run = session.begin_run().unwrap();

        for i in 0..5 {
            assert_eq!(session.append(&run.token, sample(i as f64)), Some(i + 1));
        }
        assert_eq!(session.len(), 5);
    }

    #[test]
    fn test_stop_keeps_data_and_blocks_appends() {
        let session = Session::new();
        let run = session.begin_run().unwrap();
        session.append(&run.token, sample(0.0));

        session.stop();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.append(&run.token, sample(1.0)), None);
        assert_eq!(session.len(), 1);

        // Idempotent
        session.stop();
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_restart_clears_previous_data() {
        let session = Session::new();
        let first = session.begin_run().unwrap();
        session.append(&first.token, sample(0.0));
        session.append(&first.token, sample(1.0));
        session.stop();

        let second = session.begin_run().unwrap();
        assert!(session.is_empty());
        assert!(second.generation > first.generation);

        // The old run stays dead even though a new one is active
        assert_eq!(session.append(&first.token, sample(2.0)), None);
        assert_eq!(session.append(&second.token, sample(3.0)), Some(1));
    }

    #[test]
    fn test_reset_from_any_state() {
        let session = Session::new();
        session.reset();
        assert!(session.is_empty());
        assert!(!session.is_running());

        let run = session.begin_run().unwrap();
        session.append(&run.token, sample(0.0));
        session.reset();
        assert!(session.is_empty());
        assert!(!session.is_running());
        assert_eq!(session.append(&run.token, sample(1.0)), None);
    }

    #[test]
    fn test_start_label_format() {
        let session = Session::new();
        let run = session.begin_run().unwrap();
        let label = session.start_label().unwrap();

        assert_eq!(label, run.start_label());
        assert_eq!(label.len(), "2024-01-01 00:00:00".len());
        assert_eq!(run.pc_time().len(), "00:00:00".len());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let session = Session::new();
        let run = session.begin_run().unwrap();
        session.append(&run.token, sample(0.0));

        let snapshot = session.snapshot();
        session.append(&run.token, sample(1.0));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_delta_since_incremental_and_replaced() {
        let session = Session::new();
        let run = session.begin_run().unwrap();
        session.append(&run.token, sample(0.0));
        session.append(&run.token, sample(1.0));

        let delta = session.delta_since(run.generation, 1);
        assert!(!delta.replaced);
        assert_eq!(delta.samples, vec![sample(1.0)]);

        session.reset();
        let delta = session.delta_since(run.generation, 2);
        assert!(delta.replaced);
        assert!(delta.samples.is_empty());
        assert_eq!(delta.generation, session.generation());
    }
}
