//! Per-run cancellation token
//!
//! Every Start creates a fresh token. The acquisition loop polls its own
//! token, so a loop still finishing its last read after Stop can never be
//! revived by a quick restart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared run flag for one acquisition run
#[derive(Debug, Clone)]
pub struct RunToken {
    active: Arc<AtomicBool>,
}

impl RunToken {
    /// Create an active token
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the run should keep going
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Ask the run to stop. Idempotent.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = RunToken::new();
        let clone = token.clone();
        assert!(clone.is_active());

        token.deactivate();
        assert!(!clone.is_active());
    }

    #[test]
    fn test_new_tokens_are_independent() {
        let first = RunToken::new();
        let second = RunToken::new();
        first.deactivate();

        assert!(second.is_active());
    }
}
