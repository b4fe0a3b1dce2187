//! Stop coordination for a send run.

use std::sync::Arc;
use tokio::sync::watch;

/// Caller-level stop request, honored at batch boundaries only.
///
/// Cloning shares the same signal. A batch already in flight always runs to
/// its terminal outcome.
#[derive(Clone)]
pub struct StopSignal {
    /// Watch channel holding the stop flag.
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    /// Create a signal in the not-triggered state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request a stop before the next batch starts.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
