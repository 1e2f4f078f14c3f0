//! Cooperative cancellation of a running cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between deletions.
///
/// Clones observe the same flag, so a watchdog can keep one and hand another
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the running cycle to stop after the current deletion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let watchdog = flag.clone();
        assert!(!flag.is_cancelled());

        watchdog.cancel();
        assert!(flag.is_cancelled());
    }
}
