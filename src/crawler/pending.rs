//! Pending-work counter used to detect the end of a crawl

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Counts tasks that have been queued but not fully processed
///
/// A task is counted from the moment it is queued until its worker has
/// queued all of its children, so the count can only reach zero once no
/// further work can appear. Reaching zero fires a latch that stays set.
#[derive(Debug, Default)]
pub struct PendingWork {
    pending: AtomicUsize,
    drained: CancellationToken,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called before a task is pushed onto the queue
    pub fn task_queued(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Called once a task is fully processed
    ///
    /// Returns true if this call drained the counter.
    pub fn task_completed(&self) -> bool {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "task completed more often than queued");
        if previous == 1 {
            self.drained.cancel();
            true
        } else {
            false
        }
    }

    /// Resolves once every queued task has completed
    pub async fn wait_drained(&self) {
        self.drained.cancelled().await
    }

    pub fn is_drained(&self) -> bool {
        self.drained.is_cancelled()
    }

    pub fn count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
