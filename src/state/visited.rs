//! Concurrency-safe set of URLs already scheduled in a crawl

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Visited URL set with an atomic check-and-mark
///
/// This is the single deduplication point of a crawl: every discovered link
/// passes through [`VisitedSet::try_mark`] exactly once before it is queued.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true if it was not already present
    ///
    /// The lookup and the insert happen under one lock, so two concurrent
    /// callers can never both get `true` for the same URL.
    pub fn try_mark(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            false
        } else {
            urls.insert(url.to_string())
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Moves every marked URL out, leaving the set empty
    pub fn take_all(&self) -> HashSet<String> {
        std::mem::take(&mut *self.lock())
    }

    // Every critical section is a single set operation, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
