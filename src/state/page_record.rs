//! Page observations produced by the crawl workers

use std::time::Duration;

/// One fetched page
///
/// Created once by the worker that fetched the page and never mutated after
/// it is appended to the result store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Normalized absolute URL
    pub url: String,

    /// HTTP status of the final response
    pub status_code: u16,

    /// Link hops from the seed (seed = 0)
    pub depth: u32,

    /// Page that discovered this URL; `None` for the seed
    pub parent_url: Option<String>,

    /// Same-host links extracted from the body, in document order
    pub links: Vec<String>,

    /// Time until response headers arrived
    pub response_time: Duration,
}

impl PageRecord {
    /// Returns true for the seed record
    pub fn is_root(&self) -> bool {
        self.depth == 0 && self.parent_url.is_none()
    }

    /// Returns true if the page answered 200 OK
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// A unit of work on the crawl queue: a page still to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    pub url: String,
    pub depth: u32,
    pub parent_url: Option<String>,
}

impl PageTask {
    /// The task for the seed URL
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
            parent_url: None,
        }
    }

    /// A task for a link found on `self`, one level deeper
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
            parent_url: Some(self.url.clone()),
        }
    }
}

/// A scheduled link that produced no record because its fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLink {
    pub url: String,
    pub parent_url: Option<String>,
    pub depth: u32,
    pub reason: String,
}
