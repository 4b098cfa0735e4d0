//! State module for tracking crawl progress
//!
//! This module provides the data a crawl accumulates while it runs.
//!
//! # Components
//!
//! - `PageRecord`: One fetched page (status, depth, parent, links, latency)
//! - `PageTask`: A page waiting on the work queue
//! - `DroppedLink`: A scheduled page whose fetch failed
//! - `CrawlResultStore`: Fetched pages grouped by depth
//! - `VisitedSet`: Atomic check-and-mark deduplication of URLs

mod page_record;
mod result_store;
mod visited;

// Re-export main types
pub use page_record::{DroppedLink, PageRecord, PageTask};
pub use result_store::CrawlResultStore;
pub use visited::VisitedSet;
