//! Depth-bucketed storage for fetched pages

use crate::state::PageRecord;
use std::collections::BTreeMap;

/// Fetched pages grouped by depth
///
/// The store itself is not synchronized. During a crawl the coordinator keeps
/// it behind a single mutex; once the crawl has terminated it is handed out
/// by value and read without locking.
#[derive(Debug, Clone, Default)]
pub struct CrawlResultStore {
    by_depth: BTreeMap<u32, Vec<PageRecord>>,
}

impl CrawlResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the bucket for its depth
    pub fn insert(&mut self, record: PageRecord) {
        self.by_depth.entry(record.depth).or_default().push(record);
    }

    /// Records at `depth`, in insertion order
    pub fn at_depth(&self, depth: u32) -> &[PageRecord] {
        self.by_depth
            .get(&depth)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    /// Deepest populated bucket, if any
    pub fn max_depth(&self) -> Option<u32> {
        self.by_depth.keys().next_back().copied()
    }

    /// All records, shallowest depth first
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.by_depth.values().flatten()
    }

    /// Number of records per depth
    pub fn depth_counts(&self) -> BTreeMap<u32, usize> {
        self.by_depth
            .iter()
            .map(|(depth, records)| (*depth, records.len()))
            .collect()
    }

    /// Looks up a record by URL
    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.iter().find(|record| record.url == url)
    }

    pub fn len(&self) -> usize {
        self.by_depth.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_depth.values().all(Vec::is_empty)
    }
}
