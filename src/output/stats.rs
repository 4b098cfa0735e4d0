//! Statistics derived from a finished crawl
//!
//! This module provides functionality for summarizing a [`CrawlOutcome`]
//! and displaying the summary on stdout.

use crate::crawler::CrawlOutcome;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Seed the crawl started from
    pub seed_url: String,

    /// Number of pages with a record
    pub total_pages: usize,

    /// Record count per depth
    pub pages_by_depth: BTreeMap<u32, usize>,

    /// Record count per HTTP status code
    pub pages_by_status: BTreeMap<u16, usize>,

    /// Records that answered 200 OK
    pub ok_pages: usize,

    /// Total links kept across all pages
    pub total_links: usize,

    /// URLs that were scheduled
    pub visited_urls: usize,

    /// Scheduled URLs whose fetch failed
    pub dropped_links: usize,

    pub mean_response_time: Option<Duration>,

    /// Slowest page and its response time
    pub slowest_page: Option<(String, Duration)>,

    /// Wall-clock duration in milliseconds
    pub duration_ms: i64,

    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Summarizes an outcome
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let mut pages_by_status = BTreeMap::new();
        let mut ok_pages = 0;
        let mut total_links = 0;
        let mut total_time = Duration::ZERO;
        let mut slowest_page: Option<(String, Duration)> = None;

        for record in outcome.store.iter() {
            *pages_by_status.entry(record.status_code).or_insert(0) += 1;
            if record.is_ok() {
                ok_pages += 1;
            }
            total_links += record.links.len();
            total_time += record.response_time;

            let slower = slowest_page
                .as_ref()
                .map_or(true, |(_, time)| record.response_time > *time);
            if slower {
                slowest_page = Some((record.url.clone(), record.response_time));
            }
        }

        let total_pages = outcome.store.len();
        let mean_response_time = u32::try_from(total_pages)
            .ok()
            .filter(|count| *count > 0)
            .map(|count| total_time / count);

        Self {
            seed_url: outcome.seed_url.clone(),
            total_pages,
            pages_by_depth: outcome.store.depth_counts(),
            pages_by_status,
            ok_pages,
            total_links,
            visited_urls: outcome.visited.len(),
            dropped_links: outcome.dropped.len(),
            mean_response_time,
            slowest_page,
            duration_ms: outcome.duration().num_milliseconds(),
            cancelled: outcome.cancelled,
        }
    }

    /// Share of records with status 200, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.ok_pages as f64 / self.total_pages as f64) * 100.0
    }
}

/// Renders statistics as a text block
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Seed: {}", stats.seed_url);
    let _ = writeln!(out, "  Pages recorded: {}", stats.total_pages);
    let _ = writeln!(out, "  URLs scheduled: {}", stats.visited_urls);
    let _ = writeln!(out, "  Dropped links: {}", stats.dropped_links);
    let _ = writeln!(out, "  Links followed from pages: {}", stats.total_links);
    let _ = writeln!(out, "  Duration: {}ms", stats.duration_ms);
    if stats.cancelled {
        let _ = writeln!(out, "  Status: cancelled (partial results)");
    }
    let _ = writeln!(out);

    if !stats.pages_by_depth.is_empty() {
        let _ = writeln!(out, "Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            let _ = writeln!(out, "  {}: {}", depth, count);
        }
        let _ = writeln!(out);
    }

    if !stats.pages_by_status.is_empty() {
        let _ = writeln!(out, "Pages by Status:");
        for (status, count) in &stats.pages_by_status {
            let _ = writeln!(out, "  {}: {}", status, count);
        }
        let _ = writeln!(out);
    }

    if let Some(mean) = stats.mean_response_time {
        let _ = writeln!(out, "Mean response time: {}ms", mean.as_millis());
    }
    if let Some((url, time)) = &stats.slowest_page {
        let _ = writeln!(out, "Slowest page: {} ({}ms)", url, time.as_millis());
    }

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} pages returned 200)",
        stats.success_rate(),
        stats.ok_pages,
        stats.total_pages
    );
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
