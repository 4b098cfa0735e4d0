//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts and cancellation
//! - HTML parsing and same-host link extraction
//! - Pending-work tracking for completion detection
//! - The worker pool that coordinates a crawl

mod coordinator;
mod fetcher;
mod parser;
mod pending;

pub use coordinator::{max_in_flight_tasks, Coordinator, CrawlOutcome, DroppedLinkCallback};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use parser::LinkExtractor;
pub use pending::PendingWork;

use crate::config::Config;
use crate::MapperError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and normalize the seed
/// 2. Build the HTTP client
/// 3. Spawn the worker pool and fetch pages
/// 4. Extract and follow same-host links up to the depth limit
/// 5. Return the collected results
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl completed successfully
/// * `Err(MapperError)` - Invalid input or the seed could not be fetched
///
/// # Example
///
/// ```no_run
/// use site_mapper::config::Config;
/// use site_mapper::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = crawl("https://example.com/", Config::default()).await?;
/// println!("{} pages", outcome.store.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &str, config: Config) -> Result<CrawlOutcome, MapperError> {
    Coordinator::new(seed, config)?.run().await
}
