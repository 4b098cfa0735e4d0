//! Site-Mapper: a concurrent same-host site crawler
//!
//! This crate crawls a website from a seed URL, follows same-host links up to
//! a bounded depth with a pool of workers, and builds a hierarchical map of the
//! visited pages annotated with HTTP status and response latency.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mapper operations
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {source}")]
    InvalidSeed { url: String, source: UrlError },

    #[error("Failed to fetch seed URL {url}: {reason}")]
    SeedFetch { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Site tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Worker task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors from a single page fetch
///
/// These never abort a crawl on their own; the coordinator turns them into
/// dropped links, except for the seed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

/// Errors raised while rebuilding the site tree from crawl results
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("No root page at depth 0 (seed fetch failed or crawl was empty)")]
    MissingRoot,

    #[error("Expected exactly one root page at depth 0, found {count}")]
    AmbiguousRoot { count: usize },
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlOutcome};
pub use output::{build_site_tree, SiteMapNode};
pub use state::{CrawlResultStore, PageRecord, VisitedSet};
pub use crate::url::{extract_domain, normalize_url};
