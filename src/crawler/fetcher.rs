//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with user agent and timeouts
//! - Single GET requests with latency measurement
//! - Link extraction for 200 responses
//! - Error classification and cancellation

use crate::config::Config;
use crate::crawler::parser::LinkExtractor;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of a successful fetch
///
/// A fetch is successful whenever the server answered, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// HTTP status code of the final response
    pub status_code: u16,
    /// Same-host links, only populated for 200 responses
    pub links: Vec<String>,
    /// Time until response headers arrived
    pub response_time: Duration,
}

/// Builds an HTTP client with proper configuration
///
/// The client carries the configured user agent plus request and connect
/// timeouts, and is shared by every worker of a crawl.
///
/// # Example
///
/// ```no_run
/// use site_mapper::config::Config;
/// use site_mapper::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and extracts its links
///
/// # Request Flow
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | Connect / DNS / TLS error | `Err(FetchError::Request)` |
/// | Timeout | `Err(FetchError::Timeout)` |
/// | Cancellation token fired | `Err(FetchError::Cancelled)` |
/// | Non-200 status | `Ok` with status, no links, body unread |
/// | 200, body unreadable | `Err(FetchError::Body)` |
/// | 200 | `Ok` with links from the body |
///
/// Redirects are followed by the client; the status is the one of the final
/// response and the page keeps the requested URL.
pub async fn fetch_page(
    client: &Client,
    url: &str,
    extractor: &LinkExtractor,
    cancel: &CancellationToken,
) -> Result<FetchedPage, FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled { url: url.to_string() }),
        result = fetch_uncancelled(client, url, extractor) => result,
    }
}

async fn fetch_uncancelled(
    client: &Client,
    url: &str,
    extractor: &LinkExtractor,
) -> Result<FetchedPage, FetchError> {
    let start = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;
    let response_time = start.elapsed();

    let status = response.status();
    let mut page = FetchedPage {
        url: url.to_string(),
        status_code: status.as_u16(),
        links: Vec::new(),
        response_time,
    };

    if status != StatusCode::OK {
        tracing::debug!("{} answered {}, not parsing body", url, status);
        return Ok(page);
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    // Relative hrefs resolve against the page itself
    match Url::parse(url) {
        Ok(base) => page.links = extractor.extract(&body, &base),
        Err(e) => tracing::debug!("Cannot resolve links of {}: {}", url, e),
    }

    Ok(page)
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}
