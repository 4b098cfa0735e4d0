//! HTML link extraction
//!
//! Pulls same-host anchor links out of a fetched page body.

use crate::url::{is_same_host, normalize_url};
use scraper::{Html, Selector};
use url::Url;

/// Extracts up to `max_links` same-host links from anchor elements
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolved against the page URL, on the crawl host
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Hrefs that do not resolve to an HTTP(S) URL
/// - Links whose host differs from the crawl host
///
/// Links keep document order and are returned normalized. Repeated hrefs are
/// not collapsed here; deduplication belongs to the visited set.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    host: String,
    max_links: usize,
}

impl LinkExtractor {
    pub fn new(host: impl Into<String>, max_links: usize) -> Self {
        Self {
            host: host.into(),
            max_links,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn max_links(&self) -> usize {
        self.max_links
    }

    /// Parses `html` and returns its same-host links
    ///
    /// # Example
    ///
    /// ```
    /// use site_mapper::crawler::LinkExtractor;
    /// use url::Url;
    ///
    /// let html = r#"<a href="/a">A</a><a href="https://elsewhere.test/">X</a>"#;
    /// let base = Url::parse("http://example.test/").unwrap();
    /// let links = LinkExtractor::new("example.test", 4).extract(html, &base);
    /// assert_eq!(links, vec!["http://example.test/a".to_string()]);
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return links;
        };

        for element in document.select(&a_selector) {
            if links.len() >= self.max_links {
                break;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_link(href, base_url) {
                if is_same_host(&url, &self.host) {
                    links.push(url.to_string());
                }
            }
        }

        links
    }
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_url(absolute.as_str()).ok()
}
