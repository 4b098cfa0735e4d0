use crate::UrlError;
use url::Url;

/// Normalizes a URL into the canonical form used as a visited-set key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host, lowercased
/// 4. Remove the fragment (everything after #)
///
/// Parsing already resolves dot segments, drops default ports and turns an
/// empty path into `/`. Query strings are kept untouched since they may
/// address distinct pages.
///
/// # Examples
///
/// ```
/// use site_mapper::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.test/a/../b#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.test/b");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlError::MissingDomain)?
        .to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    url.set_fragment(None);

    Ok(url)
}
