use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mapper::url::extract_domain;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `url` lives on `host`
///
/// Only the host component is compared; scheme and port are ignored.
pub fn is_same_host(url: &Url, host: &str) -> bool {
    url.host_str()
        .map(|h| h.eq_ignore_ascii_case(host))
        .unwrap_or(false)
}

/// Strips scheme and host from a URL, leaving path, query and fragment
///
/// Used when printing the site tree. Falls back to the input on parse failure.
pub fn strip_host(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(url) => {
            let mut stripped = url.path().to_string();
            if let Some(query) = url.query() {
                stripped.push('?');
                stripped.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                stripped.push('#');
                stripped.push_str(fragment);
            }
            stripped
        }
        Err(_) => url_str.to_string(),
    }
}
