use crate::UrlError;
use url::Url;

/// Validates a URL submitted for crawling
///
/// # Rules
///
/// 1. The string must parse as an absolute URL
/// 2. Only `http` and `https` schemes are accepted
/// 3. The URL must carry a host
///
/// # Arguments
///
/// * `url_str` - The URL string to validate
///
/// # Returns
///
/// * `Ok(Url)` - Parsed, crawlable URL
/// * `Err(UrlError)` - Malformed or disallowed URL
///
/// # Examples
///
/// ```
/// use shiori_reader::url::validate_crawl_url;
///
/// let url = validate_crawl_url("https://example.com/page").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// assert!(validate_crawl_url("ftp://example.com/").is_err());
/// ```
pub fn validate_crawl_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Normalizes a URL into its cache-key form
///
/// The fragment is stripped (URLs differing only by `#anchor` share one
/// cache entry) and the remainder is lowercased before hashing.
pub fn cache_key_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string().to_lowercase()
}
