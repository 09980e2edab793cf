use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from a URL
///
/// The host is returned lowercase together with any explicit port, so two
/// mock servers on the same machine are told apart. If the URL has no host,
/// it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_ripple::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns true if both URLs point at the same host (and explicit port)
///
/// Scheme and path play no part in the comparison.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns true if `url` is an HTTP(S) address on the seed's host
///
/// Pages record every reference they hold; only these are crawled.
pub fn in_scope(url: &Url, seed: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && same_host(url, seed)
}

/// Parses and validates a seed address
///
/// # Returns
///
/// * `Ok(Url)` - An absolute HTTP(S) URL with a host
/// * `Err(UrlError)` - The seed cannot start a crawl
pub fn parse_seed(seed: &str) -> UrlResult<Url> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
