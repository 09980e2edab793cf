use url::Url;

/// Normalizes an address into the key used to deduplicate crawl targets
///
/// # Normalization Steps
///
/// 1. Parse the address; if it carries a host, keep host, explicit port and path
/// 2. Otherwise treat the input as an already scheme-less key and drop any
///    query or fragment
/// 3. Remove trailing slashes
/// 4. Lowercase the whole key
///
/// The scheme, query string and fragment never take part in the key, so
/// `http://` and `https://` variants of a page are the same crawl target.
/// Feeding a key back in returns it unchanged.
///
/// # Examples
///
/// ```
/// use site_ripple::url::normalize_address;
///
/// assert_eq!(normalize_address("https://BLOG.boot.dev/path/"), "blog.boot.dev/path");
/// assert_eq!(normalize_address("blog.boot.dev/path"), "blog.boot.dev/path");
/// ```
pub fn normalize_address(address: &str) -> String {
    let full_path = match Url::parse(address) {
        Ok(url) if url.host_str().is_some() => host_and_path(&url),
        _ => strip_suffixes(address.trim()).to_string(),
    };

    full_path.trim_end_matches('/').to_lowercase()
}

/// Joins the host (plus any explicit port) with the URL path
fn host_and_path(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}{}", host, port, url.path()),
        None => format!("{}{}", host, url.path()),
    }
}

/// Cuts a raw key at the first query or fragment delimiter
fn strip_suffixes(raw: &str) -> &str {
    match raw.find(&['?', '#'][..]) {
        Some(index) => &raw[..index],
        None => raw,
    }
}
