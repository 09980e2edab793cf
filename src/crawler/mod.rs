//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and response classification
//! - HTML extraction of titles, paragraphs, links and images
//! - The recursive, concurrency-bounded traversal
//! - Overall crawl supervision

mod coordinator;
mod fetcher;
mod parser;
mod traversal;

pub use coordinator::{CrawlOutcome, Crawler};
pub use fetcher::{
    build_http_client, classify_response, fetch_url, FetchError, FetchResponse, FetchResult,
    Fetcher, HttpFetcher,
};
pub use parser::{parse_html, Extractor, HtmlExtractor, PageRecord};

use crate::config::CrawlSettings;
use crate::url::parse_seed;
use crate::{CrawlError, Result};
use std::collections::HashMap;

/// Crawls every page reachable from `seed` on the seed's host
///
/// This is the main entry point for a crawl with default settings. It will:
/// 1. Validate the seed address
/// 2. Open the HTTP session
/// 3. Traverse the site with at most `max_concurrency` fetches in flight
/// 4. Stop once `max_pages` pages have been recorded
///
/// # Returns
///
/// * `Ok(HashMap)` - Recorded pages keyed by normalized address
/// * `Err(CrawlError)` - The crawl could not start
///
/// # Example
///
/// ```no_run
/// use site_ripple::crawl_site;
///
/// # async fn example() -> Result<(), site_ripple::CrawlError> {
/// let pages = crawl_site("https://blog.boot.dev", 3, 25).await?;
/// println!("Found {} pages", pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_site(
    seed: &str,
    max_concurrency: usize,
    max_pages: usize,
) -> Result<HashMap<String, PageRecord>> {
    let seed_url = parse_seed(seed).map_err(|source| CrawlError::InvalidSeed {
        url: seed.to_string(),
        source,
    })?;

    let settings = CrawlSettings::new(seed_url, max_concurrency, max_pages);
    let outcome = Crawler::new(settings)?.run().await?;
    Ok(outcome.pages)
}
