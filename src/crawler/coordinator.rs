//! Crawler coordinator - crawl supervision
//!
//! The coordinator owns everything that lives for exactly one crawl run:
//! - The HTTP session (through the fetcher)
//! - The concurrency gate and the page limit
//! - The visit ledger with its outstanding-work registry
//!
//! It seeds the traversal with the seed address, waits until every spawned
//! unit has finished, and hands back the recorded pages.

use crate::config::{validate_limits, CrawlSettings};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{Extractor, HtmlExtractor, PageRecord};
use crate::crawler::traversal::{crawl_page, CrawlContext};
use crate::output::CrawlStatistics;
use crate::{CrawlError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Recorded pages keyed by normalized address
    pub pages: HashMap<String, PageRecord>,

    /// Counters gathered while crawling
    pub statistics: CrawlStatistics,
}

/// Main crawler structure
///
/// Generic over the fetcher and the extractor so the traversal can run
/// against in-process fakes; [`Crawler::new`] wires up the HTTP and HTML
/// implementations.
pub struct Crawler<F = HttpFetcher, E = HtmlExtractor> {
    settings: CrawlSettings,
    fetcher: F,
    extractor: E,
}

impl Crawler<HttpFetcher, HtmlExtractor> {
    /// Creates a crawler and opens its HTTP session
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Session opened
    /// * `Err(CrawlError::Session)` - The HTTP client could not be built
    pub fn new(settings: CrawlSettings) -> Result<Self> {
        let fetcher = HttpFetcher::new(&settings).map_err(CrawlError::Session)?;
        Ok(Self::with_parts(settings, fetcher, HtmlExtractor))
    }
}

impl<F, E> Crawler<F, E>
where
    F: Fetcher + 'static,
    E: Extractor + 'static,
{
    /// Creates a crawler from explicit collaborators
    pub fn with_parts(settings: CrawlSettings, fetcher: F, extractor: E) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
        }
    }

    /// Runs the crawl to completion
    ///
    /// Consumes the crawler: the HTTP session is closed once the run is over,
    /// whether it ended by exhausting the site or by hitting the page limit.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Crawl finished; individual page failures are
    ///   only reflected in the statistics
    /// * `Err(CrawlError)` - The limits are invalid
    pub async fn run(self) -> Result<CrawlOutcome> {
        let Self {
            settings,
            fetcher,
            extractor,
        } = self;

        validate_limits(settings.max_concurrency, settings.max_pages)?;

        let started_at = Utc::now();
        tracing::info!(
            "Starting async crawl of: {} (max concurrency: {}, max pages: {})",
            settings.seed,
            settings.max_concurrency,
            settings.max_pages
        );

        let ctx = Arc::new(CrawlContext::new(&settings, fetcher, extractor));

        crawl_page(Arc::clone(&ctx), settings.seed.to_string()).await;

        // Stragglers must not record anything once the root has returned
        ctx.ledger.request_stop();

        // Aborted descendants are only torn down on their next poll; wait for them
        ctx.tracker.close();
        ctx.tracker.wait().await;

        let pages = ctx.ledger.snapshot();
        let statistics = ctx.stats.snapshot(pages.len(), started_at, Utc::now());

        tracing::info!(
            "Crawling complete. Found {} pages in {:.1}s",
            pages.len(),
            statistics.duration_seconds()
        );

        Ok(CrawlOutcome { pages, statistics })
    }
}
