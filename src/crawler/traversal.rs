//! Traversal engine: the recursive "crawl one address" unit of work
//!
//! Each unit runs as its own tokio task and moves through:
//! 1. Stop check
//! 2. Scope check against the seed host
//! 3. Reservation of the normalized key in the visit ledger
//! 4. Admission through the concurrency gate (permit held for the fetch only)
//! 5. Fetch and classification
//! 6. Extraction and recording
//! 7. Fan-out: one child unit per discovered link, all joined before returning
//!
//! There is no central loop; the crawl is finished when the root unit returns.

use crate::config::{CrawlSettings, FanOutBase};
use crate::crawler::fetcher::{fetch_url, FetchResult, Fetcher};
use crate::crawler::parser::Extractor;
use crate::output::StatsRecorder;
use crate::state::{InsertOutcome, PageOutcome, Reservation, VisitLedger, WorkId};
use crate::url::{in_scope, normalize_address};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::task::TaskTracker;
use url::Url;

/// Everything the traversal units of one crawl share
pub(crate) struct CrawlContext<F, E> {
    pub seed: Url,
    pub fan_out_base: FanOutBase,
    pub fetcher: F,
    pub extractor: E,
    pub ledger: VisitLedger,
    /// Admission gate bounding concurrent fetches
    pub gate: Semaphore,
    pub stats: StatsRecorder,
    /// Tracks every spawned unit so the supervisor can wait for true quiescence
    pub tracker: TaskTracker,
}

impl<F, E> CrawlContext<F, E> {
    pub fn new(settings: &CrawlSettings, fetcher: F, extractor: E) -> Self {
        Self {
            seed: settings.seed.clone(),
            fan_out_base: settings.fan_out_base,
            fetcher,
            extractor,
            ledger: VisitLedger::new(settings.max_pages),
            gate: Semaphore::new(settings.max_concurrency),
            stats: StatsRecorder::new(),
            tracker: TaskTracker::new(),
        }
    }
}

type UnitFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// How a visit ended before fan-out
enum Visit {
    /// The page was recorded; these are the links to follow
    Recorded { fan_out: Vec<String> },
    Ended(PageOutcome),
}

/// Records the unit's outcome when dropped
///
/// A unit aborted before it decided its outcome counts as cancelled.
struct OutcomeGuard<'a> {
    stats: &'a StatsRecorder,
    outcome: Option<PageOutcome>,
}

impl Drop for OutcomeGuard<'_> {
    fn drop(&mut self) {
        self.stats
            .record(self.outcome.unwrap_or(PageOutcome::Cancelled));
    }
}

/// Crawls one address and, transitively, everything it links to
///
/// Boxed so the unit can spawn copies of itself.
pub(crate) fn crawl_page<F, E>(ctx: Arc<CrawlContext<F, E>>, address: String) -> UnitFuture
where
    F: Fetcher + 'static,
    E: Extractor + 'static,
{
    Box::pin(async move {
        let mut guard = OutcomeGuard {
            stats: &ctx.stats,
            outcome: None,
        };

        match visit(&ctx, &address).await {
            Visit::Recorded { fan_out } => {
                guard.outcome = Some(PageOutcome::Recorded);
                fan_out_links(&ctx, fan_out).await;
            }
            Visit::Ended(outcome) => guard.outcome = Some(outcome),
        }
    })
}

async fn visit<F, E>(ctx: &CrawlContext<F, E>, address: &str) -> Visit
where
    F: Fetcher,
    E: Extractor,
{
    if ctx.ledger.is_stopped() {
        return Visit::Ended(PageOutcome::Cancelled);
    }

    let url = match Url::parse(address) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping unparsable address {}: {}", address, e);
            return Visit::Ended(PageOutcome::InvalidAddress);
        }
    };

    if !in_scope(&url, &ctx.seed) {
        tracing::debug!("Skipping out-of-domain address {}", address);
        return Visit::Ended(PageOutcome::OutOfScope);
    }

    let key = normalize_address(address);

    match ctx.ledger.try_reserve(&key) {
        Reservation::Admitted => {}
        Reservation::AlreadyVisited => return Visit::Ended(PageOutcome::AlreadyVisited),
        Reservation::Stopped => return Visit::Ended(PageOutcome::Cancelled),
        Reservation::LimitReached => return Visit::Ended(PageOutcome::LimitReached),
    }

    let fetched = {
        let cancel = ctx.ledger.cancellation_token();
        let _permit = tokio::select! {
            permit = ctx.gate.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return Visit::Ended(PageOutcome::Cancelled),
            },
            _ = cancel.cancelled() => return Visit::Ended(PageOutcome::Cancelled),
        };

        let in_flight = ctx.stats.track_fetch();
        tracing::info!("Crawling {} (Active: {})", url, in_flight.active());
        fetch_url(&ctx.fetcher, &url).await
        // permit released here, before extraction and fan-out
    };

    let body = match fetched {
        FetchResult::Success { body, .. } => body,
        FetchResult::HttpError { status_code } => {
            tracing::warn!("Error: HTTP {} for {}", status_code, url);
            return Visit::Ended(PageOutcome::DeadLink);
        }
        FetchResult::ContentMismatch { content_type } => {
            tracing::warn!("Error: Non-HTML content {} for {}", content_type, url);
            return Visit::Ended(PageOutcome::ContentMismatch);
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Error fetching {}: {}", url, error);
            return Visit::Ended(PageOutcome::Unreachable);
        }
    };

    let record = ctx.extractor.extract(&body, &url);
    let fan_out = match ctx.fan_out_base {
        FanOutBase::Seed => ctx.extractor.links(&body, &ctx.seed),
        FanOutBase::Page => record.outgoing_links.clone(),
    };

    match ctx.ledger.insert(&key, record) {
        InsertOutcome::Recorded => Visit::Recorded { fan_out },
        InsertOutcome::Discarded => {
            tracing::debug!("Discarding {}: crawl already stopped", url);
            Visit::Ended(PageOutcome::Discarded)
        }
    }
}

/// Spawns one unit per link and waits for all of them
///
/// Failures of children, including aborts after a stop, are absorbed here.
async fn fan_out_links<F, E>(ctx: &Arc<CrawlContext<F, E>>, links: Vec<String>)
where
    F: Fetcher + 'static,
    E: Extractor + 'static,
{
    if links.is_empty() || ctx.ledger.is_stopped() {
        return;
    }

    let mut children = JoinSet::new();
    let mut ids: Vec<WorkId> = Vec::with_capacity(links.len());

    for link in links {
        let unit = ctx.tracker.track_future(crawl_page(Arc::clone(ctx), link));
        let handle = children.spawn(unit);

        match ctx.ledger.register(handle) {
            Some(id) => ids.push(id),
            // Stopped while spawning; the handle was aborted already
            None => break,
        }
    }

    while let Some(joined) = children.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                tracing::warn!("Crawl unit panicked: {}", e);
            } else {
                tracing::debug!("Crawl unit cancelled: {}", e);
            }
        }
    }

    ctx.ledger.deregister(&ids);
}
