//! Statistics gathered during a crawl run
//!
//! This module provides the lock-free counters updated by traversal units
//! and the snapshot printed once the crawl finishes.

use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Live counters shared by all traversal units
#[derive(Debug, Default)]
pub struct StatsRecorder {
    outcomes: [AtomicU64; PageOutcome::ALL.len()],
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the final outcome of one traversal unit
    pub fn record(&self, outcome: PageOutcome) {
        self.outcomes[outcome.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Tracks one fetch for as long as the returned guard lives
    pub fn track_fetch(&self) -> FetchGuard<'_> {
        let active = self.fetch_started();
        FetchGuard {
            recorder: self,
            active,
        }
    }

    /// Marks a fetch as started and returns the number now in flight
    pub fn fetch_started(&self) -> usize {
        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(active, Ordering::SeqCst);
        active
    }

    /// Marks a fetch as finished
    pub fn fetch_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Number of fetches currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous fetches seen so far
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Count for a single outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.outcomes[outcome.index()].load(Ordering::Relaxed)
    }

    /// Freezes the counters into a [`CrawlStatistics`]
    pub fn snapshot(
        &self,
        pages_recorded: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> CrawlStatistics {
        let pages_by_outcome = PageOutcome::ALL
            .iter()
            .map(|outcome| (*outcome, self.count(*outcome)))
            .filter(|(_, count)| *count > 0)
            .collect();

        CrawlStatistics {
            pages_recorded,
            pages_by_outcome,
            peak_concurrent_fetches: self.peak_in_flight(),
            started_at,
            finished_at,
        }
    }
}

/// Keeps a fetch counted as in flight until dropped
///
/// Dropping also happens when the owning task is aborted mid-fetch.
pub struct FetchGuard<'a> {
    recorder: &'a StatsRecorder,
    active: usize,
}

impl FetchGuard<'_> {
    /// Number of fetches in flight when this one started
    pub fn active(&self) -> usize {
        self.active
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.recorder.fetch_finished();
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of pages in the result set
    pub pages_recorded: usize,

    /// Count of traversal units by how they ended
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// Highest number of fetches observed in flight at once
    pub peak_concurrent_fetches: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Count for a single outcome, zero if it never occurred
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of units that got as far as a fetch attempt
    pub fn pages_attempted(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| {
                outcome.is_success()
                    || outcome.is_error()
                    || matches!(outcome, PageOutcome::Discarded)
            })
            .map(|(_, count)| count)
            .sum()
    }

    /// Total number of unusable pages
    pub fn total_errors(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Wall-clock duration of the run
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.pages_recorded);
    println!("  Fetch attempts: {}", stats.pages_attempted());
    println!("  Peak concurrent fetches: {}", stats.peak_concurrent_fetches);
    println!(
        "  Duration: {:.1}s (started {})",
        stats.duration_seconds(),
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("Pages by Outcome:");
    for outcome in PageOutcome::ALL {
        let count = stats.count(outcome);
        if count > 0 {
            println!("  {}: {}", outcome, count);
        }
    }
    println!();

    let attempted = stats.pages_attempted();
    let success_rate = if attempted > 0 {
        (stats.pages_recorded as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetched pages recorded, {} unusable)",
        success_rate,
        stats.pages_recorded,
        attempted,
        stats.total_errors()
    );
}
