//! Visit ledger shared by every traversal unit of a crawl
//!
//! The ledger is the only shared mutable crawl state. It owns the recorded
//! pages, the keys reserved by in-flight units, the crawl-wide stop flag and
//! the registry of outstanding spawned work. All of it sits behind a single
//! mutex and is only reachable through the composed operations below, none of
//! which block or await while the lock is held.

use crate::crawler::PageRecord;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

/// Identifier of a spawned traversal unit in the outstanding-work registry
pub type WorkId = u64;

/// Answer to a reservation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// The caller owns the key and may fetch it
    Admitted,
    /// The key is already recorded or reserved by another unit
    AlreadyVisited,
    /// The crawl has already stopped
    Stopped,
    /// The page limit was reached by this request; the crawl is now stopped
    LimitReached,
}

/// Result of storing a page record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Recorded,
    /// The crawl was stopped (or full) so the record was dropped
    Discarded,
}

#[derive(Default)]
struct LedgerInner {
    pages: HashMap<String, PageRecord>,
    reserved: HashSet<String>,
    stopped: bool,
    outstanding: HashMap<WorkId, AbortHandle>,
    next_work_id: WorkId,
}

/// Shared record of what has been crawled, plus the stop signal
///
/// Invariants:
/// - the number of recorded pages never exceeds `max_pages`
/// - a key is admitted at most once per crawl
/// - once stopped, nothing is admitted or recorded and every registered
///   unit has been asked to abort
pub struct VisitLedger {
    max_pages: usize,
    inner: Mutex<LedgerInner>,
    cancel: CancellationToken,
}

impl VisitLedger {
    /// Creates an empty ledger that stops after `max_pages` records
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            inner: Mutex::new(LedgerInner::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// Token cancelled when the crawl stops
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Atomically decides whether `key` may be crawled
    ///
    /// Admission reserves the key but does not record anything; the record
    /// is stored later by [`VisitLedger::insert`] once the page is fetched.
    /// Reaching the page limit flips the stop flag and cancels all
    /// outstanding work.
    pub fn try_reserve(&self, key: &str) -> Reservation {
        let mut inner = self.lock();

        if inner.stopped {
            return Reservation::Stopped;
        }

        if inner.pages.contains_key(key) || inner.reserved.contains(key) {
            return Reservation::AlreadyVisited;
        }

        if inner.pages.len() >= self.max_pages {
            self.stop_locked(&mut inner);
            tracing::info!(
                "Reached maximum number of pages to crawl ({})",
                self.max_pages
            );
            return Reservation::LimitReached;
        }

        inner.reserved.insert(key.to_string());
        Reservation::Admitted
    }

    /// Stores the record for a previously admitted key
    ///
    /// The record is discarded when the crawl has already stopped. A record
    /// arriving while the ledger is full (several units were admitted before
    /// the limit was hit) is discarded as well and stops the crawl.
    pub fn insert(&self, key: &str, record: PageRecord) -> InsertOutcome {
        let mut inner = self.lock();

        if inner.stopped {
            return InsertOutcome::Discarded;
        }

        if inner.pages.len() >= self.max_pages {
            self.stop_locked(&mut inner);
            tracing::info!(
                "Reached maximum number of pages to crawl ({})",
                self.max_pages
            );
            return InsertOutcome::Discarded;
        }

        inner.pages.insert(key.to_string(), record);
        InsertOutcome::Recorded
    }

    /// Stops the crawl and cancels all outstanding work. Idempotent.
    pub fn request_stop(&self) {
        let mut inner = self.lock();
        self.stop_locked(&mut inner);
    }

    /// Returns true once the crawl has stopped
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Registers a spawned unit so a stop can abort it
    ///
    /// If the crawl has already stopped the unit is aborted right away and
    /// `None` is returned.
    pub fn register(&self, handle: AbortHandle) -> Option<WorkId> {
        let mut inner = self.lock();

        if inner.stopped {
            handle.abort();
            return None;
        }

        let id = inner.next_work_id;
        inner.next_work_id += 1;
        inner.outstanding.insert(id, handle);
        Some(id)
    }

    /// Removes finished units from the registry
    pub fn deregister(&self, ids: &[WorkId]) {
        let mut inner = self.lock();
        for id in ids {
            inner.outstanding.remove(id);
        }
    }

    /// Number of registered units that have not been deregistered yet
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding.len()
    }

    /// Number of recorded pages
    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    /// Returns true if no page has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the recorded pages, keyed by normalized address
    ///
    /// Meant to be called once traversal has quiesced.
    pub fn snapshot(&self) -> HashMap<String, PageRecord> {
        self.lock().pages.clone()
    }

    fn stop_locked(&self, inner: &mut LedgerInner) {
        if inner.stopped {
            return;
        }

        inner.stopped = true;
        for (_, handle) in inner.outstanding.drain() {
            handle.abort();
        }
        self.cancel.cancel();
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        // Critical sections never panic midway, so a poisoned lock still holds consistent data
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
