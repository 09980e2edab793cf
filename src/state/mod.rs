//! State module for tracking crawl progress
//!
//! This module provides the shared state of a crawl run.
//!
//! # Components
//!
//! - `VisitLedger`: Recorded pages, in-flight reservations, the stop flag and outstanding work
//! - `PageOutcome`: How the crawl of a single address ended

mod ledger;
mod page_outcome;

// Re-export main types
pub use ledger::{InsertOutcome, Reservation, VisitLedger, WorkId};
pub use page_outcome::PageOutcome;
