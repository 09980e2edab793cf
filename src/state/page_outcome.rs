/// Page outcome definitions for tracking crawl progress
///
/// Every traversal unit ends in exactly one of these outcomes.
use std::fmt;

/// Represents how the crawl of one address ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    // ===== Success =====
    /// Page was fetched, extracted and stored in the ledger
    Recorded,

    // ===== Silent Skips =====
    /// Address could not be parsed as a URL
    InvalidAddress,

    /// Address lives on a different host than the seed
    OutOfScope,

    /// Address was already recorded or reserved by another unit
    AlreadyVisited,

    // ===== Unusable Pages =====
    /// Page returned HTTP 400 or above
    DeadLink,

    /// Page Content-Type is not HTML
    ContentMismatch,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    // ===== Stop Condition =====
    /// The page limit was reached when this address asked for a reservation
    LimitReached,

    /// Page was fetched but the crawl had already stopped, so it was dropped
    Discarded,

    /// Unit observed the stop signal before fetching
    Cancelled,
}

impl PageOutcome {
    /// All outcomes, in reporting order
    pub const ALL: [PageOutcome; 10] = [
        Self::Recorded,
        Self::InvalidAddress,
        Self::OutOfScope,
        Self::AlreadyVisited,
        Self::DeadLink,
        Self::ContentMismatch,
        Self::Unreachable,
        Self::LimitReached,
        Self::Discarded,
        Self::Cancelled,
    ];

    /// Returns true if the page made it into the result set
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    /// Returns true for skips that are never reported as problems
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress | Self::OutOfScope | Self::AlreadyVisited
        )
    }

    /// Returns true if the page was fetched (or attempted) but was unusable
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink | Self::ContentMismatch | Self::Unreachable
        )
    }

    /// Returns true for outcomes caused by the crawl-wide stop
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::LimitReached | Self::Discarded | Self::Cancelled)
    }

    /// Stable position of this outcome in [`PageOutcome::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short machine-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::InvalidAddress => "invalid_address",
            Self::OutOfScope => "out_of_scope",
            Self::AlreadyVisited => "already_visited",
            Self::DeadLink => "dead_link",
            Self::ContentMismatch => "content_mismatch",
            Self::Unreachable => "unreachable",
            Self::LimitReached => "limit_reached",
            Self::Discarded => "discarded",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
