//! URL handling module for Site-Ripple
//!
//! This module provides the dedup key used by the visit ledger, seed
//! validation, and the same-host scope check applied to every discovered link.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, in_scope, parse_seed, same_host};
pub use normalize::normalize_address;
