//! Site-Ripple: a same-domain page crawler
//!
//! This crate starts from a seed address, follows links that stay on the
//! seed's host, and extracts a title, the first paragraph, outgoing links and
//! image references from every page it visits. Total work is bounded by a
//! concurrency limit and a maximum page count.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Ripple operations
///
/// A crawl run only fails when it cannot start: a bad configuration, a seed
/// that is not a crawlable address, or an HTTP session that cannot be built.
/// Problems with individual pages are never surfaced here.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {source}")]
    InvalidSeed { url: String, source: UrlError },

    #[error("Failed to open HTTP session: {0}")]
    Session(#[source] reqwest::Error),

    #[error("Failed to write report: {0}")]
    Report(#[from] csv::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Site-Ripple operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings, FanOutBase};
pub use crawler::{crawl_site, CrawlOutcome, Crawler, PageRecord};
pub use state::{PageOutcome, VisitLedger};
pub use url::{in_scope, normalize_address, parse_seed, same_host};
