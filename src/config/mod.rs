//! Configuration module for Site-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning a configuration into the runtime settings of one crawl.
//!
//! # Example
//!
//! ```no_run
//! use site_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSettings, CrawlerConfig, FanOutBase, HttpConfig, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::{validate, validate_limits, MAX_CONCURRENCY_LIMIT};
