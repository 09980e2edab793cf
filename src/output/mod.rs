//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Writing the CSV report of recorded pages
//! - Recording crawl statistics while traversal units run
//! - Printing the statistics once the crawl finishes

mod csv_report;
pub mod stats;

pub use csv_report::{write_csv, write_csv_report, CSV_HEADERS};
pub use stats::{print_statistics, CrawlStatistics, FetchGuard, StatsRecorder};
