//! Site-Ripple main entry point
//!
//! This is the command-line interface for the Site-Ripple page crawler.

use anyhow::Context;
use clap::Parser;
use site_ripple::config::{load_config_with_hash, validate_limits, Config};
use site_ripple::output::{print_statistics, write_csv_report};
use site_ripple::{parse_seed, Crawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Ripple: a same-domain page crawler
///
/// Site-Ripple starts at BASE_URL, follows every link that stays on the
/// same host, and writes the title, first paragraph, outgoing links and
/// images of each page it finds to a CSV report.
#[derive(Parser, Debug)]
#[command(name = "site-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A same-domain page crawler", long_about = None)]
struct Cli {
    /// Address to start crawling from
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Maximum number of fetches in flight at once
    #[arg(value_name = "MAX_CONCURRENCY")]
    max_concurrency: Option<usize>,

    /// Maximum number of pages to record
    #[arg(value_name = "MAX_PAGES")]
    max_pages: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the CSV report (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_concurrency) = cli.max_concurrency {
        config.crawler.max_concurrency = max_concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    validate_limits(config.crawler.max_concurrency, config.crawler.max_pages)?;

    let seed = parse_seed(&cli.base_url)
        .with_context(|| format!("invalid base URL: {}", cli.base_url))?;
    let report_path = cli
        .report
        .unwrap_or_else(|| PathBuf::from(&config.output.report_path));

    let crawler = Crawler::new(config.crawl_settings(seed))?;
    let outcome = crawler.run().await?;

    write_csv_report(&outcome.pages, &report_path)
        .with_context(|| format!("failed to write report to {}", report_path.display()))?;
    tracing::info!(
        "Report with {} pages written to: {}",
        outcome.pages.len(),
        report_path.display()
    );

    if !cli.quiet {
        print_statistics(&outcome.statistics);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_ripple=info,warn"),
            1 => EnvFilter::new("site_ripple=debug,info"),
            2 => EnvFilter::new("site_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
