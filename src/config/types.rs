use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Site-Ripple
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of pages recorded before the crawl stops
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Base used to resolve the links a page fans out to
    #[serde(rename = "fan-out-base", default)]
    pub fan_out_base: FanOutBase,
}

/// Which address relative links are resolved against when fanning out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutBase {
    /// Resolve against the seed address, whatever page the link was found on
    #[default]
    Seed,
    /// Resolve against the page the link was found on
    Page,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

/// HTTP session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV report written after a crawl
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,
}

/// Runtime parameters of a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed: Url,
    pub max_concurrency: usize,
    pub max_pages: usize,
    pub fan_out_base: FanOutBase,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl CrawlSettings {
    /// Settings for `seed` with the default configuration and the given limits
    pub fn new(seed: Url, max_concurrency: usize, max_pages: usize) -> Self {
        let mut settings = Config::default().crawl_settings(seed);
        settings.max_concurrency = max_concurrency;
        settings.max_pages = max_pages;
        settings
    }
}

impl Config {
    /// Builds the runtime settings for a crawl of `seed`
    pub fn crawl_settings(&self, seed: Url) -> CrawlSettings {
        CrawlSettings {
            seed,
            max_concurrency: self.crawler.max_concurrency,
            max_pages: self.crawler.max_pages,
            fan_out_base: self.crawler.fan_out_base,
            user_agent: self.user_agent.header_value(),
            request_timeout: Duration::from_secs(self.http.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_pages: default_max_pages(),
            fan_out_base: FanOutBase::default(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

fn default_max_concurrency() -> usize {
    5
}

fn default_max_pages() -> usize {
    50
}

fn default_crawler_name() -> String {
    "BootCrawler".to_string()
}

fn default_crawler_version() -> String {
    "1.0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_report_path() -> String {
    "report.csv".to_string()
}
