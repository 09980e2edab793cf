//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP session with the crawler's user agent
//! - GET requests to fetch page content
//! - Classifying responses into usable pages and the ways a page can be unusable

use crate::config::CrawlSettings;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Raw response of a fetch
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Response body as text
    pub body: String,
}

/// Failure to obtain a response at all
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Transport(String),
}

/// Performs the network fetch of one address
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Result of a fetch after classification
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with status 400 or above
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Fetcher backed by a shared reqwest session
///
/// The session (and its connection pool) lives as long as the fetcher and is
/// closed when the fetcher is dropped.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Opens the HTTP session for a crawl run
    pub fn new(settings: &CrawlSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(settings)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Error pages are not worth downloading
        if status > 399 {
            return Ok(FetchResponse {
                status,
                content_type,
                body: String::new(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use site_ripple::config::CrawlSettings;
/// use site_ripple::crawler::build_http_client;
/// use url::Url;
///
/// let seed = Url::parse("https://example.com/").unwrap();
/// let settings = CrawlSettings::new(seed, 3, 10);
/// let client = build_http_client(&settings).unwrap();
/// ```
pub fn build_http_client(settings: &CrawlSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP status >= 400 | HttpError |
/// | Content-Type without `text/html` | ContentMismatch |
/// | Timeout, connection or body failure | NetworkError |
/// | Anything else | Success |
///
/// No retries are attempted.
pub async fn fetch_url<F: Fetcher + ?Sized>(fetcher: &F, url: &Url) -> FetchResult {
    match fetcher.fetch(url).await {
        Ok(response) => classify_response(response),
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Classifies a raw response
pub fn classify_response(response: FetchResponse) -> FetchResult {
    if response.status > 399 {
        return FetchResult::HttpError {
            status_code: response.status,
        };
    }

    if !response.content_type.contains("text/html") {
        return FetchResult::ContentMismatch {
            content_type: response.content_type,
        };
    }

    FetchResult::Success {
        status_code: response.status,
        content_type: response.content_type,
        body: response.body,
    }
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
