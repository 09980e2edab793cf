//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. The concurrency tests swap the HTTP
//! fetcher for an in-process one that counts overlapping fetches.

use async_trait::async_trait;
use site_ripple::crawler::{FetchError, FetchResponse, Fetcher, HtmlExtractor};
use site_ripple::{crawl_site, CrawlError, CrawlSettings, Crawler, FanOutBase, PageOutcome};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><body><h1>{}</h1><main><p>About {}.</p></main>{}</body></html>",
        title, title, anchors
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(html_page(title, links)))
        .mount(server)
        .await;
}

/// Normalized key of `route` on the mock server
fn key(server: &MockServer, route: &str) -> String {
    let base = server.uri();
    let host = base
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("{}{}", host, route.trim_end_matches('/'))
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/about", "/blog"]).await;
    mount_page(&server, "/about", "About", &["/", "/blog"]).await;
    mount_page(&server, "/blog", "Blog", &["/blog/first"]).await;
    mount_page(&server, "/blog/first", "First post", &["/about"]).await;

    let pages = crawl_site(&server.uri(), 3, 50).await.unwrap();

    assert_eq!(pages.len(), 4);
    for route in ["/", "/about", "/blog", "/blog/first"] {
        assert!(pages.contains_key(&key(&server, route)), "missing {}", route);
    }

    let first = &pages[&key(&server, "/blog/first")];
    assert_eq!(first.title, "First post");
    assert_eq!(first.first_paragraph, "About First post.");
    assert_eq!(
        first.outgoing_links,
        vec![format!("{}/about", server.uri())]
    );
}

#[tokio::test]
async fn test_every_key_is_on_the_seed_host() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        &["/a", "https://elsewhere.example.com/page", "/b"],
    )
    .await;
    mount_page(&server, "/a", "A", &["https://other.example.org/"]).await;
    mount_page(&server, "/b", "B", &[]).await;

    let pages = crawl_site(&server.uri(), 2, 50).await.unwrap();

    let prefix = key(&server, "");
    assert_eq!(pages.len(), 3);
    assert!(pages.keys().all(|k| k.starts_with(&prefix)));

    // Out-of-domain links are still reported on the page that holds them
    let home = &pages[&key(&server, "/")];
    assert!(home
        .outgoing_links
        .contains(&"https://elsewhere.example.com/page".to_string()));
}

#[tokio::test]
async fn test_special_references_recorded_but_not_crawled() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        &["#top", "mailto:team@example.com", "javascript:void(0)", "/a"],
    )
    .await;
    mount_page(&server, "/a", "A", &[]).await;

    let settings = CrawlSettings::new(Url::parse(&server.uri()).unwrap(), 2, 50);
    let outcome = Crawler::new(settings).unwrap().run().await.unwrap();

    assert_eq!(outcome.pages.len(), 2);
    let home = &outcome.pages[&key(&server, "/")];
    assert_eq!(
        home.outgoing_links,
        vec![
            format!("{}/#top", server.uri()),
            "mailto:team@example.com".to_string(),
            "javascript:void(0)".to_string(),
            format!("{}/a", server.uri()),
        ]
    );
    assert_eq!(outcome.statistics.count(PageOutcome::OutOfScope), 2);
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    // Every page links to every other page, in several spellings
    let links = ["/", "/a", "/a?page=2", "/b", "/b?ref=home", "/a#top"];
    for (route, title) in [("/", "Home"), ("/a", "A"), ("/b", "B")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(html_page(title, &links)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let pages = crawl_site(&server.uri(), 4, 50).await.unwrap();

    assert_eq!(pages.len(), 3);
    // Expectations are verified when the server is dropped
}

#[tokio::test]
async fn test_page_limit_of_one() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/1", "/2", "/3", "/4", "/5"]).await;
    for route in ["/1", "/2", "/3", "/4", "/5"] {
        mount_page(&server, route, route, &[]).await;
    }

    let pages = crawl_site(&server.uri(), 3, 1).await.unwrap();

    assert_eq!(pages.len(), 1);
    assert!(pages.contains_key(&key(&server, "/")));
}

#[tokio::test]
async fn test_dead_link_does_not_affect_siblings() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/gone", "/alive"]).await;
    mount_page(&server, "/alive", "Alive", &[]).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pages = crawl_site(&server.uri(), 2, 50).await.unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages.contains_key(&key(&server, "/alive")));
    assert!(!pages.contains_key(&key(&server, "/gone")));
}

#[tokio::test]
async fn test_non_html_content_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/data.json", "/page"]).await;
    mount_page(&server, "/page", "Page", &[]).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let settings = CrawlSettings::new(Url::parse(&server.uri()).unwrap(), 2, 50);
    let outcome = Crawler::new(settings).unwrap().run().await.unwrap();

    assert_eq!(outcome.pages.len(), 2);
    assert!(!outcome.pages.contains_key(&key(&server, "/data.json")));
    assert_eq!(outcome.statistics.count(PageOutcome::ContentMismatch), 1);
}

#[tokio::test]
async fn test_failing_seed_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let pages = crawl_site(&server.uri(), 2, 50).await.unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let result = crawl_site("not a url", 2, 10).await;
    assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));

    let result = crawl_site("ftp://files.example.com/", 2, 10).await;
    assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
}

#[tokio::test]
async fn test_zero_limits_are_rejected() {
    let server = MockServer::start().await;

    assert!(matches!(
        crawl_site(&server.uri(), 0, 10).await,
        Err(CrawlError::Config(_))
    ));
    assert!(matches!(
        crawl_site(&server.uri(), 2, 0).await,
        Err(CrawlError::Config(_))
    ));
}

#[tokio::test]
async fn test_high_concurrency_is_accepted() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/a"]).await;
    mount_page(&server, "/a", "A", &[]).await;

    let pages = crawl_site(&server.uri(), 101, 10).await.unwrap();
    assert_eq!(pages.len(), 2);

    let pages = crawl_site(&server.uri(), 1_000, 10).await.unwrap();
    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_fan_out_base_controls_relative_links() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/docs/"]).await;
    mount_page(&server, "/docs/", "Docs", &["intro"]).await;
    mount_page(&server, "/docs/intro", "Docs intro", &[]).await;
    mount_page(&server, "/intro", "Root intro", &[]).await;

    let seed = Url::parse(&server.uri()).unwrap();

    let mut settings = CrawlSettings::new(seed.clone(), 2, 50);
    settings.fan_out_base = FanOutBase::Seed;
    let by_seed = Crawler::new(settings).unwrap().run().await.unwrap().pages;
    assert!(by_seed.contains_key(&key(&server, "/intro")));
    assert!(!by_seed.contains_key(&key(&server, "/docs/intro")));

    let mut settings = CrawlSettings::new(seed, 2, 50);
    settings.fan_out_base = FanOutBase::Page;
    let by_page = Crawler::new(settings).unwrap().run().await.unwrap().pages;
    assert!(by_page.contains_key(&key(&server, "/docs/intro")));
    assert!(!by_page.contains_key(&key(&server, "/intro")));

    // The record itself always resolves against the page it came from
    let docs = &by_seed[&key(&server, "/docs")];
    assert_eq!(
        docs.outgoing_links,
        vec![format!("{}/docs/intro", server.uri())]
    );
}

/// Serves a synthetic site from memory and records fetch overlap
#[derive(Default)]
struct SiteState {
    pages: HashMap<String, String>,
    /// Paths whose fetch fails with a timeout
    unreachable: HashSet<String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

#[derive(Clone)]
struct InMemoryFetcher {
    state: Arc<SiteState>,
    delay: Duration,
}

#[async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(now, Ordering::SeqCst);
        self.state
            .fetched
            .lock()
            .unwrap()
            .push(url.path().to_string());

        tokio::time::sleep(self.delay).await;

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.state.unreachable.contains(url.path()) {
            return Err(FetchError::Timeout);
        }

        match self.state.pages.get(url.path()) {
            Some(body) => Ok(FetchResponse {
                status: 200,
                content_type: "text/html".to_string(),
                body: body.clone(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                content_type: "text/html".to_string(),
                body: String::new(),
            }),
        }
    }
}

/// A hub page linking to `count` leaves that each link to their neighbours
fn wide_site(count: usize) -> Arc<SiteState> {
    wide_site_with_unreachable(count, &[])
}

fn wide_site_with_unreachable(count: usize, unreachable: &[&str]) -> Arc<SiteState> {
    let leaves: Vec<String> = (0..count).map(|i| format!("/p{}", i)).collect();
    let mut pages = HashMap::new();

    let hub_links: Vec<&str> = leaves.iter().map(String::as_str).collect();
    pages.insert("/".to_string(), html_page("Hub", &hub_links));

    for (i, leaf) in leaves.iter().enumerate() {
        let next = &leaves[(i + 1) % count];
        pages.insert(leaf.clone(), html_page(leaf, &["/", next.as_str()]));
    }

    Arc::new(SiteState {
        pages,
        unreachable: unreachable.iter().map(|p| p.to_string()).collect(),
        ..Default::default()
    })
}

fn in_memory_crawler(
    state: &Arc<SiteState>,
    max_concurrency: usize,
    max_pages: usize,
) -> Crawler<InMemoryFetcher, HtmlExtractor> {
    let seed = Url::parse("https://site.test/").unwrap();
    let fetcher = InMemoryFetcher {
        state: Arc::clone(state),
        delay: Duration::from_millis(20),
    };
    Crawler::with_parts(
        CrawlSettings::new(seed, max_concurrency, max_pages),
        fetcher,
        HtmlExtractor,
    )
}

#[tokio::test]
async fn test_concurrent_fetches_never_exceed_limit() {
    let state = wide_site(30);

    let outcome = in_memory_crawler(&state, 3, 100).run().await.unwrap();

    assert_eq!(outcome.pages.len(), 31);
    let peak = state.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {}", peak);
    assert!(peak > 1, "fetches never overlapped");
    assert!(outcome.statistics.peak_concurrent_fetches <= 3);
    assert_eq!(state.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_permit_serializes_fetches() {
    let state = wide_site(8);

    let outcome = in_memory_crawler(&state, 1, 100).run().await.unwrap();

    assert_eq!(outcome.pages.len(), 9);
    assert_eq!(state.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_page_limit_is_exact_under_concurrency() {
    let state = wide_site(40);

    let outcome = in_memory_crawler(&state, 8, 5).run().await.unwrap();

    assert_eq!(outcome.pages.len(), 5);
    assert_eq!(outcome.statistics.pages_recorded, 5);
    assert!(outcome.pages.contains_key("site.test"));
}

#[tokio::test]
async fn test_no_address_fetched_twice() {
    let state = wide_site(20);

    in_memory_crawler(&state, 5, 100).run().await.unwrap();

    let mut fetched = state.fetched.lock().unwrap().clone();
    let total = fetched.len();
    fetched.sort();
    fetched.dedup();
    assert_eq!(fetched.len(), total);
    assert_eq!(total, 21);
}

#[tokio::test]
async fn test_unreachable_link_does_not_affect_siblings() {
    let state = wide_site_with_unreachable(6, &["/p2"]);

    let outcome = in_memory_crawler(&state, 3, 100).run().await.unwrap();

    assert_eq!(outcome.pages.len(), 6);
    assert!(!outcome.pages.contains_key("site.test/p2"));
    for leaf in ["p0", "p1", "p3", "p4", "p5"] {
        assert!(outcome.pages.contains_key(&format!("site.test/{}", leaf)));
    }
    assert_eq!(outcome.statistics.count(PageOutcome::Unreachable), 1);

    // Reserved despite the failure, so it is never retried
    let fetched = state.fetched.lock().unwrap();
    assert_eq!(fetched.iter().filter(|p| p.as_str() == "/p2").count(), 1);
}
