//! HTML extraction for crawled pages
//!
//! This module turns page markup into a [`PageRecord`]:
//! - Title (text of the first `<h1>`)
//! - First paragraph (preferring the one inside `<main>`)
//! - Outgoing links from `<a href>` tags
//! - Image references from `<img src>` tags
//!
//! Links and images are resolved to absolute addresses against the page they
//! were found on.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Structured data extracted from one crawled page
///
/// Created once per successfully fetched page and never modified after it
/// is stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The address the page was fetched from
    pub url: String,

    /// Text of the first `<h1>`, empty if there is none
    pub title: String,

    /// Text of the first descriptive paragraph, empty if there is none
    pub first_paragraph: String,

    /// Absolute addresses of all `<a href>` targets, in document order
    pub outgoing_links: Vec<String>,

    /// Absolute addresses of all `<img src>` targets, in document order
    pub image_urls: Vec<String>,
}

/// Turns page markup into structured data
///
/// Implementations must be pure: the same markup and base always yield the
/// same output.
pub trait Extractor: Send + Sync {
    /// Builds the record for a page fetched from `source`
    fn extract(&self, html: &str, source: &Url) -> PageRecord;

    /// Returns the absolute link targets of the page, resolved against `base`
    fn links(&self, html: &str, base: &Url) -> Vec<String>;
}

/// Extractor backed by the `scraper` HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn extract(&self, html: &str, source: &Url) -> PageRecord {
        parse_html(html, source)
    }

    fn links(&self, html: &str, base: &Url) -> Vec<String> {
        extract_links(&Html::parse_document(html), base)
    }
}

/// Parses HTML content and extracts the page record
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` targets, resolved against `source`
/// - `<img src="...">` targets, resolved against `source`
/// - Any scheme, including `mailto:` and same-page anchors
///
/// **Exclude:**
/// - Empty references
/// - References that cannot be resolved (logged and dropped individually)
///
/// Which of the links are worth crawling is decided by the traversal.
///
/// # Example
///
/// ```
/// use site_ripple::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><h1>Test</h1><a href="/page">Link</a></body></html>"#;
/// let source = Url::parse("https://example.com/").unwrap();
/// let record = parse_html(html, &source);
/// assert_eq!(record.title, "Test");
/// assert_eq!(record.outgoing_links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, source: &Url) -> PageRecord {
    let document = Html::parse_document(html);

    PageRecord {
        url: source.to_string(),
        title: extract_title(&document),
        first_paragraph: extract_first_paragraph(&document),
        outgoing_links: extract_links(&document, source),
        image_urls: extract_images(&document, source),
    }
}

/// Extracts the text of the first `<h1>`
fn extract_title(document: &Html) -> String {
    let Some(h1_selector) = selector("h1") else {
        return String::new();
    };

    document
        .select(&h1_selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

/// Extracts the first paragraph, looking inside `<main>` when the page has one
///
/// A page with a `<main>` section but no paragraph inside it yields an empty
/// string even if paragraphs exist elsewhere.
fn extract_first_paragraph(document: &Html) -> String {
    let (Some(main_selector), Some(p_selector)) = (selector("main"), selector("p")) else {
        return String::new();
    };

    let first_p = match document.select(&main_selector).next() {
        Some(main) => main.select(&p_selector).next(),
        None => document.select(&p_selector).next(),
    };

    first_p.map(element_text).unwrap_or_default()
}

/// Extracts all valid link targets from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    collect_references(document, "a[href]", "href", base_url)
}

/// Extracts all valid image sources from the HTML document
fn extract_images(document: &Html, base_url: &Url) -> Vec<String> {
    collect_references(document, "img[src]", "src", base_url)
}

fn collect_references(document: &Html, css: &str, attribute: &str, base_url: &Url) -> Vec<String> {
    let Some(element_selector) = selector(css) else {
        return Vec::new();
    };

    document
        .select(&element_selector)
        .filter_map(|element| element.value().attr(attribute))
        .filter_map(|reference| resolve_link(reference, base_url))
        .collect()
}

/// Resolves a reference to an absolute URL
///
/// Returns None for empty references and for references that cannot be
/// joined onto the base (logged).
fn resolve_link(reference: &str, base_url: &Url) -> Option<String> {
    let reference = reference.trim();

    if reference.is_empty() {
        return None;
    }

    match base_url.join(reference) {
        Ok(absolute_url) => Some(absolute_url.to_string()),
        Err(e) => {
            tracing::warn!("{}: {}", e, reference);
            None
        }
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collects the text of an element and trims surrounding whitespace
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
