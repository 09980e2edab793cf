//! CSV report of recorded pages
//!
//! One row per page, sorted by normalized address so reports of the same
//! crawl are comparable line by line.

use crate::crawler::PageRecord;
use crate::Result;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Column names of the report
pub const CSV_HEADERS: [&str; 5] = [
    "page_url",
    "h1",
    "first_paragraph",
    "outgoing_link_urls",
    "image_urls",
];

/// Separator used inside the list columns
const LIST_SEPARATOR: &str = ";";

/// Writes the report to a file, replacing any existing one
pub fn write_csv_report(
    pages: &HashMap<String, PageRecord>,
    path: &Path,
) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_rows(writer, pages)
}

/// Writes the report to any writer
pub fn write_csv<W: Write>(pages: &HashMap<String, PageRecord>, out: W) -> Result<()> {
    write_rows(csv::Writer::from_writer(out), pages)
}

fn write_rows<W: Write>(
    mut writer: csv::Writer<W>,
    pages: &HashMap<String, PageRecord>,
) -> Result<()> {
    writer.write_record(CSV_HEADERS)?;

    let mut keys: Vec<&String> = pages.keys().collect();
    keys.sort();

    for key in keys {
        let page = &pages[key];
        let outgoing_links = page.outgoing_links.join(LIST_SEPARATOR);
        let image_urls = page.image_urls.join(LIST_SEPARATOR);
        writer.write_record([
            page.url.as_str(),
            page.title.as_str(),
            page.first_paragraph.as_str(),
            outgoing_links.as_str(),
            image_urls.as_str(),
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
