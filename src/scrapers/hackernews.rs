//! Hacker News front page extractor.
//!
//! Each story on the listing is a `<tr class="athing">` row. Its title line
//! (`span.titleline`) holds the story anchor and, for off-site links, a
//! `span.sitestr` with the domain. The row that follows is the subtext row,
//! whose `span.age` carries the submission time in its `title` attribute.
//!
//! ```text
//! <tr class="athing" id="1">
//!   <td class="title"><span class="titleline">
//!     <a href="https://example.com/post">Story title</a>
//!     <span class="sitebit comhead">(<a href="from?site=example.com"><span class="sitestr">example.com</span></a>)</span>
//!   </span></td>
//! </tr>
//! <tr><td class="subtext"><span class="age" title="2024-05-01T12:00:00 1714564800">3 hours ago</span></td></tr>
//! ```

use crate::error::ExtractionGap;
use crate::models::RawRecord;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Source recorded when a row carries no site domain (Ask HN, Show HN, ...).
pub const DEFAULT_SOURCE: &str = "Hacker News";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr.athing").unwrap());
static TITLE_LINE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.titleline").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SITE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.sitestr").unwrap());
static AGE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.age").unwrap());

/// Parse every listing row, keeping the reason for each row that was skipped.
///
/// Results are in document order, one per `tr.athing` row.
pub fn scan_rows(markup: &str, default_source: &str) -> Vec<Result<RawRecord, ExtractionGap>> {
    if markup.trim().is_empty() {
        return Vec::new();
    }
    let document = Html::parse_document(markup);
    document
        .select(&ROW)
        .map(|row| parse_row(row, default_source))
        .collect()
}

/// Extract the article records from a listing page.
///
/// Malformed rows are dropped; empty input yields an empty vector.
#[instrument(level = "info", skip_all, fields(bytes = markup.len()))]
pub fn extract(markup: &str, default_source: &str) -> Vec<RawRecord> {
    let rows = scan_rows(markup, default_source);
    let total = rows.len();
    let records: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|row| match row {
            Ok(record) => Some(record),
            Err(gap) => {
                debug!(reason = %gap, "Skipping malformed row");
                None
            }
        })
        .collect();

    debug!(rows = total, kept = records.len(), "Extracted listing rows");
    records
}

fn parse_row(row: ElementRef<'_>, default_source: &str) -> Result<RawRecord, ExtractionGap> {
    let title_line = row
        .select(&TITLE_LINE)
        .next()
        .ok_or(ExtractionGap::MissingTitleLine)?;
    let anchor = title_line
        .select(&ANCHOR)
        .next()
        .ok_or(ExtractionGap::MissingAnchor)?;
    let url = anchor
        .value()
        .attr("href")
        .ok_or(ExtractionGap::MissingHref)?;

    let source = row
        .select(&SITE)
        .next()
        .map(|site| site.text().collect::<String>())
        .unwrap_or_else(|| default_source.to_string());

    Ok(RawRecord {
        title: Some(anchor.text().collect()),
        url: Some(url.to_string()),
        source: Some(source),
        published_date: subtext_row(row).and_then(published_date),
    })
}

/// The element right after a story row, unless it is the next story.
fn subtext_row(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|next| !next.value().classes().any(|class| class == "athing"))
}

/// `title="2024-05-01T12:00:00 1714564800"` -> `2024-05-01T12:00:00`
fn published_date(subtext: ElementRef<'_>) -> Option<String> {
    subtext
        .select(&AGE)
        .next()?
        .value()
        .attr("title")?
        .split_whitespace()
        .next()
        .map(str::to_string)
}
