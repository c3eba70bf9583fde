//! Listing-page extractors.
//!
//! An extractor turns fetched markup into [`RawRecord`](crate::models::RawRecord)s
//! in document order. Rows that lack the expected structure are skipped and
//! never abort the rest of the page.
//!
//! | Source | Module | Row marker |
//! |--------|--------|------------|
//! | Hacker News | [`hackernews`] | `tr.athing` |

pub mod hackernews;
