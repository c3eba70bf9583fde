//! Data models that flow through the ingestion pipeline.
//!
//! - [`RawRecord`]: an article candidate as read from the listing page
//! - [`Article`]: a persisted, deduplicated row of the `articles` table
//! - [`InsertOutcome`] and [`RecordOutcome`]: tagged per-record results
//! - [`PipelineSummary`]: the tally reported at the end of a run

use crate::error::ValidationFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An article candidate extracted from the listing markup.
///
/// Fields are optional because nothing has been validated yet; the extractor
/// fills `title` and `url` for every row it accepts, but records built by
/// other callers may be incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    /// Timestamp advertised by the listing, if any.
    pub published_date: Option<String>,
}

impl RawRecord {
    pub fn new(title: &str, url: &str, source: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            source: Some(source.to_string()),
            published_date: None,
        }
    }
}

/// A row of the `articles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published_date: Option<String>,
    /// Instant of the insert attempt that created the row.
    pub scraped_at: Option<DateTime<Utc>>,
}

/// Result of a store insert that did not hit a persistence fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateSkipped,
}

/// What happened to one [`RawRecord`] during processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Added,
    Duplicate,
    Invalid(ValidationFailure),
    Failed(String),
}

/// New/duplicate/invalid tally for one run.
///
/// `failed` counts persistence faults, so the four counters always add up to
/// the number of records the extractor produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub new: usize,
    pub duplicate: usize,
    pub invalid: usize,
    pub failed: usize,
}

impl PipelineSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Added => self.new += 1,
            RecordOutcome::Duplicate => self.duplicate += 1,
            RecordOutcome::Invalid(_) => self.invalid += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.duplicate + self.invalid + self.failed
    }
}

impl<'a> FromIterator<&'a RecordOutcome> for PipelineSummary {
    fn from_iter<I: IntoIterator<Item = &'a RecordOutcome>>(iter: I) -> Self {
        let mut summary = PipelineSummary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 --- PIPELINE SUMMARY ---")?;
        writeln!(f, "✅ Added:      {}", self.new)?;
        writeln!(f, "⚠️ Duplicates: {}", self.duplicate)?;
        writeln!(f, "❌ Invalid:    {}", self.invalid)?;
        if self.failed > 0 {
            writeln!(f, "💥 Failed:     {}", self.failed)?;
        }
        write!(f, "-------------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_new() {
        let record = RawRecord::new("Title", "http://example.com", "example.com");
        assert_eq!(record.title.as_deref(), Some("Title"));
        assert_eq!(record.url.as_deref(), Some("http://example.com"));
        assert_eq!(record.source.as_deref(), Some("example.com"));
        assert_eq!(record.published_date, None);
    }

    #[test]
    fn test_summary_counts_each_outcome_once() {
        let outcomes = vec![
            RecordOutcome::Added,
            RecordOutcome::Added,
            RecordOutcome::Duplicate,
            RecordOutcome::Invalid(ValidationFailure::NonHttpUrl),
            RecordOutcome::Failed("disk full".to_string()),
        ];
        let summary: PipelineSummary = outcomes.iter().collect();

        assert_eq!(summary.new, 2);
        assert_eq!(summary.duplicate, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), outcomes.len());
    }

    #[test]
    fn test_summary_display_is_three_lines_without_failures() {
        let summary = PipelineSummary {
            new: 3,
            duplicate: 2,
            invalid: 1,
            failed: 0,
        };
        let text = summary.to_string();

        assert!(text.contains("Added:      3"));
        assert!(text.contains("Duplicates: 2"));
        assert!(text.contains("Invalid:    1"));
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn test_summary_display_shows_failures() {
        let summary = PipelineSummary {
            failed: 4,
            ..Default::default()
        };
        assert!(summary.to_string().contains("Failed:     4"));
    }

    #[test]
    fn test_summary_serialization() {
        let summary = PipelineSummary {
            new: 1,
            duplicate: 0,
            invalid: 2,
            failed: 0,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: PipelineSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
        assert!(json.contains("\"new\":1"));
    }
}
