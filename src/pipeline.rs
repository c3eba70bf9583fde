//! The ingestion run: fetch, extract, validate, clean, persist, report.
//!
//! A run moves through
//! `Init -> SchemaReady -> Fetching -> (NoData | Extracted) -> Processing -> Reported`.
//! Only a storage initialization failure ends it with an error. A failed
//! fetch or an empty page ends it early with [`RunReport::NoData`], and
//! every extracted record gets exactly one [`RecordOutcome`].
//!
//! Records are processed through a `futures` stream. With a concurrency of 1
//! this is the plain sequential loop; higher values overlap store calls, which
//! is safe because each insert is independent and the store's uniqueness
//! constraint settles races on the same url. Outcomes always come back in
//! document order.

use crate::config::PipelineConfig;
use crate::error::{StoreError, ValidationFailure};
use crate::fetch::FetchHtml;
use crate::models::{InsertOutcome, PipelineSummary, RawRecord, RecordOutcome};
use crate::normalize::{check, clean_text};
use crate::scrapers::hackernews;
use crate::store::Store;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    SchemaReady,
    Fetching,
    NoData,
    Extracted,
    Processing,
    Reported,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// The fetch failed or the page held no articles.
    NoData,
    /// `outcomes[i]` belongs to the i-th extracted record.
    Completed {
        summary: PipelineSummary,
        outcomes: Vec<RecordOutcome>,
    },
}

pub struct Pipeline<F> {
    config: PipelineConfig,
    fetcher: F,
    store: Store,
}

impl<F: FetchHtml> Pipeline<F> {
    pub fn new(config: PipelineConfig, fetcher: F) -> Self {
        let store = Store::new(config.db_path.clone());
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    #[instrument(level = "info", skip_all, fields(url = %self.config.target_url))]
    pub async fn run(&self) -> Result<RunReport, StoreError> {
        let mut state = RunState::Init;

        self.store.ensure_schema().await?;
        advance(&mut state, RunState::SchemaReady);

        advance(&mut state, RunState::Fetching);
        info!(url = %self.config.target_url, "Fetching news");
        let Some(markup) = self.fetcher.fetch_html(&self.config.target_url).await else {
            warn!("Failed to retrieve data");
            advance(&mut state, RunState::NoData);
            return Ok(RunReport::NoData);
        };

        let records = hackernews::extract(&markup, &self.config.default_source);
        if records.is_empty() {
            warn!("Listing page held no articles");
            advance(&mut state, RunState::NoData);
            return Ok(RunReport::NoData);
        }
        info!(count = records.len(), "Successfully scraped articles");
        advance(&mut state, RunState::Extracted);

        advance(&mut state, RunState::Processing);
        info!(
            count = records.len(),
            concurrency = self.config.concurrency,
            "Processing articles"
        );
        let outcomes: Vec<RecordOutcome> = stream::iter(records.iter())
            .map(|record| self.process_record(record))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let summary: PipelineSummary = outcomes.iter().collect();
        advance(&mut state, RunState::Reported);
        info!(
            new = summary.new,
            duplicate = summary.duplicate,
            invalid = summary.invalid,
            failed = summary.failed,
            "Pipeline finished"
        );

        Ok(RunReport::Completed { summary, outcomes })
    }

    /// Validate, clean, and store one record.
    ///
    /// The url is stored exactly as extracted; only title and source are
    /// cleaned.
    pub async fn process_record(&self, record: &RawRecord) -> RecordOutcome {
        if let Err(reason) = check(record) {
            debug!(%reason, url = ?record.url, "Invalid record");
            return RecordOutcome::Invalid(reason);
        }
        let Some(title) = record.title.as_deref().and_then(clean_text) else {
            return RecordOutcome::Invalid(ValidationFailure::BlankTitle);
        };
        let url = record.url.as_deref().unwrap_or_default();
        let source = record.source.as_deref().and_then(clean_text);

        match self
            .store
            .insert(
                &title,
                url,
                source.as_deref(),
                record.published_date.as_deref(),
            )
            .await
        {
            Ok(InsertOutcome::Inserted) => RecordOutcome::Added,
            Ok(InsertOutcome::DuplicateSkipped) => RecordOutcome::Duplicate,
            Err(e) => {
                error!(%url, error = %e, "Failed to persist article");
                RecordOutcome::Failed(e.to_string())
            }
        }
    }
}

fn advance(state: &mut RunState, next: RunState) {
    let from = *state;
    debug!(?from, to = ?next, "Pipeline state");
    *state = next;
}
