//! Durable, deduplicated article storage on SQLite.
//!
//! The `UNIQUE` constraint on `articles.url` is the only deduplication
//! mechanism: callers never check for existence first, they insert and read
//! the outcome. Every insert checks out its own pooled connection and runs in
//! autocommit mode, so no transaction spans two records and a fault on one
//! record cannot undo another.

use crate::error::StoreError;
use crate::models::{Article, InsertOutcome};
use crate::utils::{ensure_parent_dir, truncate_for_log};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Stored in `source` when the caller has none.
pub const UNKNOWN_SOURCE: &str = "unknown";

const CREATE_ARTICLES: &str = r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        source TEXT DEFAULT 'unknown',
        published_date TEXT,
        scraped_at TEXT
    )
"#;

const INSERT_ARTICLE: &str = r#"
    INSERT INTO articles (title, url, source, published_date, scraped_at)
    VALUES (?, ?, ?, ?, ?)
"#;

const SELECT_COLUMNS: &str = "SELECT id, title, url, source, published_date, scraped_at FROM articles";

/// Handle on the SQLite database holding the `articles` table.
///
/// Cheap to share by reference: the inner pool hands out one connection per
/// call and takes it back when the call ends.
pub struct Store {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl Store {
    /// Build a store for the database at `db_path`.
    ///
    /// The pool is lazy: nothing touches the filesystem until
    /// [`ensure_schema`](Self::ensure_schema) or the first query.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy_with(options);

        Self { pool, db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Create the data directory and the `articles` table if absent.
    ///
    /// Safe to call on every run.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DataDir`] if the parent directory of the database file
    ///   cannot be created
    /// - [`StoreError::Schema`] if the database cannot be opened or the table
    ///   cannot be created
    #[instrument(level = "info", skip_all, fields(db_path = %self.db_path.display()))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        ensure_parent_dir(&self.db_path)
            .await
            .map_err(|source| StoreError::DataDir {
                path: self.db_path.display().to_string(),
                source,
            })?;

        sqlx::query(CREATE_ARTICLES)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Schema)?;

        info!(path = %self.db_path.display(), "Database initialized");
        Ok(())
    }

    /// Attempt to record a new article.
    ///
    /// A uniqueness conflict on `url` is an expected outcome and comes back as
    /// [`InsertOutcome::DuplicateSkipped`]; any other storage error is a
    /// [`StoreError::Persistence`] for this record only.
    ///
    /// # Arguments
    ///
    /// * `title` - Cleaned headline, must be non-empty
    /// * `url` - Article link, must be non-empty; it is the uniqueness key
    /// * `source` - Site domain; `None` or empty is stored as [`UNKNOWN_SOURCE`]
    /// * `published_date` - Timestamp advertised by the listing, if any
    ///
    /// # Returns
    ///
    /// [`InsertOutcome::Inserted`] when a row was created, otherwise
    /// [`InsertOutcome::DuplicateSkipped`]. `scraped_at` is set to the
    /// instant of the attempt.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidInput`] if `title` or `url` is empty
    /// - [`StoreError::Persistence`] for any storage failure other than a
    ///   uniqueness conflict
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn insert(
        &self,
        title: &str,
        url: &str,
        source: Option<&str>,
        published_date: Option<&str>,
    ) -> Result<InsertOutcome, StoreError> {
        if title.is_empty() {
            return Err(StoreError::InvalidInput("title"));
        }
        if url.is_empty() {
            return Err(StoreError::InvalidInput("url"));
        }
        let source = source.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_SOURCE);
        let scraped_at = Utc::now();

        // Returned to the pool on drop, whichever way this function exits.
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(INSERT_ARTICLE)
            .bind(title)
            .bind(url)
            .bind(source)
            .bind(published_date)
            .bind(scraped_at)
            .execute(&mut *conn)
            .await;

        match result {
            Ok(_) => {
                info!(title = %truncate_for_log(title, 30), "Saved");
                Ok(InsertOutcome::Inserted)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                info!(%url, "Duplicate found (skipped)");
                Ok(InsertOutcome::DuplicateSkipped)
            }
            Err(e) => Err(StoreError::Persistence(e)),
        }
    }

    /// Number of stored articles.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the table cannot be read.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Look up the article stored under `url`, if any.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the query fails.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>(&format!("{SELECT_COLUMNS} WHERE url = ?"))
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    /// Most recently recorded articles first.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of rows to return
    ///
    /// # Errors
    ///
    /// [`StoreError::Persistence`] if the query fails.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Article>, StoreError> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            "{SELECT_COLUMNS} ORDER BY scraped_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        debug!(count = articles.len(), limit, "Loaded recent articles");
        Ok(articles)
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
