//! # NewsFlow
//!
//! Ingests the Hacker News front page, extracts article records, cleans and
//! validates them, and stores only the ones never seen before in SQLite.
//!
//! ## Usage
//!
//! ```sh
//! newsflow
//! newsflow --db-path /tmp/news.db --show 5
//! ```
//!
//! ## Architecture
//!
//! The run is a single pipeline:
//! 1. **Schema**: make sure the `articles` table exists (fatal if it cannot)
//! 2. **Fetching**: one GET of the listing page with a browser user agent
//! 3. **Extraction**: listing rows become raw records, malformed rows are skipped
//! 4. **Processing**: validate, clean, insert; the url uniqueness constraint
//!    decides new versus duplicate
//! 5. **Report**: new/duplicate/invalid counts on standard output

use clap::Parser;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use newsflow::cli::Cli;
use newsflow::config::PipelineConfig;
use newsflow::fetch::HttpFetcher;
use newsflow::pipeline::{Pipeline, RunReport};
use newsflow::store::UNKNOWN_SOURCE;
use newsflow::utils::truncate_for_log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("Starting NewsFlow pipeline");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = PipelineConfig::resolve(&args)?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
    let pipeline = Pipeline::new(config, fetcher);
    info!(
        url = %pipeline.config().target_url,
        db_path = %pipeline.config().db_path.display(),
        concurrency = pipeline.config().concurrency,
        "Resolved run target"
    );

    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(
                db_path = %pipeline.store().db_path().display(),
                error = %e,
                "Storage could not be initialized; nothing was fetched"
            );
            return Err(e.into());
        }
    };

    match &report {
        RunReport::NoData => println!("⚠️ No articles were found"),
        RunReport::Completed { summary, outcomes } => {
            info!(count = outcomes.len(), "Processed articles");
            println!("\n{summary}");
            if args.json {
                println!("{}", serde_json::to_string(summary)?);
            }
        }
    }

    match pipeline.store().count().await {
        Ok(total) => info!(total, "Articles in store"),
        Err(e) => warn!(error = %e, "Could not count stored articles"),
    }

    if let Some(limit) = args.show {
        match pipeline.store().recent(limit).await {
            Ok(articles) => {
                for (i, article) in articles.iter().enumerate() {
                    println!(
                        "{}. [{}] {}",
                        i + 1,
                        article.source.as_deref().unwrap_or(UNKNOWN_SOURCE),
                        truncate_for_log(&article.title, 80)
                    );
                }
            }
            Err(e) => warn!(error = %e, "Could not read back stored articles"),
        }
    }

    pipeline.store().close().await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
