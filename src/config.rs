//! Run configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line flags. The resulting [`PipelineConfig`] is handed to the
//! pipeline explicitly so tests can point it at their own target and store.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::fetch::{BROWSER_USER_AGENT, DEFAULT_TIMEOUT};
use crate::scrapers::hackernews;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_TARGET_URL: &str = "https://news.ycombinator.com/";
pub const DEFAULT_DB_PATH: &str = "data/news.db";

/// Everything a run needs to know.
///
/// A YAML file may set any subset of the fields:
///
/// ```yaml
/// target_url: https://news.ycombinator.com/
/// db_path: /var/lib/newsflow/news.db
/// timeout_secs: 5
/// concurrency: 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_url: String,
    pub db_path: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Records processed at once; 1 is fully sequential.
    pub concurrency: usize,
    pub default_source: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            concurrency: 1,
            default_source: hackernews::DEFAULT_SOURCE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config file; keys it leaves out keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parse config YAML. Blank input yields [`PipelineConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error for malformed YAML or mistyped values.
    /// Values are not validated here; [`resolve`](Self::resolve) does that.
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Build the effective configuration for a CLI invocation.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Read`] / [`ConfigError::Parse`] for a bad `--config` file
    /// - [`ConfigError::TargetUrl`] if the target is not an absolute URL
    /// - [`ConfigError::ZeroTimeout`] if the fetch timeout is zero seconds
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_yaml_file(Path::new(path))?,
            None => Self::default(),
        };
        let config = base.with_overrides(cli);
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.url {
            self.target_url = url.clone();
        }
        if let Some(db_path) = &cli.db_path {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(timeout_secs) = cli.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        self.concurrency = self.concurrency.max(1);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.target_url).map_err(|source| ConfigError::TargetUrl {
            url: self.target_url.clone(),
            source,
        })?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
