//! Error taxonomy for the ingestion pipeline.
//!
//! Each failure class maps to one enum. Only [`StoreError::Schema`],
//! [`StoreError::DataDir`], and [`ConfigError`] are fatal for a run; the rest
//! are reported per record (or per fetch) and the pipeline keeps going.

use thiserror::Error;

/// A network-level failure while retrieving the listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response body was empty")]
    EmptyBody,
}

/// Why a listing row did not become a [`RawRecord`](crate::models::RawRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionGap {
    #[error("row has no title line")]
    MissingTitleLine,

    #[error("title line has no anchor")]
    MissingAnchor,

    #[error("title anchor has no href")]
    MissingHref,
}

/// Why a record was counted as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("title is missing or empty")]
    MissingTitle,

    #[error("url is missing or empty")]
    MissingUrl,

    #[error("url does not start with http")]
    NonHttpUrl,

    #[error("title is blank after cleaning")]
    BlankTitle,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("invalid insert: {0} must be non-empty")]
    InvalidInput(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid target url {url:?}: {source}")]
    TargetUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timeout_secs must be at least 1")]
    ZeroTimeout,
}
