//! Error types for every stage of an ingestion run.
//!
//! Errors are split by concern so callers can decide what is fatal:
//! - [`FetchError`]: a single HTTP GET failed
//! - [`StoreError`]: the destination store rejected an operation
//! - [`ConfigError`]: configuration or registry lookup failed before any I/O
//! - [`PipelineError`]: a run-level failure reported by the driver

use thiserror::Error;

/// Failure of a single page fetch.
///
/// The fetcher never retries; each variant is terminal for that request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether a caller-side retry has any chance of succeeding.
    ///
    /// Client errors (4xx) will not change on a second attempt, except
    /// 408 Request Timeout and 429 Too Many Requests.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Network(_) => true,
            FetchError::HttpStatus(408 | 429) => true,
            FetchError::HttpStatus(code) => !(400..500).contains(code),
            FetchError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Failure reported by a destination store adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("schema mismatch for table {table}: {reason}")]
    SchemaMismatch { table: String, reason: String },

    #[error("table {0} does not exist")]
    MissingTable(String),
}

/// Configuration and registry errors, raised before the run touches the network.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid listing URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),

    #[error("no source registered under `{0}`")]
    UnknownSource(String),

    #[error("no transformer registered under `{0}`")]
    UnknownTransformer(String),

    #[error("no destination registered under `{0}`")]
    UnknownDestination(String),
}

/// Run-level failure. Any of these terminates the run without writing to the store.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("listing page fetch failed: {0}")]
    Listing(#[source] FetchError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("run cancelled")]
    Cancelled,
}
