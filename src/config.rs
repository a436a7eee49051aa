//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a run with no config file scrapes The
//! Guardian into `./data/scraping_results/raw_the_guardian_news`.
//!
//! ```yaml
//! http:
//!   timeout_secs: 20
//!   max_concurrency: 4
//! store:
//!   data_dir: /var/lib/news_ingest
//! run:
//!   destination: memory
//! sources:
//!   the_guardian:
//!     listing_url: https://www.theguardian.com/uk
//! ```

use crate::error::ConfigError;
use crate::sources::ExtractionSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub store: StoreConfig,
    pub run: RunConfig,
    /// Per-source overrides keyed by registry name.
    pub sources: BTreeMap<String, SourceOverride>,
}

/// Settings for the page fetcher and the detail fan-out.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Ceiling on concurrent detail-page fetches.
    pub max_concurrency: usize,
    pub user_agent: String,
    /// Extra attempts for the listing page only.
    pub listing_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrency: 8,
            user_agent: concat!("news_ingest/", env!("CARGO_PKG_VERSION")).to_string(),
            listing_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

/// Where the destination table lives.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: String,
    pub namespace: String,
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            namespace: "scraping_results".to_string(),
            table: "raw_the_guardian_news".to_string(),
        }
    }
}

/// Registry names selecting the source, transformer and destination for a run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub source: String,
    pub transformer: String,
    pub destination: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: "the_guardian".to_string(),
            transformer: "the_guardian".to_string(),
            destination: "jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceOverride {
    pub listing_url: Option<String>,
    pub schema: Option<ExtractionSchema>,
}

impl AppConfig {
    /// Parse a YAML document. Missing sections fall back to defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&yaml)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn source_override(&self, name: &str) -> Option<&SourceOverride> {
        self.sources.get(name)
    }
}
