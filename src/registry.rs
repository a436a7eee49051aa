//! Name → implementation lookup for sources, transformers and destinations.
//!
//! Each registry is a closed enum. Adding a source means adding a variant and
//! its defaults here; the pipeline never changes.

use crate::config::{AppConfig, RunConfig, StoreConfig};
use crate::error::{ConfigError, StoreError};
use crate::models::{ArticleRecord, ArticleRow};
use crate::sources::{SchemaScraper, the_guardian};
use crate::store::AnyStore;
use crate::store::jsonl::JsonLinesStore;
use crate::store::memory::MemoryStore;
use crate::transformer;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TheGuardian,
}

impl SourceKind {
    pub const ALL: &'static [SourceKind] = &[SourceKind::TheGuardian];

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::TheGuardian => the_guardian::NAME,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ConfigError::UnknownSource(name.to_string()))
    }

    /// Build the scraper, applying any per-source overrides from `config`.
    pub fn build(self, config: &AppConfig) -> Result<SchemaScraper, ConfigError> {
        let (default_url, default_schema) = match self {
            SourceKind::TheGuardian => (the_guardian::LISTING_URL, the_guardian::schema()),
        };
        let overrides = config.source_override(self.name());
        let listing_url = overrides
            .and_then(|o| o.listing_url.as_deref())
            .unwrap_or(default_url);
        let schema = overrides
            .and_then(|o| o.schema.clone())
            .unwrap_or(default_schema);
        SchemaScraper::new(self.name(), listing_url, &schema)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformerKind {
    TheGuardian,
}

impl TransformerKind {
    pub const ALL: &'static [TransformerKind] = &[TransformerKind::TheGuardian];

    pub fn name(self) -> &'static str {
        match self {
            TransformerKind::TheGuardian => the_guardian::NAME,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ConfigError::UnknownTransformer(name.to_string()))
    }

    pub fn transform(self, records: Vec<ArticleRecord>, today: NaiveDate) -> Vec<ArticleRow> {
        match self {
            TransformerKind::TheGuardian => transformer::transform_at(records, today),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// Persistent JSON-lines tables under `store.data_dir`.
    JsonLines,
    /// Process-local; nothing is persisted.
    Memory,
}

impl DestinationKind {
    pub const ALL: &'static [DestinationKind] =
        &[DestinationKind::JsonLines, DestinationKind::Memory];

    pub fn name(self) -> &'static str {
        match self {
            DestinationKind::JsonLines => "jsonl",
            DestinationKind::Memory => "memory",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ConfigError::UnknownDestination(name.to_string()))
    }

    pub async fn open(self, config: &StoreConfig) -> Result<AnyStore, StoreError> {
        Ok(match self {
            DestinationKind::JsonLines => {
                AnyStore::JsonLines(JsonLinesStore::open(&config.data_dir).await?)
            }
            DestinationKind::Memory => AnyStore::Memory(MemoryStore::new()),
        })
    }
}

/// The resolved implementations for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSelection {
    pub source: SourceKind,
    pub transformer: TransformerKind,
    pub destination: DestinationKind,
}

impl RunSelection {
    pub fn resolve(run: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source: SourceKind::from_name(&run.source)?,
            transformer: TransformerKind::from_name(&run.transformer)?,
            destination: DestinationKind::from_name(&run.destination)?,
        })
    }
}
