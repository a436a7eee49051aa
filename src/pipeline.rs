//! Pipeline driver: extract → transform → load for one run.
//!
//! The HTTP client lives only for the extraction phase and is dropped before
//! the store is touched. The store sees a single append of an already
//! filtered batch, so a run that fails anywhere before that writes nothing.

use crate::config::{AppConfig, HttpConfig};
use crate::error::PipelineError;
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::loader::{DedupLoader, LoadReport};
use crate::registry::{RunSelection, TransformerKind};
use crate::sources::{self, ArticleSource, ExtractOptions};
use crate::store::{ArticleStore, TableRef};
use chrono::{Local, NaiveDate};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// Counts for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub source: String,
    /// Records produced by extraction, valid or not.
    pub extracted: usize,
    /// Records that survived the transformer.
    pub cleaned: usize,
    pub load: LoadReport,
}

impl From<&HttpConfig> for ExtractOptions {
    fn from(http: &HttpConfig) -> Self {
        Self {
            max_concurrency: http.max_concurrency,
            listing_retries: http.listing_retries,
            retry_base_delay: Duration::from_millis(http.retry_base_delay_ms),
        }
    }
}

/// Resolve the configured implementations and run once.
#[instrument(
    level = "info",
    skip_all,
    fields(
        source = selection.source.name(),
        destination = selection.destination.name()
    )
)]
pub async fn run(
    config: &AppConfig,
    selection: RunSelection,
) -> Result<RunReport, PipelineError> {
    let source = selection.source.build(config)?;
    let fetcher = HttpFetcher::new(&config.http)?;
    let store = selection.destination.open(&config.store).await?;
    let table = TableRef::new(&config.store.namespace, &config.store.table);
    let mut loader = DedupLoader::new(store, table);

    run_with(
        &source,
        fetcher,
        selection.transformer,
        &mut loader,
        &ExtractOptions::from(&config.http),
        Local::now().date_naive(),
    )
    .await
}

/// Run with explicit collaborators. `today` is the transform date.
///
/// `fetcher` is consumed and dropped as soon as extraction settles.
pub async fn run_with<S, F, St>(
    source: &S,
    fetcher: F,
    transformer: TransformerKind,
    loader: &mut DedupLoader<St>,
    options: &ExtractOptions,
    today: NaiveDate,
) -> Result<RunReport, PipelineError>
where
    S: ArticleSource,
    F: PageFetcher,
    St: ArticleStore,
{
    let start_time = Instant::now();

    let extracted = sources::extract(source, &fetcher, options).await;
    drop(fetcher);
    let records = extracted.map_err(|e| {
        error!(
            error = %e,
            listing = %source.listing_url(),
            "Listing fetch failed; aborting run"
        );
        PipelineError::Listing(e)
    })?;
    let extracted = records.len();

    let rows = transformer.transform(records, today);
    let cleaned = rows.len();

    let load = loader.load(rows).await.map_err(|e| {
        error!(error = %e, "Load failed; nothing was retried");
        PipelineError::from(e)
    })?;

    let elapsed = start_time.elapsed();
    info!(
        extracted,
        cleaned,
        existing = load.existing_keys,
        skipped = load.skipped_existing,
        appended = load.appended,
        ?elapsed,
        "Run complete"
    );

    Ok(RunReport {
        source: source.name().to_string(),
        extracted,
        cleaned,
        load,
    })
}
