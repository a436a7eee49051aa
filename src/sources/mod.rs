//! Article sources and the two-phase extraction run.
//!
//! Every source follows the same protocol:
//!
//! 1. **Listing**: fetch the configured listing page and parse it into
//!    [`ArticleStub`]s (section, absolute URL, publish date)
//! 2. **Detail**: fetch every stub's article page concurrently and parse it into
//!    an [`ArticleDetail`]
//!
//! A failed listing fetch fails the run. A failed detail fetch only degrades
//! that one article to an all-null detail; the transformer drops it later.
//!
//! # Supported Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | The Guardian | [`the_guardian`] | Front page sections, `dcr-*` article markup |

pub mod schema;
pub mod schema_scraper;
pub mod the_guardian;

pub use schema::ExtractionSchema;
pub use schema_scraper::SchemaScraper;

use crate::error::FetchError;
use crate::fetcher::PageFetcher;
use crate::models::{ArticleDetail, ArticleRecord, ArticleStub};
use crate::retry::RetryFetch;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Extraction contract every source satisfies.
pub trait ArticleSource {
    /// Registry name, used in logs.
    fn name(&self) -> &str;

    fn listing_url(&self) -> &Url;

    /// Parse listing HTML into stubs, in page order.
    fn parse_listing(&self, html: &str) -> Vec<ArticleStub>;

    /// Parse an article page. Missing markup yields absent fields, never an error.
    fn parse_detail(&self, html: &str) -> ArticleDetail;

    async fn fetch_listing<F: PageFetcher>(&self, fetcher: &F) -> Result<String, FetchError> {
        fetcher.fetch(self.listing_url().as_str()).await
    }

    /// Fetch and parse one article page.
    ///
    /// Stubs without a URL short-circuit without a network call; fetch
    /// failures are logged and become [`ArticleDetail::empty`].
    async fn fetch_and_parse_detail<F: PageFetcher>(
        &self,
        fetcher: &F,
        stub: &ArticleStub,
    ) -> ArticleDetail {
        let Some(url) = stub.article_url.as_deref() else {
            debug!(section = %stub.section, "Stub has no URL; skipping detail fetch");
            return ArticleDetail::empty();
        };

        match fetcher.fetch(url).await {
            Ok(html) => self.parse_detail(&html),
            Err(e) => {
                warn!(%url, error = %e, source = self.name(), "Detail fetch failed");
                ArticleDetail::empty()
            }
        }
    }
}

/// Tuning for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Ceiling on in-flight detail fetches.
    pub max_concurrency: usize,
    /// Extra attempts for the listing fetch.
    pub listing_retries: usize,
    pub retry_base_delay: Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            listing_retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Run both phases and merge each stub with its detail.
///
/// The result has one record per stub, in listing order, including records
/// that will fail validation. Detail fetches run at most
/// `options.max_concurrency` at a time and all of them settle before merging.
#[instrument(level = "info", skip_all, fields(source = source.name()))]
pub async fn extract<S, F>(
    source: &S,
    fetcher: &F,
    options: &ExtractOptions,
) -> Result<Vec<ArticleRecord>, FetchError>
where
    S: ArticleSource,
    F: PageFetcher,
{
    let listing_fetcher =
        RetryFetch::new(fetcher, options.listing_retries, options.retry_base_delay);
    let html = source.fetch_listing(&listing_fetcher).await?;
    let stubs = source.parse_listing(&html);
    info!(
        count = stubs.len(),
        listing = %source.listing_url(),
        "Parsed listing page"
    );

    let details: Vec<ArticleDetail> = stream::iter(stubs.iter())
        .map(|stub| source.fetch_and_parse_detail(fetcher, stub))
        .buffered(options.max_concurrency.max(1))
        .collect()
        .await;

    let failed = details.iter().filter(|d| d.is_empty()).count();
    info!(
        total = details.len(),
        failed,
        "Fetched article details"
    );

    Ok(stubs
        .into_iter()
        .zip(details)
        .map(|(stub, detail)| ArticleRecord::merge(stub, detail))
        .collect())
}
