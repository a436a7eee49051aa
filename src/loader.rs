//! Dedup-aware, append-only loading.
//!
//! A load walks these stages in order:
//!
//! ```text
//! Idle → EnsureDestination → FetchExistingKeys → FilterNew → Append → Done
//! ```
//!
//! An empty batch goes straight to `Done` without touching the store, and a
//! batch whose every URL is already stored stops before `Append`.
//!
//! The existing-key set is a snapshot taken once per load. The three store
//! calls are not transactional, so a concurrent run that appends the same URL
//! after the snapshot can produce a duplicate; nothing here deletes or
//! rewrites stored rows.

use crate::error::StoreError;
use crate::models::ArticleRow;
use crate::store::{ArticleStore, TableRef, TableSchema};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// Column holding the dedup key.
pub const KEY_COLUMN: &str = "article_url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Idle,
    EnsureDestination,
    FetchExistingKeys,
    FilterNew,
    Append,
    Done,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Idle => "idle",
            LoadStage::EnsureDestination => "ensure_destination",
            LoadStage::FetchExistingKeys => "fetch_existing_keys",
            LoadStage::FilterNew => "filter_new",
            LoadStage::Append => "append",
            LoadStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows handed to the loader.
    pub incoming: usize,
    /// Size of the existing-key snapshot.
    pub existing_keys: usize,
    /// Incoming rows whose URL was already stored.
    pub skipped_existing: usize,
    pub appended: usize,
    /// Whether this load created the destination table.
    pub created_table: bool,
}

pub struct DedupLoader<S> {
    store: S,
    table: TableRef,
    stage: LoadStage,
}

impl<S: ArticleStore> DedupLoader<S> {
    /// Create an idle loader for `table` in `store`.
    ///
    /// Nothing touches the store until [`DedupLoader::load`] is called.
    pub fn new(store: S, table: TableRef) -> Self {
        Self {
            store,
            table,
            stage: LoadStage::Idle,
        }
    }

    pub fn stage(&self) -> LoadStage {
        self.stage
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn advance(&mut self, next: LoadStage) {
        debug!(table = %self.table, from = %self.stage, to = %next, "Load stage");
        self.stage = next;
    }

    /// Append every row whose `article_url` is not already stored.
    ///
    /// On error the stage is left where the failure happened and nothing
    /// further is written.
    #[instrument(level = "info", skip_all, fields(table = %self.table, incoming = rows.len()))]
    pub async fn load(&mut self, rows: Vec<ArticleRow>) -> Result<LoadReport, StoreError> {
        self.stage = LoadStage::Idle;
        let mut report = LoadReport {
            incoming: rows.len(),
            ..LoadReport::default()
        };

        if rows.is_empty() {
            info!("No rows to load");
            self.advance(LoadStage::Done);
            return Ok(report);
        }

        self.advance(LoadStage::EnsureDestination);
        if !self.store.table_exists(&self.table).await? {
            self.store.create_table(&self.table, &TableSchema::articles()).await?;
            report.created_table = true;
        }

        self.advance(LoadStage::FetchExistingKeys);
        let existing = self.store.query_column(&self.table, KEY_COLUMN).await?;
        report.existing_keys = existing.len();
        info!(count = existing.len(), "Existing articles in store");

        self.advance(LoadStage::FilterNew);
        let new_rows = filter_new(rows, &existing);
        report.skipped_existing = report.incoming - new_rows.len();

        if new_rows.is_empty() {
            info!("No new articles to append");
            self.advance(LoadStage::Done);
            return Ok(report);
        }

        self.advance(LoadStage::Append);
        info!(count = new_rows.len(), "New articles to append");
        self.store.append_rows(&self.table, &new_rows).await?;
        report.appended = new_rows.len();

        self.advance(LoadStage::Done);
        info!(appended = report.appended, "Append complete");
        Ok(report)
    }
}

/// Keep rows whose key is absent from `existing`, preserving order.
///
/// # Arguments
///
/// * `rows` - Cleaned batch from the transformer
/// * `existing` - `article_url` values already in the destination table
///
/// # Returns
///
/// The rows to append. Together with the rows dropped here they make up
/// exactly the input batch.
pub fn filter_new(rows: Vec<ArticleRow>, existing: &HashSet<String>) -> Vec<ArticleRow> {
    rows.into_iter()
        .filter(|row| !existing.contains(&row.article_url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::NaiveDate;

    fn row(url: &str) -> ArticleRow {
        ArticleRow {
            title: "Title".to_string(),
            content: "Body".to_string(),
            author: "Ann".to_string(),
            article_url: url.to_string(),
            article_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            section: "world".to_string(),
        }
    }

    fn table() -> TableRef {
        TableRef::new("scraping_results", "articles")
    }

    #[tokio::test]
    async fn test_creates_table_on_first_load() {
        let mut loader = DedupLoader::new(MemoryStore::new(), table());
        let report = loader.load(vec![row("https://example.com/a")]).await.unwrap();

        assert!(report.created_table);
        assert_eq!(report.appended, 1);
        assert_eq!(loader.stage(), LoadStage::Done);
        assert!(loader.store().table_exists(&table()).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_new_urls_are_appended() {
        let store = MemoryStore::new();
        store.create_table(&table(), &TableSchema::articles()).await.unwrap();
        store.append_rows(&table(), &[row("https://example.com/a")]).await.unwrap();

        let mut loader = DedupLoader::new(store, table());
        let report = loader
            .load(vec![row("https://example.com/a"), row("https://example.com/b")])
            .await
            .unwrap();

        assert_eq!(report.appended, 1);
        assert_eq!(report.skipped_existing, 1);
        assert_eq!(report.appended + report.skipped_existing, report.incoming);
        let urls: Vec<_> = loader
            .store()
            .scan_rows(&table())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.article_url)
            .collect();
        assert_eq!(urls, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[tokio::test]
    async fn test_empty_batch_touches_nothing() {
        let mut loader = DedupLoader::new(MemoryStore::new(), table());
        let report = loader.load(Vec::new()).await.unwrap();

        assert_eq!(report, LoadReport::default());
        assert_eq!(loader.store().append_calls(), 0);
        assert!(!loader.store().table_exists(&table()).await.unwrap());
        assert_eq!(loader.stage(), LoadStage::Done);
    }

    #[tokio::test]
    async fn test_all_existing_skips_append() {
        let store = MemoryStore::new();
        store.create_table(&table(), &TableSchema::articles()).await.unwrap();
        store.append_rows(&table(), &[row("https://example.com/a")]).await.unwrap();

        let mut loader = DedupLoader::new(store, table());
        let report = loader.load(vec![row("https://example.com/a")]).await.unwrap();

        assert_eq!(report.appended, 0);
        assert_eq!(loader.store().append_calls(), 1);
        assert_eq!(loader.stage(), LoadStage::Done);
    }

    #[tokio::test]
    async fn test_second_load_is_idempotent() {
        let mut loader = DedupLoader::new(MemoryStore::new(), table());
        let batch = vec![row("https://example.com/a"), row("https://example.com/b")];

        assert_eq!(loader.load(batch.clone()).await.unwrap().appended, 2);
        assert_eq!(loader.load(batch).await.unwrap().appended, 0);
        assert_eq!(loader.store().scan_rows(&table()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_stops_before_append() {
        let store = MemoryStore::new();
        let mut schema = TableSchema::articles();
        schema.columns.retain(|c| c.name != KEY_COLUMN);
        store.create_table(&table(), &schema).await.unwrap();

        let mut loader = DedupLoader::new(store, table());
        let err = loader.load(vec![row("https://example.com/a")]).await.unwrap_err();

        assert!(matches!(err, StoreError::SchemaMismatch { .. }));
        assert_eq!(loader.stage(), LoadStage::FetchExistingKeys);
        assert_eq!(loader.store().append_calls(), 0);
    }

    #[test]
    fn test_filter_new_partition_property() {
        let existing: HashSet<String> = ["https://example.com/a", "https://example.com/c"]
            .into_iter()
            .map(String::from)
            .collect();
        let batch: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|s| row(&format!("https://example.com/{s}")))
            .collect();
        let in_existing = batch.iter().filter(|r| existing.contains(&r.article_url)).count();

        let kept = filter_new(batch.clone(), &existing);
        assert_eq!(kept.len() + in_existing, batch.len());
        assert!(kept.iter().all(|r| !existing.contains(&r.article_url)));
    }
}
