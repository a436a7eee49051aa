//! Process-local store. Nothing survives the process; used for dry runs and tests.

use super::{ArticleStore, TableRef, TableSchema, column_value};
use crate::error::StoreError;
use crate::models::ArticleRow;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    rows: Vec<ArticleRow>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<TableRef, MemoryTable>>,
    append_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `append_rows` calls made so far.
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    fn with_table<T>(
        &self,
        table: &TableRef,
        f: impl FnOnce(&mut MemoryTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::MissingTable(table.to_string()))?;
        f(entry)
    }
}

impl ArticleStore for MemoryStore {
    async fn table_exists(&self, table: &TableRef) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tables.contains_key(table))
    }

    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.entry(table.clone()).or_insert_with(|| MemoryTable {
            schema: schema.clone(),
            rows: Vec::new(),
        });
        Ok(())
    }

    async fn query_column(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<HashSet<String>, StoreError> {
        self.with_table(table, |t| {
            if !t.schema.has_column(column) {
                return Err(StoreError::SchemaMismatch {
                    table: table.to_string(),
                    reason: format!("no column `{column}`"),
                });
            }
            Ok(t.rows.iter().filter_map(|r| column_value(r, column)).collect())
        })
    }

    async fn append_rows(&self, table: &TableRef, rows: &[ArticleRow]) -> Result<(), StoreError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        self.with_table(table, |t| {
            if t.schema != TableSchema::articles() {
                return Err(StoreError::SchemaMismatch {
                    table: table.to_string(),
                    reason: "stored schema differs from the article schema".to_string(),
                });
            }
            t.rows.extend_from_slice(rows);
            Ok(())
        })
    }

    async fn scan_rows(&self, table: &TableRef) -> Result<Vec<ArticleRow>, StoreError> {
        self.with_table(table, |t| Ok(t.rows.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[tokio::test]
    async fn test_round_trip_and_call_count() {
        let store = MemoryStore::new();
        let table = TableRef::new("ns", "t");
        store.create_table(&table, &TableSchema::articles()).await.unwrap();
        store.append_rows(&table, &[row("https://example.com/a")]).await.unwrap();

        assert_eq!(store.append_calls(), 1);
        assert_eq!(store.scan_rows(&table).await.unwrap().len(), 1);
        assert!(
            store
                .query_column(&table, "article_url")
                .await
                .unwrap()
                .contains("https://example.com/a")
        );
    }

    #[tokio::test]
    async fn test_create_table_does_not_clear_rows() {
        let store = MemoryStore::new();
        let table = TableRef::new("ns", "t");
        store.create_table(&table, &TableSchema::articles()).await.unwrap();
        store.append_rows(&table, &[row("https://example.com/a")]).await.unwrap();
        store.create_table(&table, &TableSchema::articles()).await.unwrap();

        assert_eq!(store.scan_rows(&table).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let store = MemoryStore::new();
        let err = store
            .query_column(&TableRef::new("ns", "t"), "article_url")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingTable(_)));
    }
}
