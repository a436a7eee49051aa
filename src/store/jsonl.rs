//! JSON-lines table store.
//!
//! # Layout
//!
//! ```text
//! data_dir/
//! └── scraping_results/            # namespace
//!     └── raw_the_guardian_news/   # table
//!         ├── schema.json
//!         └── rows.jsonl           # one ArticleRow per line, append-only
//! ```
//!
//! A batch is serialized up front and written with a single append, so a
//! serialization failure never leaves a half-written batch behind.

use super::{ArticleStore, TableRef, TableSchema, column_value};
use crate::error::StoreError;
use crate::models::ArticleRow;
use crate::utils::ensure_writable_dir;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

const SCHEMA_FILE: &str = "schema.json";
const ROWS_FILE: &str = "rows.jsonl";

#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    root: PathBuf,
}

impl JsonLinesStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    #[instrument(level = "info")]
    pub async fn open(data_dir: &str) -> Result<Self, StoreError> {
        ensure_writable_dir(data_dir)
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
        Ok(Self {
            root: PathBuf::from(data_dir),
        })
    }

    fn table_dir(&self, table: &TableRef) -> PathBuf {
        self.root.join(&table.namespace).join(&table.name)
    }

    async fn read_schema(&self, table: &TableRef) -> Result<TableSchema, StoreError> {
        match fs::read_to_string(self.table_dir(table).join(SCHEMA_FILE)).await {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::MissingTable(table.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_rows(&self, table: &TableRef) -> Result<Vec<ArticleRow>, StoreError> {
        let raw = match fs::read_to_string(self.table_dir(table).join(ROWS_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

impl ArticleStore for JsonLinesStore {
    async fn table_exists(&self, table: &TableRef) -> Result<bool, StoreError> {
        Ok(fs::try_exists(self.table_dir(table).join(SCHEMA_FILE)).await?)
    }

    #[instrument(level = "info", skip_all, fields(%table))]
    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), StoreError> {
        let dir = self.table_dir(table);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(SCHEMA_FILE), serde_json::to_string_pretty(schema)?).await?;
        info!(path = %dir.display(), "Created table");
        Ok(())
    }

    async fn query_column(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<HashSet<String>, StoreError> {
        let schema = self.read_schema(table).await?;
        if !schema.has_column(column) {
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                reason: format!("no column `{column}`"),
            });
        }

        let values: HashSet<String> = self
            .read_rows(table)
            .await?
            .iter()
            .filter_map(|row| column_value(row, column))
            .collect();
        debug!(%table, column, count = values.len(), "Read column");
        Ok(values)
    }

    #[instrument(level = "info", skip_all, fields(%table, rows = rows.len()))]
    async fn append_rows(&self, table: &TableRef, rows: &[ArticleRow]) -> Result<(), StoreError> {
        let schema = self.read_schema(table).await?;
        if schema != TableSchema::articles() {
            return Err(StoreError::SchemaMismatch {
                table: table.to_string(),
                reason: "stored schema differs from the article schema".to_string(),
            });
        }

        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(row)?);
            buf.push('\n');
        }

        let path = self.table_dir(table).join(ROWS_FILE);
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(buf.as_bytes()).await?;
        file.sync_all().await?;
        info!(path = %path.display(), bytes = buf.len(), "Appended rows");
        Ok(())
    }

    async fn scan_rows(&self, table: &TableRef) -> Result<Vec<ArticleRow>, StoreError> {
        self.read_schema(table).await?;
        self.read_rows(table).await
    }
}
