//! Destination store adapters.
//!
//! The loader only needs four operations from a store ([`ArticleStore`]):
//! existence check, table creation, reading one column as a set, and appending
//! rows. The store never updates or deletes rows.
//!
//! # Adapters
//!
//! - [`jsonl::JsonLinesStore`]: one directory per table under a data dir
//! - [`memory::MemoryStore`]: process-local; dry runs and tests
//!
//! [`AnyStore`] selects between them at runtime.

pub mod jsonl;
pub mod memory;

use crate::error::StoreError;
use crate::models::ArticleRow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A table identified by namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub namespace: String,
    pub name: String,
}

impl TableRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnKind {
    String,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// The fixed article schema, in column order.
    pub fn articles() -> Self {
        let column = |name: &str, kind| ColumnDef {
            name: name.to_string(),
            kind,
        };
        Self {
            columns: vec![
                column("title", ColumnKind::String),
                column("content", ColumnKind::String),
                column("author", ColumnKind::String),
                column("article_url", ColumnKind::String),
                column("article_date", ColumnKind::Date),
                column("section", ColumnKind::String),
            ],
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// Operations the loader and the read path need from a destination store.
pub trait ArticleStore {
    async fn table_exists(&self, table: &TableRef) -> Result<bool, StoreError>;

    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), StoreError>;

    /// Every distinct non-null value of `column`.
    async fn query_column(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<HashSet<String>, StoreError>;

    /// Append rows; existing rows are never touched.
    async fn append_rows(&self, table: &TableRef, rows: &[ArticleRow]) -> Result<(), StoreError>;

    /// All rows in insertion order.
    async fn scan_rows(&self, table: &TableRef) -> Result<Vec<ArticleRow>, StoreError>;
}

/// Runtime-selected store.
#[derive(Debug)]
pub enum AnyStore {
    JsonLines(jsonl::JsonLinesStore),
    Memory(memory::MemoryStore),
}

impl ArticleStore for AnyStore {
    async fn table_exists(&self, table: &TableRef) -> Result<bool, StoreError> {
        match self {
            AnyStore::JsonLines(s) => s.table_exists(table).await,
            AnyStore::Memory(s) => s.table_exists(table).await,
        }
    }

    async fn create_table(&self, table: &TableRef, schema: &TableSchema) -> Result<(), StoreError> {
        match self {
            AnyStore::JsonLines(s) => s.create_table(table, schema).await,
            AnyStore::Memory(s) => s.create_table(table, schema).await,
        }
    }

    async fn query_column(
        &self,
        table: &TableRef,
        column: &str,
    ) -> Result<HashSet<String>, StoreError> {
        match self {
            AnyStore::JsonLines(s) => s.query_column(table, column).await,
            AnyStore::Memory(s) => s.query_column(table, column).await,
        }
    }

    async fn append_rows(&self, table: &TableRef, rows: &[ArticleRow]) -> Result<(), StoreError> {
        match self {
            AnyStore::JsonLines(s) => s.append_rows(table, rows).await,
            AnyStore::Memory(s) => s.append_rows(table, rows).await,
        }
    }

    async fn scan_rows(&self, table: &TableRef) -> Result<Vec<ArticleRow>, StoreError> {
        match self {
            AnyStore::JsonLines(s) => s.scan_rows(table).await,
            AnyStore::Memory(s) => s.scan_rows(table).await,
        }
    }
}

/// Read one column out of a row as text, the way stores report key sets.
pub(crate) fn column_value(row: &ArticleRow, column: &str) -> Option<String> {
    match column {
        "title" => Some(row.title.clone()),
        "content" => Some(row.content.clone()),
        "author" => Some(row.author.clone()),
        "article_url" => Some(row.article_url.clone()),
        "article_date" => Some(row.article_date.format(crate::models::DATE_FORMAT).to_string()),
        "section" => Some(row.section.clone()),
        _ => None,
    }
}
