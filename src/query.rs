//! Read path over the destination store.
//!
//! Lists stored articles, optionally filtered by a keyword matched
//! case-insensitively against `content`, capped at a row limit.

use crate::error::StoreError;
use crate::models::ArticleRow;
use crate::store::{ArticleStore, TableRef};
use tracing::{info, instrument};

/// Row cap used when the caller does not give one.
pub const DEFAULT_LIMIT: usize = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub keyword: Option<String>,
    pub limit: Option<usize>,
}

/// `needle` must already be lowercase.
fn content_matches(row: &ArticleRow, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| row.content.to_lowercase().contains(needle))
}

/// Rows matching `query`, in insertion order. A missing table reads as empty.
#[instrument(level = "info", skip_all, fields(%table, keyword = ?query.keyword))]
pub async fn query_articles<S: ArticleStore>(
    store: &S,
    table: &TableRef,
    query: &ArticleQuery,
) -> Result<Vec<ArticleRow>, StoreError> {
    if !store.table_exists(table).await? {
        info!("Table does not exist yet");
        return Ok(Vec::new());
    }

    let needle = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let rows: Vec<ArticleRow> = store
        .scan_rows(table)
        .await?
        .into_iter()
        .filter(|row| content_matches(row, needle.as_deref()))
        .take(limit)
        .collect();
    info!(count = rows.len(), "Query complete");
    Ok(rows)
}
