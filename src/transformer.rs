//! Record cleaning and validation.
//!
//! The transform is a chain of pure stages over `Vec<ArticleRecord>`; each
//! stage can be tested on its own. Order matters:
//!
//! 1. [`drop_exact_duplicates`]
//! 2. [`drop_incomplete`]: no title or no content
//! 3. [`default_missing_author`]: [`UNKNOWN_AUTHOR`]
//! 4. [`normalize_dates`]: unparseable or missing dates become the transform date
//! 5. [`collapse_duplicate_urls`]: first-seen record wins
//!
//! [`into_rows`] then turns the cleaned records into typed [`ArticleRow`]s.

use crate::models::{ArticleRecord, ArticleRow, DATE_FORMAT};
use chrono::{DateTime, Local, NaiveDate};
use itertools::Itertools;
use tracing::{debug, info, instrument};

/// Author used when a page has no byline.
pub const UNKNOWN_AUTHOR: &str = "Author Unknown";

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Remove records identical in every field, keeping the first.
pub fn drop_exact_duplicates(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records.into_iter().unique().collect()
}

/// Remove records that cannot be stored: missing title or content.
pub fn drop_incomplete(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .filter(|r| !is_blank(&r.title) && !is_blank(&r.content))
        .collect()
}

/// Replace a missing or blank author with [`UNKNOWN_AUTHOR`].
pub fn default_missing_author(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .map(|mut r| {
            if is_blank(&r.author) {
                r.author = Some(UNKNOWN_AUTHOR.to_string());
            }
            r
        })
        .collect()
}

/// Parse a stored or scraped date string into a calendar date.
pub fn parse_article_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Rewrite every `article_date` as `YYYY-MM-DD`.
///
/// A missing or unparseable date becomes `today`, the date the transform ran.
pub fn normalize_dates(records: Vec<ArticleRecord>, today: NaiveDate) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .map(|mut r| {
            let date = match r.article_date.as_deref().and_then(parse_article_date) {
                Some(date) => date,
                None => {
                    debug!(
                        url = ?r.article_url,
                        raw = ?r.article_date,
                        %today,
                        "Falling back to transform date"
                    );
                    today
                }
            };
            r.article_date = Some(date.format(DATE_FORMAT).to_string());
            r
        })
        .collect()
}

/// Keep only the first record for each `article_url`.
pub fn collapse_duplicate_urls(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    records
        .into_iter()
        .unique_by(|r| r.article_url.clone())
        .collect()
}

/// Convert cleaned records into rows. Records without a URL are dropped.
pub fn into_rows(records: Vec<ArticleRecord>, today: NaiveDate) -> Vec<ArticleRow> {
    records
        .into_iter()
        .filter_map(|r| {
            Some(ArticleRow {
                article_date: r
                    .article_date
                    .as_deref()
                    .and_then(parse_article_date)
                    .unwrap_or(today),
                title: r.title?,
                content: r.content?,
                author: r.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                article_url: r.article_url?,
                section: r.section,
            })
        })
        .collect()
}

/// Run every stage with an explicit transform date.
#[instrument(level = "info", skip_all, fields(input = records.len(), %today))]
pub fn transform_at(records: Vec<ArticleRecord>, today: NaiveDate) -> Vec<ArticleRow> {
    let records = drop_exact_duplicates(records);
    let records = drop_incomplete(records);
    let records = default_missing_author(records);
    let records = normalize_dates(records, today);
    let records = collapse_duplicate_urls(records);
    let rows = into_rows(records, today);
    info!(output = rows.len(), "Transformed batch");
    rows
}

/// Run every stage using the local date as the transform date.
pub fn transform(records: Vec<ArticleRecord>) -> Vec<ArticleRow> {
    transform_at(records, Local::now().date_naive())
}
