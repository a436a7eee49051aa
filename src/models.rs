//! Data models for articles as they move through an ingestion run.
//!
//! - [`ArticleStub`]: what the listing page tells us about an article
//! - [`ArticleDetail`]: what the article's own page adds
//! - [`ArticleRecord`]: stub and detail merged; the shape every transform stage works on
//! - [`ArticleRow`]: a validated record, ready to be appended to the store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for `article_date` everywhere in the pipeline.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimal listing-derived article, before detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleStub {
    /// Identifier of the listing grouping the entry was found in.
    pub section: String,
    /// Absolute article URL; `None` when the entry carried no link.
    pub article_url: Option<String>,
    /// Publish date, truncated to calendar-day granularity.
    pub article_date: Option<NaiveDate>,
}

/// Content fields obtained only by fetching the article's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDetail {
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl ArticleDetail {
    /// The all-null detail used when a page could not be fetched or has no URL.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.content.is_none()
    }
}

/// A stub merged with its detail.
///
/// `article_date` is kept as text so that records from any source go through the
/// same date normalization in the transformer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub section: String,
    pub article_url: Option<String>,
    pub article_date: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl ArticleRecord {
    pub fn merge(stub: ArticleStub, detail: ArticleDetail) -> Self {
        Self {
            section: stub.section,
            article_url: stub.article_url,
            article_date: stub.article_date.map(|d| d.format(DATE_FORMAT).to_string()),
            title: detail.title,
            author: detail.author,
            content: detail.content,
        }
    }
}

/// A validated article as stored in the destination table.
///
/// Field order matches the destination column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRow {
    pub title: String,
    pub content: String,
    pub author: String,
    pub article_url: String,
    pub article_date: NaiveDate,
    pub section: String,
}
