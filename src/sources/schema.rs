//! Markup extraction schemas.
//!
//! An [`ExtractionSchema`] is the per-site configuration telling the scraper
//! where things live in the listing and article pages. Selectors are plain CSS
//! strings so they can be supplied from YAML; [`CompiledSchema`] holds the
//! parsed [`Selector`]s for a run.

use crate::error::ConfigError;
use scraper::Selector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractionSchema {
    /// Repeated grouping on the listing page; one section per grouping.
    pub section: String,
    /// Attribute on the grouping holding the section identifier.
    pub section_id_attr: String,
    /// Repeated entry inside a section; one stub per entry.
    pub entry: String,
    /// Link element inside an entry; its `href` is the article URL.
    pub link: String,
    /// Element inside an entry carrying the publish timestamp.
    pub timestamp: String,
    pub timestamp_attr: String,
    /// Article headline on the detail page.
    pub title: String,
    /// Byline element on the detail page.
    pub author: String,
    /// Article body container on the detail page.
    pub content: String,
    /// Paragraphs inside the body container, joined with a single space.
    pub paragraph: String,
}

/// Selectors parsed once per run.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub section: Selector,
    pub section_id_attr: String,
    pub entry: Selector,
    pub link: Selector,
    pub timestamp: Selector,
    pub timestamp_attr: String,
    pub title: Selector,
    pub author: Selector,
    pub content: Selector,
    pub paragraph: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

impl ExtractionSchema {
    pub fn compile(&self) -> Result<CompiledSchema, ConfigError> {
        Ok(CompiledSchema {
            section: parse_selector(&self.section)?,
            section_id_attr: self.section_id_attr.clone(),
            entry: parse_selector(&self.entry)?,
            link: parse_selector(&self.link)?,
            timestamp: parse_selector(&self.timestamp)?,
            timestamp_attr: self.timestamp_attr.clone(),
            title: parse_selector(&self.title)?,
            author: parse_selector(&self.author)?,
            content: parse_selector(&self.content)?,
            paragraph: parse_selector(&self.paragraph)?,
        })
    }
}
