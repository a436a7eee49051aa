//! Selector-driven scraper shared by every HTML source.
//!
//! A [`SchemaScraper`] knows nothing about a particular site; everything
//! site-specific comes from its [`ExtractionSchema`].

use super::ArticleSource;
use super::schema::{CompiledSchema, ExtractionSchema};
use crate::error::ConfigError;
use crate::models::{ArticleDetail, ArticleStub};
use crate::utils::{normalize_text, truncate_for_log};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

/// Offset-aware timestamp layouts, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Naive timestamp layouts, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

#[derive(Debug, Clone)]
pub struct SchemaScraper {
    name: String,
    listing_url: Url,
    schema: CompiledSchema,
}

impl SchemaScraper {
    /// Build a scraper for one source.
    ///
    /// # Arguments
    ///
    /// * `name` - Registry name, used in logs
    /// * `listing_url` - Absolute URL of the listing page
    /// * `schema` - Selectors to compile
    ///
    /// # Returns
    ///
    /// [`ConfigError::InvalidUrl`] for an unparseable listing URL and
    /// [`ConfigError::InvalidSelector`] for a bad selector.
    pub fn new(
        name: &str,
        listing_url: &str,
        schema: &ExtractionSchema,
    ) -> Result<Self, ConfigError> {
        let listing_url = Url::parse(listing_url).map_err(|source| ConfigError::InvalidUrl {
            url: listing_url.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            listing_url,
            schema: schema.compile()?,
        })
    }

    /// Resolve an entry's link against the listing URL.
    ///
    /// Only http(s) targets count as article links.
    fn resolve_link(&self, entry: &ElementRef<'_>) -> Option<String> {
        let href = entry
            .select(&self.schema.link)
            .find_map(|a| a.value().attr("href"))?
            .trim();
        if href.is_empty() {
            return None;
        }
        let resolved = self.listing_url.join(href).ok()?;
        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }

    fn publish_date(&self, entry: &ElementRef<'_>) -> Option<NaiveDate> {
        let raw = entry
            .select(&self.schema.timestamp)
            .next()?
            .value()
            .attr(&self.schema.timestamp_attr)?;
        let date = parse_publish_date(raw);
        if date.is_none() {
            debug!(raw, "Unparseable publish timestamp");
        }
        date
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    normalize_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Parse an ISO-8601-like timestamp into its calendar date.
///
/// A trailing `Z` means UTC. The date is taken in the timestamp's own offset,
/// not converted to local time.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.date_naive())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok())
}

impl ArticleSource for SchemaScraper {
    fn name(&self) -> &str {
        &self.name
    }

    fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    fn parse_listing(&self, html: &str) -> Vec<ArticleStub> {
        let document = Html::parse_document(html);
        let mut stubs = Vec::new();

        for section in document.select(&self.schema.section) {
            let Some(section_id) = section
                .value()
                .attr(&self.schema.section_id_attr)
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                continue;
            };

            for entry in section.select(&self.schema.entry) {
                stubs.push(ArticleStub {
                    section: section_id.to_string(),
                    article_url: self.resolve_link(&entry),
                    article_date: self.publish_date(&entry),
                });
            }
        }

        stubs
    }

    fn parse_detail(&self, html: &str) -> ArticleDetail {
        let document = Html::parse_document(html);

        let title = document.select(&self.schema.title).next().and_then(element_text);
        let author = document.select(&self.schema.author).next().and_then(element_text);
        let content = document.select(&self.schema.content).next().and_then(|body| {
            let paragraphs: Vec<String> = body
                .select(&self.schema.paragraph)
                .filter_map(element_text)
                .collect();
            normalize_text(&paragraphs.join(" "))
        });

        if title.is_none() && content.is_none() {
            warn!(
                source = %self.name,
                page_preview = %truncate_for_log(html, 200),
                "Article page is missing expected markup"
            );
            return ArticleDetail::empty();
        }

        ArticleDetail {
            title,
            author,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::the_guardian;

    fn scraper() -> SchemaScraper {
        SchemaScraper::new(
            the_guardian::NAME,
            "https://www.theguardian.com/international",
            &the_guardian::schema(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_listing_resolves_links_and_dates() {
        let html = r#"
        <section id="headlines">
          <ul>
            <li>
              <a href="/world/2024/may/01/story">Story</a>
              <footer><time datetime="2024-05-01T23:30:00Z">1 May</time></footer>
            </li>
            <li>
              <a href="https://www.theguardian.com/uk-news/other">Other</a>
            </li>
          </ul>
        </section>"#;

        let stubs = scraper().parse_listing(html);
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].section, "headlines");
        assert_eq!(
            stubs[0].article_url.as_deref(),
            Some("https://www.theguardian.com/world/2024/may/01/story")
        );
        assert_eq!(stubs[0].article_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(
            stubs[1].article_url.as_deref(),
            Some("https://www.theguardian.com/uk-news/other")
        );
        assert_eq!(stubs[1].article_date, None);
    }

    #[test]
    fn test_parse_listing_skips_sections_without_id() {
        let html = r#"
        <section><ul><li><a href="/a">A</a></li></ul></section>
        <section id=""><ul><li><a href="/b">B</a></li></ul></section>
        <section id="sport"><ul><li><a href="/c">C</a></li></ul></section>"#;

        let stubs = scraper().parse_listing(html);
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].section, "sport");
    }

    #[test]
    fn test_entry_without_link_has_null_url() {
        let html = r##"
        <section id="opinion"><ul>
          <li><span>No link here</span></li>
          <li><a href="">Empty</a></li>
          <li><a href="mailto:desk@example.com">Mail</a></li>
        </ul></section>"##;

        let stubs = scraper().parse_listing(html);
        assert_eq!(stubs.len(), 3);
        assert!(stubs.iter().all(|s| s.article_url.is_none()));
    }

    #[test]
    fn test_malformed_timestamp_is_null_not_error() {
        let html = r#"
        <section id="world"><ul>
          <li><a href="/x">X</a><footer><time datetime="yesterday-ish">?</time></footer></li>
        </ul></section>"#;

        let stubs = scraper().parse_listing(html);
        assert_eq!(stubs[0].article_date, None);
    }

    #[test]
    fn test_parse_publish_date_variants() {
        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_publish_date("2024-05-01T10:00:00Z"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T10:00:00.123Z"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T23:00:00-05:00"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T10:00:00+0100"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T10:00Z"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T10:00+01:00"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T23:30-05:00"), may_first);
        assert_eq!(parse_publish_date("2024-05-01T10:00:00"), may_first);
        assert_eq!(parse_publish_date("2024-05-01"), may_first);
        assert_eq!(parse_publish_date(""), None);
        assert_eq!(parse_publish_date("not a date"), None);
    }

    #[test]
    fn test_parse_detail_extracts_fields() {
        let html = r#"
        <html><body>
          <h1 class="dcr-125vfar">  Ministers   announce plan </h1>
          <a rel="author" href="/profile/jane">Jane Doe</a>
          <div class="article-body-commercial-selector article-body-viewer-selector dcr-1">
            <p class="dcr-s3ycb2">First paragraph.</p>
            <p class="unrelated">Ad copy.</p>
            <p class="dcr-s3ycb2">Second <a href="/x">paragraph</a>.</p>
          </div>
        </body></html>"#;

        let detail = scraper().parse_detail(html);
        assert_eq!(detail.title.as_deref(), Some("Ministers announce plan"));
        assert_eq!(detail.author.as_deref(), Some("Jane Doe"));
        assert_eq!(
            detail.content.as_deref(),
            Some("First paragraph. Second paragraph .")
        );
    }

    #[test]
    fn test_parse_detail_without_author() {
        let html = r#"
          <h1 class="dcr-1">Title</h1>
          <div class="article-body-commercial-selector"><p class="dcr-2">Body</p></div>"#;

        let detail = scraper().parse_detail(html);
        assert_eq!(detail.title.as_deref(), Some("Title"));
        assert_eq!(detail.author, None);
        assert_eq!(detail.content.as_deref(), Some("Body"));
    }

    #[test]
    fn test_parse_detail_missing_markup_is_empty() {
        let detail = scraper().parse_detail("<html><body><p>Just a page</p></body></html>");
        assert!(detail.is_empty());
    }

    #[test]
    fn test_invalid_listing_url_is_config_error() {
        let err = SchemaScraper::new("x", "not a url", &the_guardian::schema()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
