//! The Guardian front page.
//!
//! The listing page groups stories into `<section id="...">` blocks, each a list
//! of `<li>` entries with a link and a `<footer><time datetime="...">`. Article
//! pages use generated `dcr-*` class names, so headline and paragraphs are
//! matched on the class prefix.

use super::ExtractionSchema;

pub const NAME: &str = "the_guardian";

pub const LISTING_URL: &str = "https://www.theguardian.com/international";

pub fn schema() -> ExtractionSchema {
    ExtractionSchema {
        section: "section".to_string(),
        section_id_attr: "id".to_string(),
        entry: "li".to_string(),
        link: "a[href]".to_string(),
        timestamp: "footer time".to_string(),
        timestamp_attr: "datetime".to_string(),
        title: r#"h1[class*="dcr-"]"#.to_string(),
        author: r#"a[rel="author"]"#.to_string(),
        content: "div.article-body-commercial-selector".to_string(),
        paragraph: r#"p[class*="dcr-"]"#.to_string(),
    }
}
