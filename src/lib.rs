//! # News Ingest
//!
//! Scrapes a news site's listing page, enriches every listed article with
//! the content of its own page, cleans the batch, and appends only articles
//! not already stored to a persistent table.
//!
//! ## Usage
//!
//! ```sh
//! news_ingest --config ./news_ingest.yaml
//! news_ingest query --keyword election
//! ```
//!
//! ## Architecture
//!
//! One run is a straight pipeline:
//! 1. **Listing**: fetch and parse the listing page into stubs
//! 2. **Detail**: fetch every article page concurrently (bounded)
//! 3. **Transform**: dedupe, validate, default authors, normalize dates
//! 4. **Load**: read stored URLs, append the rest

pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod registry;
pub mod retry;
pub mod sources;
pub mod store;
pub mod transformer;
pub mod utils;
