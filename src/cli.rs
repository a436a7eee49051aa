//! Command-line interface definitions.
//!
//! Global options override the matching config-file fields. With no subcommand
//! the tool performs one ingestion run.

use crate::config::AppConfig;
use clap::{Parser, Subcommand};

/// Command-line arguments for News Ingest.
///
/// # Examples
///
/// ```sh
/// # One run with built-in defaults
/// news_ingest
///
/// # Dry run against an in-memory store
/// news_ingest --destination memory
///
/// # Read back stored articles mentioning "climate"
/// news_ingest query --keyword climate --limit 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "NEWS_INGEST_CONFIG")]
    pub config: Option<String>,

    /// Registered source name (e.g. `the_guardian`)
    #[arg(long)]
    pub source: Option<String>,

    /// Registered transformer name
    #[arg(long)]
    pub transformer: Option<String>,

    /// Destination store: `jsonl` or `memory`
    #[arg(long)]
    pub destination: Option<String>,

    /// Directory holding the destination tables
    #[arg(long, env = "NEWS_INGEST_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Ceiling on concurrent article page fetches
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape the listing, enrich, and append new articles (default)
    Run,
    /// Print stored articles as JSON
    Query {
        /// Only articles whose content contains this keyword
        #[arg(short, long)]
        keyword: Option<String>,

        /// Maximum number of articles to print
        #[arg(short, long, default_value_t = crate::query::DEFAULT_LIMIT)]
        limit: usize,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(source) = &self.source {
            config.run.source = source.clone();
        }
        if let Some(transformer) = &self.transformer {
            config.run.transformer = transformer.clone();
        }
        if let Some(destination) = &self.destination {
            config.run.destination = destination.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.store.data_dir = data_dir.clone();
        }
        if let Some(max_concurrency) = self.max_concurrency {
            config.http.max_concurrency = max_concurrency;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::parse_from(["news_ingest"]);
        assert!(cli.command.is_none());
        assert!(cli.source.is_none());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "news_ingest",
            "--destination",
            "memory",
            "--data-dir",
            "/tmp/news",
            "--max-concurrency",
            "3",
        ]);
        let mut config = AppConfig::default();
        cli.apply_to(&mut config);

        assert_eq!(config.run.destination, "memory");
        assert_eq!(config.run.source, "the_guardian");
        assert_eq!(config.store.data_dir, "/tmp/news");
        assert_eq!(config.http.max_concurrency, 3);
    }

    #[test]
    fn test_query_subcommand() {
        let cli = Cli::parse_from(["news_ingest", "query", "-k", "climate"]);
        assert_eq!(
            cli.command,
            Some(Command::Query {
                keyword: Some("climate".to_string()),
                limit: 30,
            })
        );
    }
}
