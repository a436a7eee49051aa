//! Command-line entry point: one ingestion run, or a read-back query.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_ingest::cli::{Cli, Command};
use news_ingest::config::AppConfig;
use news_ingest::error::PipelineError;
use news_ingest::pipeline;
use news_ingest::query::{self, ArticleQuery};
use news_ingest::registry::{DestinationKind, RunSelection};
use news_ingest::store::TableRef;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref()).await?;
    args.apply_to(&mut config);

    match args.command.clone().unwrap_or(Command::Run) {
        Command::Run => run_once(&config).await,
        Command::Query { keyword, limit } => print_articles(&config, keyword, limit).await,
    }
}

async fn run_once(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let selection = RunSelection::resolve(&config.run)?;
    info!(
        source = selection.source.name(),
        transformer = selection.transformer.name(),
        destination = selection.destination.name(),
        "news_ingest starting up"
    );

    // Dropping the run future abandons in-flight fetches and closes the client.
    let result = tokio::select! {
        result = pipeline::run(config, selection) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; abandoning run without writing");
            Err(PipelineError::Cancelled)
        }
    };

    match result {
        Ok(report) => {
            info!(
                source = %report.source,
                extracted = report.extracted,
                cleaned = report.cleaned,
                appended = report.load.appended,
                "Execution complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            Err(e.into())
        }
    }
}

async fn print_articles(
    config: &AppConfig,
    keyword: Option<String>,
    limit: usize,
) -> Result<(), Box<dyn Error>> {
    let destination = DestinationKind::from_name(&config.run.destination)?;
    let store = destination.open(&config.store).await?;
    let table = TableRef::new(&config.store.namespace, &config.store.table);

    let query = ArticleQuery {
        keyword,
        limit: Some(limit),
    };
    let rows = query::query_articles(&store, &table, &query).await?;
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "articles": rows }))?);
    Ok(())
}
