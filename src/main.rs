//! # Newswatch
//!
//! A keyword news harvester: fetches articles matching a configured keyword
//! list from RSS feeds and HTML search pages, normalizes them into one
//! record shape, and stores them in a SQLite archive deduplicated by URL.
//!
//! ## Usage
//!
//! ```sh
//! newswatch
//! newswatch --config newswatch.yaml -k rust
//! ```
//!
//! ## Architecture
//!
//! The application is a single bounded pipeline per invocation:
//! 1. **Schema**: Open the database and ensure the articles table exists
//! 2. **Fan-out**: Fetch every (keyword, source) pair concurrently
//! 3. **Normalize**: Map feed entries and markup blocks into canonical records
//! 4. **Persist**: Insert the whole batch in one transaction, skipping known URLs
//!
//! A single source failing only costs that source's records; a schema or
//! transaction failure aborts the run with a non-zero exit.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use config::AppConfig;
use store::ArticleStore;

fn init_tracing(log_file: Option<&str>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tfmt::layer()
                        .with_target(true)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .with(
                    tfmt::layer()
                        .with_ansi(false)
                        .with_target(true)
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => {
            tfmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(UtcTime::rfc_3339())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_tracing(args.log_file.as_deref())?;

    let start_time = std::time::Instant::now();
    info!("newswatch starting up");
    debug!(?args.config, ?args.database, ?args.keywords, "Parsed CLI arguments");

    // --- Configuration ---
    let mut config = match &args.config {
        Some(path) => match AppConfig::load(Path::new(path)) {
            Ok(config) => {
                info!(config_path = %path, "Loaded configuration");
                config
            }
            Err(e) => {
                error!(config_path = %path, error = %e, "Failed to load configuration");
                return Err(e);
            }
        },
        None => AppConfig::default(),
    };
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if !args.keywords.is_empty() {
        config.keywords = args.keywords;
    }
    info!(
        keywords = config.keywords.len(),
        sources = config.sources.len(),
        database = %config.database_path,
        "Configuration ready"
    );

    // --- Storage (schema init happens here, before any fetch) ---
    let mut store = match ArticleStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            error!(database = %config.database_path, error = %e, "Failed to open article store");
            return Err(e);
        }
    };

    // --- Pipeline ---
    let summary = match pipeline::run(&config, &mut store).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Pipeline run failed");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
