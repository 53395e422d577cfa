//! # CoC Blog Watch
//!
//! Incrementally discovers new blog articles under the Clash of Clans
//! zh-blog section by traversing the site's two-level sitemap hierarchy,
//! diffing the discovered URLs against a persisted known-articles record,
//! and emitting only the newly seen articles.
//!
//! ## Usage
//!
//! ```sh
//! coc_blog_watch                   # classify new articles by URL slug
//! coc_blog_watch --strategy date   # scrape a publication date instead
//! ```
//!
//! ## Architecture
//!
//! One run executes a strictly sequential pipeline:
//! 1. **Traversal**: fetch the sitemap index, then every leaf sitemap
//! 2. **Filtering**: keep URLs under the configured blog path
//! 3. **Diffing**: set-difference against the persisted known articles
//! 4. **Enrichment**: per new article, date scrape or slug classification
//! 5. **Persistence**: append the delta to the store, atomically
//!
//! Diagnostics go to stderr via `tracing`; stdout carries the progress
//! lines, summary count, and the final single-line JSON delta consumed by
//! downstream automation.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod enrich;
mod errors;
mod fetch;
mod models;
mod pipeline;
mod sitemap;
mod store;

use cli::{Cli, Strategy};
use enrich::{DateEnricher, SlugEnricher};
use fetch::{HttpFetcher, RetryFetch};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr; stdout is reserved for the delta output) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("coc_blog_watch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let config = args.into_config();

    let http = HttpFetcher::new(&config.user_agent)?;
    let fetcher = RetryFetch::new(http, 3, Duration::from_secs(1));

    let report = match config.strategy {
        Strategy::Date => {
            let enricher = DateEnricher { fetcher: &fetcher };
            pipeline::run(&config, &fetcher, &enricher).await?
        }
        Strategy::Category => pipeline::run(&config, &fetcher, &SlugEnricher).await?,
    };

    // Final single-line JSON for downstream automation.
    println!("{}", serde_json::to_string(&report)?);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        new_articles = report.new_articles.len(),
        "Execution complete"
    );

    Ok(())
}
