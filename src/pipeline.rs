//! The discovery-and-diff pipeline driver.
//!
//! One run executes strictly in phases, each completing before the next
//! begins:
//!
//! 1. Fetch the sitemap index, then every leaf sitemap it lists
//! 2. Filter page URLs down to the configured blog path keyword
//! 3. Diff the discovered set against the persisted known articles
//! 4. Enrich each new article with the active strategy
//! 5. Append the delta to the known set (discovery order) and persist
//!
//! The delta, not the full known set, is the run's externally visible
//! result. Progress lines, the summary count, and the final JSON object go
//! to stdout for downstream automation; diagnostics go to the tracing
//! subscriber on stderr.

use crate::cli::Config;
use crate::enrich::EnrichAsync;
use crate::errors::WatchError;
use crate::fetch::FetchAsync;
use crate::models::{Article, DeltaReport};
use crate::{sitemap, store};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Compute which discovered URLs are not yet in the known set.
///
/// The discovered sequence is deduplicated and sorted lexicographically
/// before comparison, so the output order is deterministic and independent
/// of both the traversal order and the known set's internal order.
pub fn diff(discovered: &[String], known: &[Article]) -> Vec<String> {
    let known_urls: HashSet<&str> = known.iter().map(|a| a.url.as_str()).collect();
    discovered
        .iter()
        .filter(|url| !known_urls.contains(url.as_str()))
        .cloned()
        .sorted()
        .dedup()
        .collect()
}

/// Run the full pipeline once and return the delta.
#[instrument(level = "info", skip_all)]
pub async fn run<F, E>(
    config: &Config,
    fetcher: &F,
    enricher: &E,
) -> Result<DeltaReport, WatchError>
where
    F: FetchAsync,
    E: EnrichAsync,
{
    let leaf_sitemaps = sitemap::fetch_sitemap_index(fetcher, &config.sitemap_index_url).await?;

    let mut discovered = Vec::new();
    for leaf_url in &leaf_sitemaps {
        let page_urls = sitemap::fetch_leaf_urls(fetcher, leaf_url).await?;
        discovered.extend(sitemap::filter_by_keyword(page_urls, &config.path_keyword));
    }

    let mut known = store::load(&config.store_path).await?;
    let fresh_urls = diff(&discovered, &known);
    info!(
        discovered = discovered.len(),
        known = known.len(),
        new = fresh_urls.len(),
        "Computed delta"
    );

    let mut new_articles: Vec<Article> = Vec::new();
    for url in &fresh_urls {
        match enricher.enrich(url).await {
            Ok(article) => {
                print_progress(&article);
                new_articles.push(article);
            }
            Err(e) => {
                // Left out of the persisted set too, so it is retried on
                // the next run.
                warn!(%url, error = %e, "Enrichment failed; article deferred to next run");
            }
        }
    }

    if new_articles.is_empty() {
        println!("no new articles");
    } else {
        println!("{} new articles", new_articles.len());
    }

    known.extend(new_articles.iter().cloned());
    store::save(&config.store_path, &known).await?;

    Ok(DeltaReport { new_articles })
}

fn print_progress(article: &Article) {
    match (&article.category, &article.date) {
        (Some(category), _) => println!("[new] [{category}] {}", article.url),
        (_, Some(date)) => println!("[new] {} -> {date}", article.url),
        _ => println!("[new] {}", article.url),
    }
}
