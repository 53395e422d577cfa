//! Sitemap traversal: index fetching, leaf URL extraction, path filtering.
//!
//! The watched site publishes a two-level sitemap hierarchy: a top-level
//! index whose `<sitemap><loc>` entries point at leaf sitemaps, each of
//! which lists actual page URLs under `<url><loc>`. This module retrieves
//! and parses both levels and filters the resulting URLs down to the blog
//! section.
//!
//! Document order is preserved; deduplication and sorting happen later in
//! the diff step. A fetch or parse failure here is fatal to the run, since
//! a truncated sitemap cannot be told apart from a complete one.

use crate::errors::WatchError;
use crate::fetch::FetchAsync;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info, instrument};

/// Fetch the sitemap index and return the leaf sitemap URLs it lists,
/// in document order.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_sitemap_index<F: FetchAsync>(
    fetcher: &F,
    index_url: &str,
) -> Result<Vec<String>, WatchError> {
    let xml = fetcher.fetch(index_url).await?;
    let locations = parse_locations(&xml, "sitemap", index_url)?;
    info!(count = locations.len(), url = %index_url, "Indexed leaf sitemaps");
    debug!(urls = ?locations, "Leaf sitemap URLs");
    Ok(locations)
}

/// Fetch one leaf sitemap and return the page URLs it lists, in
/// document order.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_leaf_urls<F: FetchAsync>(
    fetcher: &F,
    leaf_url: &str,
) -> Result<Vec<String>, WatchError> {
    let xml = fetcher.fetch(leaf_url).await?;
    let locations = parse_locations(&xml, "url", leaf_url)?;
    info!(count = locations.len(), url = %leaf_url, "Extracted page URLs");
    Ok(locations)
}

/// Keep only URLs whose text contains `keyword`.
///
/// Substring containment, not a path-structure match: a URL containing the
/// keyword anywhere passes, even at a non-canonical position.
pub fn filter_by_keyword(urls: Vec<String>, keyword: &str) -> Vec<String> {
    urls.into_iter().filter(|u| u.contains(keyword)).collect()
}

/// Extract the text of every `<loc>` element nested under `parent`
/// (`"sitemap"` for an index document, `"url"` for a leaf sitemap).
///
/// Matches on local element names, so namespace prefixes do not matter.
/// Malformed XML yields [`WatchError::Parse`]; a well-formed document with
/// no matching elements yields an empty vector.
fn parse_locations(xml: &str, parent: &str, doc_url: &str) -> Result<Vec<String>, WatchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locations = Vec::new();
    let mut buf = Vec::new();
    let mut in_parent = false;
    let mut in_loc = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == parent {
                    in_parent = true;
                } else if in_parent && name == "loc" {
                    in_loc = true;
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == parent {
                    in_parent = false;
                } else if name == "loc" {
                    in_loc = false;
                }
            }
            Ok(Event::Text(e)) => {
                if in_parent && in_loc {
                    let text = e
                        .unescape()
                        .map_err(|err| WatchError::parse(doc_url, err))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        locations.push(text.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(WatchError::parse(doc_url, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(locations)
}
