//! Data models for discovered articles and the run's delta report.
//!
//! This module defines the structures persisted to the known-articles store
//! and emitted on stdout:
//! - [`Article`]: one blog article keyed by URL, with enrichment metadata
//! - [`KnownArticles`]: the full persisted, ordered record of seen articles
//! - [`DeltaReport`]: the newly discovered articles of the current run
//!
//! An [`Article`] carries either a `date` (date-scrape strategy) or a
//! `category` (slug-classification strategy), never both in one run. Absent
//! fields are skipped during serialization so the persisted shape is exactly
//! `{"url", "date"}` or `{"url", "category"}`.

use serde::{Deserialize, Serialize};

/// A single blog article, keyed by its URL.
///
/// The enrichment fields are optional so records written by either strategy
/// deserialize cleanly, and so a bare `{"url": ...}` record (hand-seeded or
/// from older tooling) still loads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Canonical article URL. Unique within [`KnownArticles`].
    pub url: String,
    /// Publication date scraped from the article page. May be empty when
    /// the page carried no recognizable date marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Category label derived from the URL slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Build an article enriched with a scraped publication date.
    pub fn with_date(url: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            date: Some(date.into()),
            category: None,
        }
    }

    /// Build an article enriched with a slug-derived category.
    pub fn with_category(url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            date: None,
            category: Some(category.into()),
        }
    }
}

/// The persisted, ordered record of every article seen so far.
///
/// Append-only: records are appended in discovery order and never mutated
/// or removed by normal operation.
pub type KnownArticles = Vec<Article>;

/// The externally visible result of one run: only the newly seen articles.
///
/// Serialized as a single line `{"new_articles": [...]}` on stdout for
/// downstream automation. An empty delta is a valid, non-error outcome.
#[derive(Debug, Serialize)]
pub struct DeltaReport {
    /// Newly discovered articles in ascending lexicographic URL order.
    pub new_articles: Vec<Article>,
}
