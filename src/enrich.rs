//! Per-article enrichment: date scraping or slug classification.
//!
//! Every newly discovered URL is enriched by exactly one strategy per run:
//!
//! - [`DateEnricher`] fetches the article page and scrapes a publication
//!   date with a fallback chain: the tagline marker
//!   `div[data-test-id="tagline"]` first, then a generic `time` element
//!   (preferring its `datetime` attribute), then an empty string. A page
//!   with no recognizable date marker is not an error.
//! - [`SlugEnricher`] classifies the article from its URL slug without any
//!   I/O: a slug leading with `YYYY-M-` or `YYYY-MM-` is an event/reward
//!   post, everything else an announcement.
//!
//! Both implement [`EnrichAsync`], so the pipeline is a single code path
//! parameterized by the active strategy.

use crate::errors::WatchError;
use crate::fetch::FetchAsync;
use crate::models::Article;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

/// Category label for date-prefixed slugs (season updates, reward drops).
pub const CATEGORY_EVENT: &str = "event/reward";
/// Category label for everything else.
pub const CATEGORY_ANNOUNCEMENT: &str = "announcement";

/// Four-digit year, hyphen, one-or-two-digit month, hyphen, anchored at
/// the start of the slug.
static DATED_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{1,2}-").unwrap());

/// Trait for deriving enrichment metadata for one newly discovered URL.
pub trait EnrichAsync {
    /// Produce the enriched [`Article`] record for `url`.
    async fn enrich(&self, url: &str) -> Result<Article, WatchError>;
}

/// Date-scraping strategy: fetches the article page and extracts a
/// publication date.
#[derive(Debug)]
pub struct DateEnricher<'a, F> {
    /// Transport used to retrieve article pages.
    pub fetcher: &'a F,
}

impl<F: FetchAsync> EnrichAsync for DateEnricher<'_, F> {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn enrich(&self, url: &str) -> Result<Article, WatchError> {
        let html = self.fetcher.fetch(url).await?;
        let date = extract_date(&html);
        debug!(%date, "Scraped publication date");
        Ok(Article::with_date(url, date))
    }
}

/// Slug-classification strategy: pure pattern match on the URL, no I/O.
#[derive(Debug)]
pub struct SlugEnricher;

impl EnrichAsync for SlugEnricher {
    async fn enrich(&self, url: &str) -> Result<Article, WatchError> {
        Ok(Article::with_category(url, classify_slug(url)))
    }
}

/// Extract a publication date from article HTML.
///
/// Terminal states only: tagline text, `time` element (attribute preferred
/// over text), or an empty string. Never fails; the pipeline must not abort
/// over one unparsable page.
pub fn extract_date(html: &str) -> String {
    let document = Html::parse_document(html);

    let tagline = Selector::parse(r#"div[data-test-id="tagline"]"#).unwrap();
    if let Some(element) = document.select(&tagline).next() {
        return element_text(&element);
    }

    let time = Selector::parse("time").unwrap();
    if let Some(element) = document.select(&time).next() {
        if let Some(datetime) = element.value().attr("datetime") {
            return datetime.to_string();
        }
        return element_text(&element);
    }

    String::new()
}

fn element_text(element: &scraper::ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify an article URL by its slug (the last path segment).
///
/// The slug is percent-decoded and lowercased, with any trailing slash
/// stripped. Total: always returns one of the two category labels.
pub fn classify_slug(url: &str) -> &'static str {
    // Fall back to treating the whole input as a path for non-URL input.
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let trimmed = path.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let slug = urlencoding::decode(last)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| last.to_string())
        .to_lowercase();

    if DATED_SLUG.is_match(&slug) {
        CATEGORY_EVENT
    } else {
        CATEGORY_ANNOUNCEMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOG: &str = "https://supercell.com/en/games/clashofclans/zh/blog";

    #[test]
    fn test_classify_dated_slug_is_event() {
        assert_eq!(
            classify_slug(&format!("{BLOG}/2025-3-update-rewards/")),
            CATEGORY_EVENT
        );
        assert_eq!(classify_slug(&format!("{BLOG}/2025-12-x/")), CATEGORY_EVENT);
    }

    #[test]
    fn test_classify_plain_slug_is_announcement() {
        assert_eq!(
            classify_slug(&format!("{BLOG}/community-update-march/")),
            CATEGORY_ANNOUNCEMENT
        );
    }

    #[test]
    fn test_classify_year_must_lead() {
        assert_eq!(
            classify_slug(&format!("{BLOG}/10-2025-x/")),
            CATEGORY_ANNOUNCEMENT
        );
    }

    #[test]
    fn test_classify_decodes_percent_escapes() {
        // "%32%30%32%35" decodes to "2025".
        assert_eq!(
            classify_slug(&format!("{BLOG}/%32%30%32%35-3-rewards/")),
            CATEGORY_EVENT
        );
    }

    #[test]
    fn test_classify_is_case_insensitive_and_total() {
        assert_eq!(classify_slug("not a url"), CATEGORY_ANNOUNCEMENT);
        assert_eq!(classify_slug(""), CATEGORY_ANNOUNCEMENT);
    }

    #[test]
    fn test_extract_date_prefers_tagline() {
        let html = r#"<html><body>
            <div data-test-id="tagline">  March 3, 2025  </div>
            <time datetime="2024-01-01">old</time>
        </body></html>"#;
        assert_eq!(extract_date(html), "March 3, 2025");
    }

    #[test]
    fn test_extract_date_falls_back_to_time_attribute() {
        let html = r#"<html><body><time datetime="2025-03-03T10:00:00Z">3 Mar</time></body></html>"#;
        assert_eq!(extract_date(html), "2025-03-03T10:00:00Z");
    }

    #[test]
    fn test_extract_date_uses_time_text_without_attribute() {
        let html = "<html><body><time> 3 March 2025 </time></body></html>";
        assert_eq!(extract_date(html), "3 March 2025");
    }

    #[test]
    fn test_extract_date_empty_when_no_markers() {
        let html = "<html><body><p>no date here</p></body></html>";
        assert_eq!(extract_date(html), "");
    }

    #[tokio::test]
    async fn test_slug_enricher_produces_category_record() {
        let article = SlugEnricher
            .enrich(&format!("{BLOG}/2025-3-update-rewards/"))
            .await
            .unwrap();
        assert_eq!(article.category.as_deref(), Some(CATEGORY_EVENT));
        assert_eq!(article.date, None);
    }
}
