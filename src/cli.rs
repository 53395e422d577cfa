//! Command-line interface and run configuration.
//!
//! Every knob can be set via a flag or an environment variable and defaults
//! to the Clash of Clans zh-blog constants, so a bare invocation watches
//! the original target. The parsed CLI collapses into a plain [`Config`]
//! handed to the pipeline, so tests substitute configuration without
//! touching process-wide state.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the blog watcher.
///
/// # Examples
///
/// ```sh
/// # Watch with slug classification (default)
/// coc_blog_watch
///
/// # Scrape publication dates instead
/// coc_blog_watch --strategy date
///
/// # Point at a different store file
/// coc_blog_watch --store-path /var/lib/watch/known_articles.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the top-level sitemap index to traverse
    #[arg(
        long,
        env = "SITEMAP_INDEX_URL",
        default_value = "https://supercell.com/sitemap.xml"
    )]
    pub sitemap_index_url: String,

    /// Path keyword a page URL must contain to count as a blog article
    #[arg(
        long,
        env = "BLOG_PATH_KEYWORD",
        default_value = "/en/games/clashofclans/zh/blog/"
    )]
    pub path_keyword: String,

    /// Known-articles JSON store file
    #[arg(short, long, env = "KNOWN_ARTICLES_FILE", default_value = "known_articles.json")]
    pub store_path: PathBuf,

    /// User-Agent header for outbound requests
    #[arg(
        long,
        env = "WATCH_USER_AGENT",
        default_value = "Mozilla/5.0 (compatible; MyCrawler/1.0; +https://example.com/bot)"
    )]
    pub user_agent: String,

    /// Enrichment strategy applied to each newly discovered article
    #[arg(long, value_enum, default_value_t = Strategy::Category)]
    pub strategy: Strategy,
}

/// Which enrichment strategy a run uses. The two are never mixed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scrape a publication date from each article page.
    Date,
    /// Classify each article from its URL slug, without fetching the page.
    Category,
}

/// Resolved run configuration passed into the pipeline driver.
#[derive(Debug, Clone)]
pub struct Config {
    pub sitemap_index_url: String,
    pub path_keyword: String,
    pub store_path: PathBuf,
    pub user_agent: String,
    pub strategy: Strategy,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            sitemap_index_url: self.sitemap_index_url,
            path_keyword: self.path_keyword,
            store_path: self.store_path,
            user_agent: self.user_agent,
            strategy: self.strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_watched_site() {
        let cli = Cli::parse_from(["coc_blog_watch"]);
        assert_eq!(cli.sitemap_index_url, "https://supercell.com/sitemap.xml");
        assert_eq!(cli.path_keyword, "/en/games/clashofclans/zh/blog/");
        assert_eq!(cli.store_path, PathBuf::from("known_articles.json"));
        assert_eq!(cli.strategy, Strategy::Category);
    }

    #[test]
    fn test_strategy_flag() {
        let cli = Cli::parse_from(["coc_blog_watch", "--strategy", "date"]);
        assert_eq!(cli.strategy, Strategy::Date);
    }

    #[test]
    fn test_into_config_carries_overrides() {
        let cli = Cli::parse_from([
            "coc_blog_watch",
            "--sitemap-index-url",
            "https://example.com/sitemap.xml",
            "-s",
            "/tmp/known.json",
        ]);
        let config = cli.into_config();
        assert_eq!(config.sitemap_index_url, "https://example.com/sitemap.xml");
        assert_eq!(config.store_path, PathBuf::from("/tmp/known.json"));
    }
}
