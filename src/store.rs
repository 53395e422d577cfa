//! Known-articles store: the durable state the watcher maintains.
//!
//! The store is a single JSON array of article records, UTF-8 with a
//! byte-order mark, 2-space indentation, and non-ASCII characters left
//! unescaped. Downstream tooling depends on that exact shape, so both
//! sides of the round trip preserve it.
//!
//! Records are kept in insertion order (discovery order), never re-sorted,
//! so saving an unchanged set is byte-stable and reruns are auditable.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! failed write cannot corrupt the previous valid file.
//!
//! An absent file is the first-run signal, not an error.

use crate::errors::WatchError;
use crate::models::{Article, KnownArticles};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const BOM: char = '\u{feff}';

/// Load the persisted known-articles set.
///
/// Returns an empty set when no prior state file exists. Any other read
/// failure, or unparseable JSON, is a [`WatchError::Persistence`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> Result<KnownArticles, WatchError> {
    match fs::read_to_string(path).await {
        Ok(text) => {
            let articles = parse_store(&text).map_err(|e| WatchError::persistence(path, e))?;
            info!(count = articles.len(), "Loaded known articles");
            Ok(articles)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No prior state file; treating as first run");
            Ok(Vec::new())
        }
        Err(e) => Err(WatchError::persistence(path, e)),
    }
}

/// Persist the known-articles set, replacing the previous file atomically.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn save(path: &Path, articles: &[Article]) -> Result<(), WatchError> {
    let body = render_store(articles).map_err(|e| WatchError::persistence(path, e))?;

    let tmp_path = sibling_tmp(path);
    fs::write(&tmp_path, &body)
        .await
        .map_err(|e| WatchError::persistence(&tmp_path, e))?;
    if let Err(e) = fs::rename(&tmp_path, path).await {
        // Don't leave the orphaned sibling behind.
        let _ = fs::remove_file(&tmp_path).await;
        return Err(WatchError::persistence(path, e));
    }

    info!("Wrote known-articles store");
    Ok(())
}

/// Parse store file content, tolerating a leading byte-order mark.
fn parse_store(text: &str) -> Result<KnownArticles, serde_json::Error> {
    serde_json::from_str(text.strip_prefix(BOM).unwrap_or(text))
}

/// Render the store file content: BOM, pretty JSON, insertion order.
fn render_store(articles: &[Article]) -> Result<String, serde_json::Error> {
    Ok(format!("{BOM}{}", serde_json::to_string_pretty(articles)?))
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coc_blog_watch_{}_{}", process::id(), name))
    }

    #[test]
    fn test_parse_store_strips_bom() {
        let text = "\u{feff}[{\"url\": \"A\", \"category\": \"announcement\"}]";
        let articles = parse_store(text).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "A");
    }

    #[test]
    fn test_parse_store_accepts_bomless_input() {
        let articles = parse_store("[]").unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn test_render_store_shape() {
        let articles = vec![Article::with_category("A", "公告類")];
        let body = render_store(&articles).unwrap();
        assert!(body.starts_with(BOM));
        // 2-space indentation, non-ASCII unescaped.
        assert!(body.contains("\n  {"));
        assert!(body.contains("公告類"));
        assert!(!body.contains("\\u"));
    }

    #[test]
    fn test_render_preserves_insertion_order() {
        let articles = vec![
            Article::with_category("Z", "announcement"),
            Article::with_category("A", "announcement"),
        ];
        let body = render_store(&articles).unwrap();
        assert!(body.find("\"Z\"").unwrap() < body.find("\"A\"").unwrap());
    }

    #[test]
    fn test_render_is_byte_stable() {
        let articles = vec![Article::with_date("A", "2025-03-03")];
        assert_eq!(render_store(&articles).unwrap(), render_store(&articles).unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_first_run() {
        let path = scratch_path("missing.json");
        let articles = load(&path).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let path = scratch_path("roundtrip.json");
        let articles = vec![
            Article::with_date("https://example.com/blog/a", "2025-03-03"),
            Article::with_date("https://example.com/blog/b", ""),
        ];
        save(&path, &articles).await.unwrap();

        let loaded = load(&path).await.unwrap();
        assert_eq!(loaded, articles);

        // Raw bytes carry the UTF-8 BOM for downstream tooling.
        let raw = tokio::fs::read(&path).await.unwrap();
        assert_eq!(&raw[..3], &[0xEF, 0xBB, 0xBF]);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up_temp_file() {
        // A directory at the store path makes the rename fail after the
        // temp write has succeeded.
        let path = scratch_path("rename_blocked");
        tokio::fs::create_dir(&path).await.unwrap();

        let result = save(&path, &[Article::with_category("A", "announcement")]).await;
        assert!(matches!(result, Err(WatchError::Persistence { .. })));
        assert!(!sibling_tmp(&path).exists());

        tokio::fs::remove_dir(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_store_is_persistence_error() {
        let path = scratch_path("corrupt.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        let result = load(&path).await;
        assert!(matches!(result, Err(WatchError::Persistence { .. })));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
