//! Error taxonomy for a watch run.
//!
//! Failures fall into three buckets:
//! - [`WatchError::Fetch`]: the network or the remote server failed us
//! - [`WatchError::Parse`]: a fetched document was malformed
//! - [`WatchError::Persistence`]: the known-articles store could not be
//!   read or written
//!
//! Fetch and parse failures during sitemap traversal are fatal to the run:
//! a truncated sitemap is indistinguishable from a complete one, so nothing
//! is persisted and the previous valid store file is left untouched.

use std::path::Path;
use thiserror::Error;

/// A failure during sitemap traversal, enrichment, or state persistence.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Network failure or non-2xx HTTP response while fetching a document.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        /// The URL that could not be fetched.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A fetched XML or HTML document could not be parsed.
    #[error("parse failed for {url}: {message}")]
    Parse {
        /// The URL of the document that failed to parse.
        url: String,
        /// Human-readable parser diagnostic.
        message: String,
    },

    /// The known-articles store file is unreadable, unwritable, or corrupt.
    #[error("known-articles store {path}: {message}")]
    Persistence {
        /// The store file path.
        path: String,
        /// Human-readable cause.
        message: String,
    },
}

impl WatchError {
    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn persistence(path: &Path, cause: impl ToString) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            message: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_error_display() {
        let e = WatchError::parse("https://example.com/sitemap.xml", "unexpected EOF");
        let msg = e.to_string();
        assert!(msg.contains("parse failed"));
        assert!(msg.contains("https://example.com/sitemap.xml"));
        assert!(msg.contains("unexpected EOF"));
    }

    #[test]
    fn test_persistence_error_display() {
        let path = PathBuf::from("known_articles.json");
        let e = WatchError::persistence(&path, "permission denied");
        assert!(e.to_string().contains("known_articles.json"));
        assert!(e.to_string().contains("permission denied"));
    }
}
