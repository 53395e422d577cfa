//! HTTP transport with exponential backoff retry logic.
//!
//! All remote documents (the sitemap index, leaf sitemaps, and article pages
//! for the date strategy) come through this module. It exposes a trait-based
//! design:
//! - [`FetchAsync`]: core trait defining "fetch(url) -> text or failure"
//! - [`HttpFetcher`]: reqwest-backed implementation with a configured
//!   `User-Agent`
//! - [`RetryFetch`]: decorator that adds retry logic to any [`FetchAsync`]
//!   implementation
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//!
//! Retries are transport-internal; once they are exhausted the failure
//! surfaces as [`WatchError::Fetch`] and the run aborts.
//!
//! # Encoding
//!
//! Remote documents occasionally misreport their charset, so response bodies
//! are decoded as UTF-8 unconditionally rather than trusting the declared
//! encoding. Lossy decoding keeps non-ASCII path segments intact for
//! well-formed documents and never fails.

use crate::errors::WatchError;
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for async document retrieval.
///
/// The sitemap and enrichment code is generic over this trait so tests can
/// substitute canned fixtures for the network.
pub trait FetchAsync {
    /// Fetch the document at `url` and return its body as UTF-8 text.
    async fn fetch(&self, url: &str) -> Result<String, WatchError>;
}

/// reqwest-backed [`FetchAsync`] implementation.
///
/// The client carries the configured `User-Agent` as a default header on
/// every outbound request. Non-2xx responses are failures.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests identify themselves as `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, WatchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WatchError::fetch(url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WatchError::fetch(url, e))?;

        // Forced UTF-8; the declared charset is not trusted.
        let body = String::from_utf8_lossy(&bytes).into_owned();
        debug!(bytes = body.len(), "Fetched document");
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`]
/// implementation.
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    /// Wrap `inner` with up to `max_retries` retry attempts.
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync + fmt::Debug,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, WatchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => {
                    return Ok(body);
                }
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
