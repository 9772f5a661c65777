//! Fixed-delay retry decorator for news fetches.
//!
//! [`RetryFetch`] wraps any [`NewsSource`] and re-issues a failed request up
//! to `max_retries` more times, sleeping a constant `delay` between attempts.
//! Retries are only applied on the fetch side of the pipeline; summarization
//! and webhook delivery are single-shot.

use crate::error::FetchError;
use crate::fetcher::NewsSource;
use crate::models::NewsResponse;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: NewsSource,
{
    /// Wrap `inner`, allowing `max_retries` additional attempts spaced by `delay`.
    pub fn new(inner: T, max_retries: usize, delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            delay,
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .finish()
    }
}

impl<T> NewsSource for RetryFetch<T>
where
    T: NewsSource,
{
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, platform_id: &str) -> Result<NewsResponse, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(platform_id).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            platform_id,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }
                    warn!(
                        platform_id,
                        attempt,
                        max = self.max_retries,
                        delay = ?self.delay,
                        error = %e,
                        "fetch attempt failed; retrying"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}
