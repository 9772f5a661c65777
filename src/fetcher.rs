//! Trending-headline fetcher for the NewsNow aggregator.
//!
//! The aggregator exposes one endpoint keyed by platform id:
//! `https://newsnow.busiyi.world/api/s?id=<id>&latest`. A body whose `status`
//! is `success` or `cache` carries an `items` array of `{title, ...}` objects.
//!
//! Platforms are fetched strictly one after another in configured order,
//! with a fixed pause between them. A platform that still fails after its
//! retries contributes an empty list instead of aborting the run.

use crate::error::FetchError;
use crate::models::{NewsItem, NewsResponse, Platform, PlatformResults, RawItem};
use crate::retry::RetryFetch;
use futures::stream::{self, StreamExt};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;

pub const NEWSNOW_ENDPOINT: &str = "https://newsnow.busiyi.world/api/s";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const FETCH_MAX_RETRIES: usize = 2;
pub const FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Something that can return the current item list for a platform id.
pub trait NewsSource {
    async fn fetch(&self, platform_id: &str) -> Result<NewsResponse, FetchError>;
}

/// Single-attempt HTTP client for the aggregator.
#[derive(Debug, Clone)]
pub struct NewsNowFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl NewsNowFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_endpoint(NEWSNOW_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The aggregator wraps this fetcher in the standard fixed-delay retry policy.
    pub fn with_retries(self) -> RetryFetch<Self> {
        RetryFetch::new(self, FETCH_MAX_RETRIES, FETCH_RETRY_DELAY)
    }

    fn url_for(&self, platform_id: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse_with_params(&self.endpoint, &[("id", platform_id)])?;
        url.query_pairs_mut().append_key_only("latest");
        Ok(url)
    }
}

impl NewsSource for NewsNowFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, platform_id: &str) -> Result<NewsResponse, FetchError> {
        let url = self.url_for(platform_id)?;
        let resp: NewsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !resp.is_usable() {
            return Err(FetchError::Status(resp.status));
        }
        Ok(resp)
    }
}

/// Keep the first `top_n` upstream items, dropping blank titles.
///
/// Ranks are positions in the upstream list, so a dropped item leaves a gap.
pub fn top_items(items: &[RawItem], top_n: usize) -> Vec<NewsItem> {
    items
        .iter()
        .take(top_n)
        .enumerate()
        .filter_map(|(idx, item)| {
            item.title_text().map(|title| NewsItem {
                rank: idx + 1,
                title,
            })
        })
        .collect()
}

/// Fetch every platform in order, pausing `interval` between requests.
///
/// # Arguments
///
/// * `source` - Where headlines come from; usually a retrying [`NewsNowFetcher`].
/// * `platforms` - Platforms to query, in report order.
/// * `top_n` - Number of leading upstream items to keep per platform.
/// * `interval` - Pause after each platform except the last.
///
/// # Returns
///
/// A [`PlatformResults`] with one entry per platform. A platform whose fetch
/// failed is logged and recorded with no items rather than aborting the run.
#[instrument(level = "info", skip_all, fields(platforms = platforms.len(), top_n = top_n))]
pub async fn fetch_top_news<S>(
    source: &S,
    platforms: &[Platform],
    top_n: usize,
    interval: Duration,
) -> PlatformResults
where
    S: NewsSource,
{
    let total = platforms.len();
    let fetched: Vec<(String, Vec<NewsItem>)> = stream::iter(platforms.iter().enumerate())
        .then(|(i, platform)| async move {
            let name = platform.display_name().to_string();
            info!(step = i + 1, total, platform = %name, "Fetching platform");

            let items = match source.fetch(&platform.id).await {
                Ok(resp) => {
                    let items = top_items(&resp.items, top_n);
                    info!(platform = %name, count = items.len(), "Fetched headlines");
                    items
                }
                Err(e) => {
                    warn!(platform = %name, error = %e, "Fetch failed; recording empty result");
                    Vec::new()
                }
            };

            if i + 1 < total {
                sleep(interval).await;
            }
            (name, items)
        })
        .collect()
        .await;

    let mut results = PlatformResults::new();
    for (name, items) in fetched {
        results.insert(name, items);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn raw(title: Option<&str>) -> RawItem {
        RawItem {
            title: title.map(|t| serde_json::Value::String(t.to_string())),
        }
    }

    /// Serves canned responses and records the order of requested ids.
    struct FakeSource {
        calls: Mutex<Vec<String>>,
    }

    impl NewsSource for FakeSource {
        async fn fetch(&self, platform_id: &str) -> Result<NewsResponse, FetchError> {
            self.calls.lock().unwrap().push(platform_id.to_string());
            match platform_id {
                "down" => Err(FetchError::Status("error".to_string())),
                _ => Ok(NewsResponse {
                    status: "success".to_string(),
                    items: vec![raw(Some("one")), raw(Some("two")), raw(Some("three"))],
                }),
            }
        }
    }

    fn platform(id: &str, name: Option<&str>) -> Platform {
        Platform {
            id: id.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_top_news_paces_between_platforms() {
        let source = FakeSource {
            calls: Mutex::new(Vec::new()),
        };
        let platforms = vec![
            platform("weibo", None),
            platform("down", None),
            platform("zhihu", None),
        ];
        let t0 = tokio::time::Instant::now();
        fetch_top_news(&source, &platforms, 10, Duration::from_millis(1500)).await;
        let elapsed = t0.elapsed();

        // a failed platform still waits; the last one does not
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(4500), "elapsed {elapsed:?}");
    }

    #[test]
    fn test_top_items_truncates_and_keeps_ranks() {
        let items = vec![raw(Some(" a ")), raw(Some("   ")), raw(None), raw(Some("d")), raw(Some("e"))];
        let top = top_items(&items, 4);
        assert_eq!(
            top,
            vec![
                NewsItem { rank: 1, title: "a".to_string() },
                NewsItem { rank: 4, title: "d".to_string() },
            ]
        );
    }

    #[test]
    fn test_top_items_zero() {
        assert!(top_items(&[raw(Some("a"))], 0).is_empty());
    }

    #[test]
    fn test_url_for() {
        let fetcher = NewsNowFetcher::new().unwrap();
        let url = fetcher.url_for("weibo").unwrap();
        assert_eq!(url.as_str(), "https://newsnow.busiyi.world/api/s?id=weibo&latest");
    }

    #[tokio::test]
    async fn test_fetch_top_news_order_and_failures() {
        let source = FakeSource {
            calls: Mutex::new(Vec::new()),
        };
        let platforms = vec![
            platform("weibo", Some("微博")),
            platform("down", Some("Broken")),
            platform("zhihu", None),
        ];
        let results = fetch_top_news(&source, &platforms, 2, Duration::ZERO).await;

        assert_eq!(*source.calls.lock().unwrap(), vec!["weibo", "down", "zhihu"]);
        let collected: Vec<(&str, usize)> = results.iter().map(|(n, i)| (n, i.len())).collect();
        assert_eq!(collected, vec![("微博", 2), ("Broken", 0), ("zhihu", 2)]);
        assert_eq!(results.total_items(), 4);
    }
}
