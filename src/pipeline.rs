//! Orchestration of one run: fetch → summarize → render → split → deliver.
//!
//! Every run is stateless. Configuration is validated before any client is
//! built, so a missing secret fails without touching the network.

use crate::batch::{DEFAULT_BATCH_BYTES, split_batches};
use crate::config::AppConfig;
use crate::deliver::{Deliverer, FeishuWebhook, WebhookTransport};
use crate::error::AppError;
use crate::fetcher::{NewsNowFetcher, NewsSource, fetch_top_news};
use crate::llm::{ChatCompletion, OpenAiClient};
use crate::report::{beijing_now, payload_timestamp, render};
use crate::summarize::Summarizer;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// How a non-fatal run ended. All variants exit 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No platform returned any headline; nothing was summarized.
    NoNews,
    /// Every batch reached the webhook.
    Delivered { batches: usize },
    /// The summary exists but at least one batch was not delivered.
    DeliveryFailed { delivered: usize, batches: usize },
    /// Dry run: the report was rendered and split but not posted.
    DryRun { batches: usize },
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        0
    }
}

/// Validate `config`, build the real HTTP clients, and run the pipeline.
#[instrument(level = "info", skip_all, fields(dry_run = dry_run))]
pub async fn run(config: &AppConfig, dry_run: bool) -> Result<RunOutcome, AppError> {
    config.validate(!dry_run)?;

    let source = NewsNowFetcher::new()?.with_retries();
    let llm = OpenAiClient::new(&config.ai)?;
    info!(model = llm.model(), provider = %config.ai.provider, "AI client ready");

    if dry_run {
        return run_with::<_, _, FeishuWebhook>(config, &source, &llm, None, beijing_now()).await;
    }

    let deliverer = Deliverer::new(FeishuWebhook::new(config.webhook_url.clone())?);
    run_with(config, &source, &llm, Some(&deliverer), beijing_now()).await
}

/// Run the pipeline over explicit collaborators. `deliverer = None` is a dry run.
pub async fn run_with<S, C, W>(
    config: &AppConfig,
    source: &S,
    llm: &C,
    deliverer: Option<&Deliverer<W>>,
    now: DateTime<FixedOffset>,
) -> Result<RunOutcome, AppError>
where
    S: NewsSource,
    C: ChatCompletion,
    W: WebhookTransport,
{
    info!(
        platforms = config.platforms.len(),
        top_n = config.top_n,
        interval_ms = config.request_interval_ms,
        "Fetching trending news"
    );
    let news = fetch_top_news(
        source,
        &config.platforms,
        config.top_n,
        Duration::from_millis(config.request_interval_ms),
    )
    .await;

    let total = news.total_items();
    info!(platforms = news.platform_count(), items = total, "Fetch complete");
    if total == 0 {
        warn!("No news fetched from any platform (network issue or sources unavailable); exiting");
        return Ok(RunOutcome::NoNews);
    }

    let summary = Summarizer::new(llm).summarize(&news).await?;

    let content = render(&summary, &now);
    let batches = split_batches(&content, DEFAULT_BATCH_BYTES);
    info!(batches = batches.len(), bytes = content.len(), "Report split for delivery");

    let Some(deliverer) = deliverer else {
        for (i, batch) in batches.iter().enumerate() {
            info!(batch = i + 1, bytes = batch.len(), "Dry run; not sending:\n{batch}");
        }
        return Ok(RunOutcome::DryRun {
            batches: batches.len(),
        });
    };

    let outcome = deliverer.deliver(&batches, &payload_timestamp(&now)).await;
    if outcome.succeeded() {
        Ok(RunOutcome::Delivered {
            batches: outcome.total_batches,
        })
    } else {
        if let Some(failed) = outcome.attempts.last() {
            warn!(
                batch = failed.index,
                bytes = failed.bytes,
                error = ?outcome.first_error().map(|e| e.to_string()),
                "Summary was generated but webhook delivery failed; check FEISHU_WEBHOOK_URL"
            );
        }
        Ok(RunOutcome::DeliveryFailed {
            delivered: outcome.attempts.iter().filter(|a| a.result.is_ok()).count(),
            batches: outcome.total_batches,
        })
    }
}
