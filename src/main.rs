//! # Hot News Digest
//!
//! Polls the NewsNow aggregator for each configured platform's trending
//! headlines, asks an OpenAI-compatible model for a categorized digest, and
//! pushes the digest to a Feishu webhook, split into size-bounded batches.
//!
//! ## Usage
//!
//! ```sh
//! AI_API_KEY=sk-... FEISHU_WEBHOOK_URL=https://open.feishu.cn/... hot_news_digest -c config.yaml
//! ```
//!
//! ## Architecture
//!
//! Each run is a single linear pipeline with no retained state:
//! 1. **Config**: YAML platform list plus environment secrets
//! 2. **Fetch**: sequential, paced, retried per platform
//! 3. **Summarize**: one chat-completion call
//! 4. **Deliver**: render, split on paragraph boundaries, post batches in order
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | delivered, nothing fetched, or delivery failed after a successful summary |
//! | 1 | configuration or summarization failure |
//! | 130 | interrupted |

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod batch;
mod cli;
mod config;
mod deliver;
mod error;
mod fetcher;
mod llm;
mod models;
mod pipeline;
mod report;
mod retry;
mod summarize;
mod utils;

use cli::Cli;
use config::AppConfig;
use error::AppError;
use pipeline::RunOutcome;

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    info!(config = %args.config.display(), dry_run = args.dry_run, "hot_news_digest starting up");

    let work = async {
        match run(&args).await {
            Ok(outcome) => {
                report_outcome(&outcome);
                outcome.exit_code()
            }
            Err(e) => {
                error!(error = %e, "Run failed");
                e.exit_code()
            }
        }
    };
    let code = until_interrupted(work, tokio::signal::ctrl_c()).await;

    let elapsed = start_time.elapsed();
    info!(?elapsed, exit_code = code, "Execution complete");
    ExitCode::from(code)
}

async fn run(args: &Cli) -> Result<RunOutcome, AppError> {
    let config = AppConfig::load(&args.config)?;
    let base_url = if config.ai.base_url.is_empty() {
        "default"
    } else {
        config.ai.base_url.as_str()
    };
    info!(
        platforms = config.platforms.len(),
        top_n = config.top_n,
        model = %config.ai.model,
        provider = %config.ai.provider,
        base_url,
        api_key_set = !config.ai.api_key.is_empty(),
        webhook_set = !config.webhook_url.is_empty(),
        "Configuration loaded"
    );
    pipeline::run(&config, args.dry_run).await
}

/// Resolve to `work`'s exit code, or [`EXIT_INTERRUPTED`] once `signal` fires.
/// A signal listener that fails to install never interrupts the run.
async fn until_interrupted<W, S>(work: W, signal: S) -> u8
where
    W: Future<Output = u8>,
    S: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        code = work => code,
        Ok(()) = signal => {
            warn!("Interrupted by user");
            EXIT_INTERRUPTED
        }
    }
}

fn report_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoNews => warn!("No news fetched; nothing to summarize"),
        RunOutcome::Delivered { batches } => info!(batches, "Digest delivered"),
        RunOutcome::DeliveryFailed { delivered, batches } => warn!(
            delivered,
            batches,
            "Digest generated but Feishu delivery failed"
        ),
        RunOutcome::DryRun { batches } => info!(batches, "Dry run complete"),
    }
}
