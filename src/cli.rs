//! Command-line interface definitions for Hot News Digest.
//!
//! Secrets and model selection come from the environment (see
//! [`crate::config`]); the CLI only picks the config file and run mode.

use clap::Parser;
use std::path::PathBuf;

/// Fetch trending headlines, summarize them with an LLM, and push the digest to Feishu.
///
/// # Examples
///
/// ```sh
/// # Uses ./config.yaml
/// hot_news_digest
///
/// # Explicit config, no webhook post
/// hot_news_digest --config ./deploy/config.yaml --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Fetch and summarize, but log the batches instead of posting them
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["hot_news_digest", "--config", "/etc/news.yaml", "--dry-run"]);
        assert_eq!(cli.config, PathBuf::from("/etc/news.yaml"));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["hot_news_digest", "-c", "/tmp/config.yaml"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/config.yaml"));
        assert!(!cli.dry_run);
    }
}
