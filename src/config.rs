//! Run configuration: a YAML file for the platform list plus environment
//! variables for secrets and model selection.
//!
//! # YAML
//!
//! ```yaml
//! request_interval: 1000
//! platforms:
//!   - id: weibo
//!     name: 微博
//!   - id: zhihu
//! ai:
//!   model: deepseek-chat
//! ```
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AI_PROVIDER` | `openai` |
//! | `AI_API_KEY` | required |
//! | `AI_BASE_URL` | provider default |
//! | `AI_MODEL` | `ai.model`, then `deepseek-chat` |
//! | `FEISHU_WEBHOOK_URL` | required |
//! | `TOP_N` | `10` |

use crate::error::ConfigError;
use crate::models::Platform;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    platforms: Vec<Platform>,
    #[serde(default = "default_request_interval")]
    request_interval: u64,
    #[serde(default)]
    ai: FileAiConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileAiConfig {
    model: Option<String>,
}

fn default_request_interval() -> u64 {
    DEFAULT_REQUEST_INTERVAL_MS
}

/// Chat-completion settings.
#[derive(Clone)]
pub struct AiConfig {
    pub provider: String,
    pub api_key: String,
    /// Empty means the provider's default endpoint.
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub platforms: Vec<Platform>,
    pub request_interval_ms: u64,
    pub top_n: usize,
    pub ai: AiConfig,
    pub webhook_url: String,
}

impl AppConfig {
    /// Locate, read, and resolve the config file against the process environment.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let yaml = std::fs::read_to_string(&resolved).map_err(|source| ConfigError::Read {
            path: resolved.clone(),
            source,
        })?;
        info!(path = %resolved.display(), "Read config file");
        Self::from_yaml(&yaml, |key| std::env::var(key).ok())
    }

    /// Build a config from YAML text and an environment lookup.
    pub fn from_yaml<F>(yaml: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = serde_yaml::from_str(yaml)?;

        let top_n = match env("TOP_N") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "TOP_N",
                    value: raw.clone(),
                })?,
            None => DEFAULT_TOP_N,
        };

        let ai = AiConfig {
            provider: env("AI_PROVIDER")
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            api_key: env("AI_API_KEY").unwrap_or_default().trim().to_string(),
            base_url: env("AI_BASE_URL").unwrap_or_default().trim().to_string(),
            model: env("AI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .or(file.ai.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let config = AppConfig {
            platforms: file.platforms,
            request_interval_ms: file.request_interval,
            top_n,
            ai,
            webhook_url: env("FEISHU_WEBHOOK_URL")
                .unwrap_or_default()
                .trim()
                .to_string(),
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// Check the secrets and provider needed before any network call.
    ///
    /// `require_webhook` is false for dry runs, which never post.
    pub fn validate(&self, require_webhook: bool) -> Result<(), ConfigError> {
        if self.ai.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if require_webhook && self.webhook_url.is_empty() {
            return Err(ConfigError::MissingWebhook);
        }
        if self.ai.provider != DEFAULT_PROVIDER {
            return Err(ConfigError::UnsupportedProvider(self.ai.provider.clone()));
        }
        Ok(())
    }
}

/// Use `path` as given, else relative to the working directory.
fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let cwd_relative = std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf());
    if cwd_relative.exists() {
        return Ok(cwd_relative);
    }
    Err(ConfigError::FileNotFound {
        tried: path.to_path_buf(),
        cwd_relative,
    })
}
