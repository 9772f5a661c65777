//! Error taxonomy for the digest pipeline.
//!
//! Each stage owns its error type. Only configuration and summarization
//! failures abort a run; fetch failures are absorbed per platform and
//! delivery failures are reported through [`crate::deliver::DeliveryOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Problems resolving or validating the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found (tried {tried:?} and {cwd_relative:?})")]
    FileNotFound {
        tried: PathBuf,
        cwd_relative: PathBuf,
    },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("AI_API_KEY is not configured")]
    MissingApiKey,

    #[error("FEISHU_WEBHOOK_URL is not configured")]
    MissingWebhook,

    #[error("unsupported AI provider `{0}` (only `openai` is supported)")]
    UnsupportedProvider(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// A single platform fetch attempt that did not yield usable data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected upstream status `{0}`")]
    Status(String),
}

/// The chat-completion call failed; no summary exists.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion contained no content")]
    EmptyCompletion,
}

/// One webhook submission that did not succeed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("webhook rejected message: {0}")]
    Rejected(String),
}

/// Fatal pipeline errors surfaced to `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("AI summary failed: {0}")]
    Summarize(#[from] SummarizeError),
}

impl AppError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::HttpClient(_) | AppError::Summarize(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_exit_one() {
        assert_eq!(AppError::from(ConfigError::MissingApiKey).exit_code(), 1);
        assert_eq!(
            AppError::from(SummarizeError::EmptyCompletion).exit_code(),
            1
        );
    }

    #[test]
    fn test_error_messages() {
        let err = DeliveryError::HttpStatus(500);
        assert_eq!(err.to_string(), "webhook returned HTTP 500");

        let err = ConfigError::InvalidValue {
            key: "TOP_N",
            value: "ten".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for TOP_N: \"ten\"");
    }
}
