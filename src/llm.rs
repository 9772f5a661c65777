//! OpenAI-compatible chat-completion client.
//!
//! The client is built explicitly from [`AiConfig`] for each run and handed
//! to the summarizer by reference; nothing here is process-global. Any
//! endpoint speaking the `/chat/completions` dialect works (OpenAI,
//! DeepSeek, and most self-hosted gateways).

use crate::config::AiConfig;
use crate::error::SummarizeError;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Completions for a full digest routinely take tens of seconds.
pub const LLM_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A chat-completion backend: messages in, first choice's text out.
pub trait ChatCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, SummarizeError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Bearer-authenticated client for one provider endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Build a client for the endpoint and model in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Provider settings; an empty `base_url` selects [`DEFAULT_BASE_URL`]
    ///
    /// # Returns
    ///
    /// The client, or the `reqwest` error raised when the TLS backend cannot
    /// be initialised.
    pub fn new(config: &AiConfig) -> Result<Self, reqwest::Error> {
        Self::with_timeout(config, LLM_TIMEOUT)
    }

    /// Like [`OpenAiClient::new`] with an explicit per-request timeout.
    pub fn with_timeout(config: &AiConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            config.base_url.as_str()
        };
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletion for OpenAiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %truncate_for_log(&body, 300), "Chat completion API error");
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response = response.json::<CompletionResponse>().await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(SummarizeError::EmptyCompletion)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = content.chars().count(),
            "Chat completion succeeded"
        );
        Ok(content)
    }
}
