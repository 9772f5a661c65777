//! Sequential webhook delivery of report batches.
//!
//! Batches are posted one at a time in document order. The first failure
//! stops the sequence; later batches are never attempted and nothing is
//! retried. Successful batches are followed by a fixed pause (except the
//! last) to stay under the receiver's rate limit.
//!
//! Delivery failure is reported through [`DeliveryOutcome`] rather than
//! raised, since the summary itself was produced successfully.

use crate::error::DeliveryError;
use crate::models::{WebhookContent, WebhookPayload, WebhookReply};
use crate::utils::truncate_for_log;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);
pub const BATCH_INTERVAL: Duration = Duration::from_secs(3);
pub const MSG_TYPE: &str = "text";
pub const REPORT_TYPE: &str = "AI 总结报告";

/// A webhook endpoint that accepts one payload per call.
pub trait WebhookTransport {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError>;
}

/// Feishu custom-bot webhook.
#[derive(Debug, Clone)]
pub struct FeishuWebhook {
    client: reqwest::Client,
    url: String,
}

impl FeishuWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl WebhookTransport for FeishuWebhook {
    async fn post(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        check_reply(status, &body)
    }
}

/// A batch succeeded iff HTTP 200 and the body carries a zero status code.
pub fn check_reply(status: u16, body: &str) -> Result<(), DeliveryError> {
    if status != 200 {
        return Err(DeliveryError::HttpStatus(status));
    }
    let reply: WebhookReply = serde_json::from_str(body).map_err(|e| {
        DeliveryError::Rejected(format!(
            "unreadable response ({e}): {}",
            truncate_for_log(body, 200)
        ))
    })?;
    if reply.is_ok() {
        Ok(())
    } else {
        Err(DeliveryError::Rejected(reply.error_message()))
    }
}

/// Result of posting one batch.
#[derive(Debug)]
pub struct BatchAttempt {
    /// 1-based batch number.
    pub index: usize,
    pub bytes: usize,
    pub result: Result<(), DeliveryError>,
}

#[derive(Debug)]
pub struct DeliveryOutcome {
    pub total_batches: usize,
    pub attempts: Vec<BatchAttempt>,
}

impl DeliveryOutcome {
    /// True iff every batch was attempted and accepted.
    pub fn succeeded(&self) -> bool {
        self.attempts.len() == self.total_batches && self.attempts.iter().all(|a| a.result.is_ok())
    }

    pub fn first_error(&self) -> Option<&DeliveryError> {
        self.attempts.iter().find_map(|a| a.result.as_ref().err())
    }
}

pub fn build_payload(text: &str, timestamp: &str) -> WebhookPayload {
    WebhookPayload {
        msg_type: MSG_TYPE,
        content: WebhookContent {
            total_titles: 0,
            timestamp: timestamp.to_string(),
            report_type: REPORT_TYPE,
            text: text.to_string(),
        },
    }
}

/// Posts batches through a [`WebhookTransport`] in order.
#[derive(Debug)]
pub struct Deliverer<T> {
    transport: T,
    interval: Duration,
}

impl<T> Deliverer<T>
where
    T: WebhookTransport,
{
    pub fn new(transport: T) -> Self {
        Self::with_interval(transport, BATCH_INTERVAL)
    }

    pub fn with_interval(transport: T, interval: Duration) -> Self {
        Self {
            transport,
            interval,
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post `batches` one by one, stopping at the first failure.
    ///
    /// # Arguments
    ///
    /// * `batches` - Report chunks in send order.
    /// * `timestamp` - Report time copied into every payload.
    ///
    /// # Returns
    ///
    /// A [`DeliveryOutcome`] listing every attempted batch. Batches after a
    /// failure are not attempted and do not appear in it.
    #[instrument(level = "info", skip_all, fields(batches = batches.len()))]
    pub async fn deliver(&self, batches: &[String], timestamp: &str) -> DeliveryOutcome {
        let total = batches.len();
        let mut attempts = Vec::with_capacity(total);
        info!(total, "Delivering report");

        for (i, text) in batches.iter().enumerate() {
            let index = i + 1;
            let bytes = text.len();
            info!(batch = index, total, bytes, "Sending batch");

            let result = self.transport.post(&build_payload(text, timestamp)).await;
            let failed = result.is_err();
            match &result {
                Ok(()) => info!(batch = index, total, "Batch delivered"),
                Err(e) => error!(batch = index, total, error = %e, "Batch delivery failed; skipping remaining batches"),
            }
            attempts.push(BatchAttempt {
                index,
                bytes,
                result,
            });

            if failed {
                break;
            }
            if index < total {
                sleep(self.interval).await;
            }
        }

        let outcome = DeliveryOutcome {
            total_batches: total,
            attempts,
        };
        if outcome.succeeded() {
            info!(total, "All batches delivered");
        }
        outcome
    }
}
