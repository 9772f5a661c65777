//! Data models shared across the pipeline.
//!
//! - [`Platform`]: a configured news source
//! - [`NewsItem`] / [`PlatformResults`]: normalized top-N headlines per platform
//! - [`NewsResponse`]: the aggregator's raw JSON body
//! - [`WebhookPayload`] / [`WebhookReply`]: the Feishu webhook wire format

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured news platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Platform {
    /// Short id used in the aggregator query string.
    pub id: String,
    /// Display name; falls back to `id` when omitted.
    #[serde(default)]
    pub name: Option<String>,
}

impl Platform {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// One headline with its 1-based position in the upstream list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub rank: usize,
    pub title: String,
}

/// Headlines keyed by platform display name, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformResults {
    entries: Vec<(String, Vec<NewsItem>)>,
}

impl PlatformResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a platform's items. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, items: Vec<NewsItem>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = items,
            None => self.entries.push((name, items)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NewsItem])> {
        self.entries
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn platform_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_items(&self) -> usize {
        self.entries.iter().map(|(_, items)| items.len()).sum()
    }
}

/// Raw aggregator response. Only `status` and `items[].title` matter.
#[derive(Debug, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

impl NewsResponse {
    pub fn is_usable(&self) -> bool {
        matches!(self.status.as_str(), "success" | "cache")
    }
}

/// An upstream item. The title may be missing, null, a string, or a number.
#[derive(Debug, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<Value>,
}

impl RawItem {
    /// Trimmed title text, or `None` when absent or blank.
    pub fn title_text(&self) -> Option<String> {
        let text = match self.title.as_ref()? {
            Value::String(s) => s.trim().to_string(),
            Value::Null => return None,
            other => other.to_string().trim().to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Feishu webhook request body.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub msg_type: &'static str,
    pub content: WebhookContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookContent {
    /// Reserved by the receiving side; always zero.
    pub total_titles: u32,
    pub timestamp: String,
    pub report_type: &'static str,
    pub text: String,
}

/// Feishu webhook response body. Both status field spellings are seen in the wild.
///
/// Fields are kept loosely typed so an odd value under one key does not hide
/// a valid zero under the other.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookReply {
    #[serde(rename = "StatusCode", default)]
    pub status_code: Option<Value>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub msg: Option<Value>,
    #[serde(rename = "StatusMessage", default)]
    pub status_message: Option<Value>,
}

fn is_zero(v: &Option<Value>) -> bool {
    match v {
        Some(Value::Number(n)) => n.as_i64() == Some(0) || n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn non_empty_text(v: &Option<Value>) -> Option<String> {
    match v.as_ref()? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl WebhookReply {
    pub fn is_ok(&self) -> bool {
        is_zero(&self.status_code) || is_zero(&self.code)
    }

    pub fn error_message(&self) -> String {
        non_empty_text(&self.msg)
            .or_else(|| non_empty_text(&self.status_message))
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_display_name_falls_back_to_id() {
        let p: Platform = serde_yaml::from_str("id: weibo").unwrap();
        assert_eq!(p.display_name(), "weibo");

        let p: Platform = serde_yaml::from_str("id: weibo\nname: 微博").unwrap();
        assert_eq!(p.display_name(), "微博");
    }

    #[test]
    fn test_platform_results_keeps_insertion_order() {
        let mut results = PlatformResults::new();
        results.insert("b", vec![]);
        results.insert(
            "a",
            vec![NewsItem {
                rank: 1,
                title: "x".to_string(),
            }],
        );
        results.insert("b", vec![NewsItem {
            rank: 1,
            title: "y".to_string(),
        }]);

        let names: Vec<&str> = results.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(results.platform_count(), 2);
        assert_eq!(results.total_items(), 2);
    }

    #[test]
    fn test_news_response_status() {
        let json = r#"{"status": "cache", "items": [{"title": " hi "}, {"url": "x"}, {"title": 42}]}"#;
        let resp: NewsResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_usable());
        assert_eq!(resp.items[0].title_text().as_deref(), Some("hi"));
        assert_eq!(resp.items[1].title_text(), None);
        assert_eq!(resp.items[2].title_text().as_deref(), Some("42"));

        let resp: NewsResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(!resp.is_usable());
    }

    #[test]
    fn test_webhook_reply_accepts_either_status_field() {
        let reply: WebhookReply = serde_json::from_str(r#"{"StatusCode": 0}"#).unwrap();
        assert!(reply.is_ok());
        let reply: WebhookReply = serde_json::from_str(r#"{"code": 0, "msg": "success"}"#).unwrap();
        assert!(reply.is_ok());
        let reply: WebhookReply =
            serde_json::from_str(r#"{"code": 19001, "msg": "param invalid"}"#).unwrap();
        assert!(!reply.is_ok());
        assert_eq!(reply.error_message(), "param invalid");
        let reply: WebhookReply = serde_json::from_str("{}").unwrap();
        assert!(!reply.is_ok());
        assert_eq!(reply.error_message(), "unknown error");
    }

    #[test]
    fn test_webhook_reply_tolerates_odd_field_types() {
        let reply: WebhookReply =
            serde_json::from_str(r#"{"StatusCode": "n/a", "code": 0}"#).unwrap();
        assert!(reply.is_ok());
        let reply: WebhookReply =
            serde_json::from_str(r#"{"StatusCode": 0.0, "code": null}"#).unwrap();
        assert!(reply.is_ok());
        let reply: WebhookReply =
            serde_json::from_str(r#"{"code": "0", "msg": 19021}"#).unwrap();
        assert!(!reply.is_ok());
        assert_eq!(reply.error_message(), "19021");
    }

    #[test]
    fn test_webhook_payload_shape() {
        let payload = WebhookPayload {
            msg_type: "text",
            content: WebhookContent {
                total_titles: 0,
                timestamp: "2025-05-06 20:30:00".to_string(),
                report_type: "AI 总结报告",
                text: "hello".to_string(),
            },
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["msg_type"], "text");
        assert_eq!(v["content"]["total_titles"], 0);
        assert_eq!(v["content"]["timestamp"], "2025-05-06 20:30:00");
        assert_eq!(v["content"]["text"], "hello");
    }
}
