//! Prompt construction and the summarizer built on a [`ChatCompletion`] backend.

use crate::error::SummarizeError;
use crate::llm::{ChatCompletion, ChatMessage};
use crate::models::PlatformResults;
use tracing::{info, instrument};

pub const SYSTEM_PROMPT: &str =
    "你是一个专业的新闻分析助手，擅长从多个平台的热点新闻中提取关键信息并生成简洁明了的总结。";
pub const TEMPERATURE: f32 = 0.7;

const PROMPT_HEADER: &[&str] = &[
    "请分析以下各平台的热点新闻，并生成一份要点总结。",
    "\n要求：",
    "1. 按主题分类整理新闻（如：科技、财经、社会、娱乐等）",
    "2. 提取每个主题的核心要点（3-5个关键信息）",
    "3. 标注重要新闻的来源平台",
    "4. 总结整体趋势和热点话题",
    "5. 使用简洁明了的语言，控制在800-1200字",
    "\n各平台热点新闻：\n",
];
const PROMPT_FOOTER: &str = "\n请开始分析并生成总结：";

/// Render the user prompt. Platforms with no items are omitted.
pub fn build_prompt(news: &PlatformResults) -> String {
    let mut lines: Vec<String> = PROMPT_HEADER.iter().map(|s| s.to_string()).collect();
    for (platform, items) in news.iter() {
        if items.is_empty() {
            continue;
        }
        lines.push(format!("\n【{platform}】"));
        lines.extend(items.iter().map(|item| format!("{}. {}", item.rank, item.title)));
    }
    lines.push(PROMPT_FOOTER.to_string());
    lines.join("\n")
}

/// Turns fetched headlines into a categorized digest.
#[derive(Debug)]
pub struct Summarizer<'a, C> {
    client: &'a C,
}

impl<'a, C> Summarizer<'a, C>
where
    C: ChatCompletion,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    #[instrument(level = "info", skip_all, fields(platforms = news.platform_count(), items = news.total_items()))]
    pub async fn summarize(&self, news: &PlatformResults) -> Result<String, SummarizeError> {
        let prompt = build_prompt(news);
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let summary = self.client.complete(&messages, TEMPERATURE).await?;
        info!(bytes = summary.len(), "AI summary generated");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::models::NewsItem;
    use std::sync::Mutex;

    struct RecordingClient {
        seen: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
        reply: Option<String>,
    }

    impl ChatCompletion for RecordingClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            temperature: f32,
        ) -> Result<String, SummarizeError> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), temperature));
            self.reply.clone().ok_or(SummarizeError::EmptyCompletion)
        }
    }

    fn sample() -> PlatformResults {
        let mut news = PlatformResults::new();
        news.insert(
            "微博",
            vec![
                NewsItem { rank: 1, title: "标题一".to_string() },
                NewsItem { rank: 3, title: "标题三".to_string() },
            ],
        );
        news.insert("知乎", vec![]);
        news.insert("百度", vec![NewsItem { rank: 1, title: "热搜".to_string() }]);
        news
    }

    #[test]
    fn test_build_prompt_lists_platforms_in_order() {
        let prompt = build_prompt(&sample());
        assert!(prompt.starts_with("请分析以下各平台的热点新闻，并生成一份要点总结。\n\n要求：\n1."));
        assert!(prompt.contains("\n各平台热点新闻：\n\n\n【微博】\n1. 标题一\n3. 标题三\n\n【百度】\n1. 热搜\n"));
        assert!(!prompt.contains("知乎"));
        assert!(prompt.ends_with("\n\n请开始分析并生成总结："));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        assert_eq!(build_prompt(&sample()), build_prompt(&sample()));
    }

    #[tokio::test]
    async fn test_summarize_sends_system_and_user_messages() {
        let client = RecordingClient {
            seen: Mutex::new(Vec::new()),
            reply: Some("digest".to_string()),
        };
        let summary = Summarizer::new(&client).summarize(&sample()).await.unwrap();
        assert_eq!(summary, "digest");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (messages, temperature) = &seen[0];
        assert_eq!(*temperature, 0.7);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, build_prompt(&sample()));
    }

    #[tokio::test]
    async fn test_summarize_propagates_failure() {
        let client = RecordingClient {
            seen: Mutex::new(Vec::new()),
            reply: None,
        };
        let err = Summarizer::new(&client).summarize(&sample()).await.unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyCompletion));
    }
}
