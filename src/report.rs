//! Report rendering in Beijing civil time (UTC+8).

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};

const BEIJING_OFFSET_SECS: i32 = 8 * 3600;

/// UTC+8, which has no daylight saving.
pub fn beijing() -> FixedOffset {
    FixedOffset::east_opt(BEIJING_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn beijing_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&beijing())
}

/// `2025年05月06日 20:30:00`, shown in the report header.
pub fn header_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.with_timezone(&beijing())
        .format("%Y年%m月%d日 %H:%M:%S")
        .to_string()
}

/// `2025-05-06 20:30:00`, sent in the webhook payload.
pub fn payload_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.with_timezone(&beijing())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Wrap a raw summary in the report header and footer.
pub fn render<Tz: TimeZone>(summary: &str, now: &DateTime<Tz>) -> String {
    format!(
        "**📊 热点新闻 AI 总结报告**\n\n**生成时间：** {}\n\n---\n\n{}\n\n---\n\n*本报告由 NewsCatcher 自动生成*",
        header_timestamp(now),
        summary
    )
}
