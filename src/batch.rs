//! Size-bounded splitting of a rendered report for webhook delivery.
//!
//! Lengths are UTF-8 byte counts, which is what the webhook measures; CJK
//! text is three bytes per character so character counts would undershoot.
//!
//! Splitting is greedy on paragraph boundaries (`\n\n`). A paragraph that is
//! larger than the limit on its own becomes a single over-limit batch; it is
//! not cut further.

use tracing::{debug, warn};

/// Webhook payloads are capped near 30 KB; leave room for the JSON envelope.
pub const DEFAULT_BATCH_BYTES: usize = 29_000;
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split `content` into ordered batches of at most `limit` bytes each.
///
/// Joining the result with [`PARAGRAPH_SEPARATOR`] reproduces `content`.
///
/// # Arguments
///
/// * `content` - The rendered report.
/// * `limit` - Maximum batch size in UTF-8 bytes.
///
/// # Returns
///
/// The batches in document order. Empty input yields no batches; a paragraph
/// longer than `limit` is returned alone as an over-limit batch.
pub fn split_batches(content: &str, limit: usize) -> Vec<String> {
    if content.len() <= limit {
        return vec![content.to_string()];
    }

    let mut batches = Vec::new();
    let mut current = String::new();

    for para in content.split(PARAGRAPH_SEPARATOR) {
        let sep = if current.is_empty() { "" } else { PARAGRAPH_SEPARATOR };
        if current.len() + sep.len() + para.len() <= limit {
            current.push_str(sep);
            current.push_str(para);
        } else {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            if para.len() > limit {
                warn!(bytes = para.len(), limit, "Paragraph exceeds batch limit; sending oversized");
            }
            current.push_str(para);
        }
    }

    if !current.is_empty() {
        batches.push(current);
    }

    debug!(batches = batches.len(), bytes = content.len(), limit, "Split content");
    batches
}
