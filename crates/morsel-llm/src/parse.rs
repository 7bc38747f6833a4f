//! Model reply parsing.
//!
//! Models wrap JSON in prose or markdown fences more often than not, so the
//! parser first extracts the substring between the first `{` and the last `}`
//! and then parses strictly. When no valid JSON can be recovered the raw text
//! becomes the assistant response and no memory updates are applied.

use tracing::warn;

use morsel_types::AssistantReply;

/// Parse model output into a structured reply.
///
/// Never fails: unparseable output degrades to a raw-text reply with no
/// memory updates.
pub fn parse_reply(text: &str) -> AssistantReply {
    match extract_json(text).and_then(|json| serde_json::from_str::<AssistantReply>(json).ok()) {
        Some(reply) => reply,
        None => {
            warn!(len = text.len(), "Model output was not valid JSON, returning raw text");
            AssistantReply::from_raw_text(text)
        }
    }
}

/// Extract the candidate JSON object between the first `{` and last `}`.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
