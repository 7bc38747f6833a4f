//! The reply envelope the model is instructed to produce.

use serde::{Deserialize, Serialize};

use crate::updates::MemoryUpdates;

/// A structured model reply.
///
/// The model is prompted to return exactly this shape as strict JSON. The
/// `memory_updates` member is optional; a reply that carries none is a plain
/// conversational turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    /// The conversational text shown to the user.
    pub assistant_response: String,

    /// Structured preference facts extracted from the user's message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_updates: Option<MemoryUpdates>,
}

impl AssistantReply {
    /// Wrap raw, unstructured text as a reply with no memory updates.
    ///
    /// Used as the degradation path when the model output is not parseable
    /// JSON: the user still sees something rather than an error.
    pub fn from_raw_text(text: impl Into<String>) -> Self {
        Self {
            assistant_response: text.into(),
            memory_updates: None,
        }
    }
}
