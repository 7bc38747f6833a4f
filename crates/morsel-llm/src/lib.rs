//! Generative model client for Morsel.
//!
//! Provides the [`GenerativeBackend`] seam the chat path talks to, a Gemini
//! implementation of it, prompt assembly, and tolerant parsing of model
//! output back into [`morsel_types::AssistantReply`].

pub mod backend;
pub mod error;
pub mod gemini;
pub mod parse;
pub mod prompt;

pub use backend::{GenerativeBackend, MockBackend, SharedBackend, with_retry};
pub use error::{LlmError, RateLimitInfo, Result};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use parse::parse_reply;
pub use prompt::build_prompt;
