//! Shared domain types for Morsel.
//!
//! These types cross crate boundaries: the update payload the model emits,
//! the reply envelope the chat endpoint parses, and the user identity that
//! scopes constraint storage.

pub mod reply;
pub mod updates;

pub use reply::AssistantReply;
pub use updates::{ConditionUpdate, Flag, FoodUpdate, MemoryUpdates, SensoryUpdate};

/// Opaque numeric user identity (SQLite rowid).
pub type UserId = i64;

/// Identity of a catalog entry within one of the three taxonomies.
pub type CatalogId = i64;
