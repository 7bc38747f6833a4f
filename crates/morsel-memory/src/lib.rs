//! Persistent dietary-constraint memory for Morsel.
//!
//! This crate owns the SQLite-backed constraint store: user accounts, the
//! shared item dictionaries (foods, sensory attributes, conditions), and the
//! per-user constraint tuples that link them. On top of the store it provides
//! the two halves of the memory loop:
//!
//! - **Write path** ([`ConstraintStore::apply_updates`]): take the structured
//!   `memory_updates` block from a model reply, ground each item name against
//!   the user's literal message, resolve dictionary rows, and upsert flags.
//!   Best-effort and isolated; never fails the caller.
//! - **Read path** ([`ConstraintStore::user_constraints`]): assemble the
//!   compact avoidance summary injected into the next prompt.

pub mod catalog;
pub mod error;
pub mod grounding;
pub mod store;

pub use catalog::Catalog;
pub use error::{MemoryError, Result};
pub use grounding::is_grounded;
pub use store::{ConstraintStore, MAX_ITEMS_PER_CATEGORY, MAX_NAMES_PER_LINE, User};
