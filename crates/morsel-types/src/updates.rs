//! The memory-update payload emitted by the generative model.
//!
//! This payload is model-generated and therefore untrusted: every field is
//! optional at the wire level and callers must validate before use. Flags are
//! accepted as either JSON booleans or 0/1 integers because models produce
//! both, depending on how they read the output contract.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Flag
// ─────────────────────────────────────────────────────────────────────────────

/// A boolean fact flag, tolerant of the two encodings models emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// JSON boolean (`true` / `false`).
    Bool(bool),
    /// Numeric encoding (`0` / `1`; any non-zero is truthy).
    Int(i64),
}

impl Flag {
    /// Collapse to a plain boolean.
    pub fn as_bool(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Flag::Bool(b)
    }
}

impl From<i64> for Flag {
    fn from(i: i64) -> Self {
        Flag::Int(i)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update Items
// ─────────────────────────────────────────────────────────────────────────────

/// A proposed food-safety fact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    /// Display name of the food, as the model extracted it.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the user can eat this food.
    #[serde(default)]
    pub is_safe: Option<Flag>,
}

/// A proposed sensory-trigger fact (texture, smell, temperature, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensoryUpdate {
    /// Display name of the sensory attribute.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the attribute is problematic for the user.
    #[serde(default)]
    pub is_problematic: Option<Flag>,
}

/// A proposed health-condition fact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionUpdate {
    /// Display name of the condition.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the user has the condition.
    #[serde(default)]
    pub has_condition: Option<Flag>,
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryUpdates
// ─────────────────────────────────────────────────────────────────────────────

/// The full `memory_updates` object from a model reply.
///
/// All three arrays default to empty so a reply may omit any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryUpdates {
    /// Food-safety facts.
    #[serde(default)]
    pub foods: Vec<FoodUpdate>,
    /// Sensory-trigger facts.
    #[serde(default)]
    pub sensory: Vec<SensoryUpdate>,
    /// Health-condition facts.
    #[serde(default)]
    pub conditions: Vec<ConditionUpdate>,
}

impl MemoryUpdates {
    /// True when no category carries any items.
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty() && self.sensory.is_empty() && self.conditions.is_empty()
    }
}
