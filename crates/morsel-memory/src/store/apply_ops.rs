//! Memory update application.
//!
//! Consumes the `memory_updates` portion of a model reply and persists it,
//! category by category. The payload is model-generated and untrusted, so
//! every item is gated: arrays are capped, incomplete items are skipped, and
//! each name must pass the grounding check against the user's own message
//! before anything is written.
//!
//! The key property is isolation: one malformed or unvalidatable item never
//! blocks sibling items or sibling categories, and nothing here ever
//! propagates an error to the caller. This path runs detached from the
//! user-facing response.

use tracing::{debug, warn};

use morsel_types::{Flag, MemoryUpdates, UserId};

use crate::catalog::Catalog;
use crate::error::Result;

use super::ConstraintStore;

/// Hard cap on items applied per category per call, a safety limit against
/// runaway model output.
pub const MAX_ITEMS_PER_CATEGORY: usize = 5;

impl ConstraintStore {
    /// Apply a batch of model-proposed preference facts for a user.
    ///
    /// Anonymous callers and empty payloads return immediately. Failures are
    /// logged and contained; this function never returns an error.
    pub fn apply_updates(
        &self,
        user_id: Option<UserId>,
        updates: &MemoryUpdates,
        source_message: Option<&str>,
    ) {
        let Some(user_id) = user_id else {
            return;
        };
        if updates.is_empty() {
            return;
        }

        for item in updates.foods.iter().take(MAX_ITEMS_PER_CATEGORY) {
            self.apply_item(
                user_id,
                Catalog::Food,
                item.name.as_deref(),
                item.is_safe,
                source_message,
            );
        }

        for item in updates.sensory.iter().take(MAX_ITEMS_PER_CATEGORY) {
            self.apply_item(
                user_id,
                Catalog::Sensory,
                item.name.as_deref(),
                item.is_problematic,
                source_message,
            );
        }

        for item in updates.conditions.iter().take(MAX_ITEMS_PER_CATEGORY) {
            self.apply_item(
                user_id,
                Catalog::Condition,
                item.name.as_deref(),
                item.has_condition,
                source_message,
            );
        }
    }

    /// Apply a single proposed fact. All failure modes are terminal for this
    /// item only.
    fn apply_item(
        &self,
        user_id: UserId,
        catalog: Catalog,
        name: Option<&str>,
        flag: Option<Flag>,
        source_message: Option<&str>,
    ) {
        // Incomplete items (missing name or flag) are skipped, not errors.
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return;
        };
        let Some(flag) = flag else {
            return;
        };

        if let Err(e) = self.resolve_and_upsert(user_id, catalog, name, flag.as_bool(), source_message)
        {
            warn!(
                user_id,
                catalog = %catalog,
                name,
                error = %e,
                "Memory update failed for item"
            );
        }
    }

    fn resolve_and_upsert(
        &self,
        user_id: UserId,
        catalog: Catalog,
        name: &str,
        flag: bool,
        source_message: Option<&str>,
    ) -> Result<()> {
        // Grounding failure yields None: skipped silently, no row created.
        let Some(entry_id) = self.ensure_catalog_entry(catalog, name, source_message)? else {
            return Ok(());
        };

        self.upsert_constraint(user_id, catalog, entry_id, flag)?;
        debug!(user_id, catalog = %catalog, name, flag, "Stored preference fact");
        Ok(())
    }
}
