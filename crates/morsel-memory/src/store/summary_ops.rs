//! Constraint summary assembly for prompt injection.
//!
//! Produces a compact, human-readable block describing what a user avoids.
//! Only avoidance guidance is surfaced: safe foods are fetched along with
//! the unsafe ones but deliberately left out of the summary.

use tracing::warn;

use morsel_types::UserId;

use super::ConstraintStore;

/// Maximum names listed verbatim per category line; the remainder collapses
/// into a trailing count.
pub const MAX_NAMES_PER_LINE: usize = 10;

impl ConstraintStore {
    /// Build the constraint context string for a user.
    ///
    /// An anonymous caller (`None`) gets the empty string without any query.
    /// The three category fetches are independent: a failure in one degrades
    /// that category to empty (logged) rather than failing the whole read.
    /// Non-empty categories become one line each, joined with newlines in
    /// fixed order: avoid-foods, sensory-triggers, conditions.
    pub fn user_constraints(&self, user_id: Option<UserId>) -> String {
        let Some(user_id) = user_id else {
            return String::new();
        };

        let unsafe_foods: Vec<String> = match self.food_preferences(user_id) {
            Ok(prefs) => prefs
                .into_iter()
                .filter(|(_, is_safe)| !is_safe)
                .map(|(name, _)| name)
                .collect(),
            Err(e) => {
                warn!(user_id, error = %e, "Food preference fetch failed");
                Vec::new()
            }
        };

        let triggers = match self.problematic_triggers(user_id) {
            Ok(names) => names,
            Err(e) => {
                warn!(user_id, error = %e, "Sensory trigger fetch failed");
                Vec::new()
            }
        };

        let conditions = match self.confirmed_conditions(user_id) {
            Ok(names) => names,
            Err(e) => {
                warn!(user_id, error = %e, "Condition fetch failed");
                Vec::new()
            }
        };

        let mut lines = Vec::new();
        if let Some(line) = format_category("AVOID FOODS", &unsafe_foods) {
            lines.push(line);
        }
        if let Some(line) = format_category("SENSORY TRIGGERS", &triggers) {
            lines.push(line);
        }
        if let Some(line) = format_category("CONDITIONS", &conditions) {
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// Format one category line, or `None` when the category is empty.
fn format_category(label: &str, names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }

    let visible = names
        .iter()
        .take(MAX_NAMES_PER_LINE)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let remaining = names.len().saturating_sub(MAX_NAMES_PER_LINE);

    if remaining > 0 {
        Some(format!("{}: {}, and {} more", label, visible, remaining))
    } else {
        Some(format!("{}: {}", label, visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn store_with_user() -> (ConstraintStore, UserId) {
        let store = ConstraintStore::open_in_memory().unwrap();
        let user = store.create_user("kid@example.com", "kid", "pw").unwrap();
        (store, user.id)
    }

    fn add_food(store: &ConstraintStore, user_id: UserId, name: &str, safe: bool) {
        let id = store
            .ensure_catalog_entry(Catalog::Food, name, None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Food, id, safe)
            .unwrap();
    }

    #[test]
    fn test_anonymous_user_yields_empty_string() {
        let store = ConstraintStore::open_in_memory().unwrap();
        assert_eq!(store.user_constraints(None), "");
    }

    #[test]
    fn test_unknown_user_yields_empty_string() {
        let store = ConstraintStore::open_in_memory().unwrap();
        assert_eq!(store.user_constraints(Some(999)), "");
    }

    #[test]
    fn test_safe_foods_excluded() {
        let (store, user_id) = store_with_user();
        add_food(&store, user_id, "banana", false);
        add_food(&store, user_id, "rice", true);

        assert_eq!(
            store.user_constraints(Some(user_id)),
            "AVOID FOODS: banana"
        );
    }

    #[test]
    fn test_line_order_and_empty_categories_omitted() {
        let (store, user_id) = store_with_user();
        add_food(&store, user_id, "banana", false);

        let mushy = store
            .ensure_catalog_entry(Catalog::Sensory, "mushy texture", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Sensory, mushy, true)
            .unwrap();

        // No conditions: that line is absent entirely
        let summary = store.user_constraints(Some(user_id));
        assert_eq!(
            summary,
            "AVOID FOODS: banana\nSENSORY TRIGGERS: mushy texture"
        );
    }

    #[test]
    fn test_overflow_collapses_to_count() {
        let (store, user_id) = store_with_user();
        for i in 0..13 {
            add_food(&store, user_id, &format!("food{:02}", i), false);
        }

        let summary = store.user_constraints(Some(user_id));
        assert!(summary.starts_with("AVOID FOODS: food00, "));
        assert!(summary.ends_with(", and 3 more"));
        assert!(summary.contains("food09"));
        assert!(!summary.contains("food10"));
    }

    #[test]
    fn test_exactly_at_cap_has_no_suffix() {
        let (store, user_id) = store_with_user();
        for i in 0..MAX_NAMES_PER_LINE {
            add_food(&store, user_id, &format!("food{:02}", i), false);
        }

        let summary = store.user_constraints(Some(user_id));
        assert!(!summary.contains("more"));
        assert!(summary.contains("food09"));
    }

    #[test]
    fn test_failed_category_fetch_degrades_to_empty() {
        let (store, user_id) = store_with_user();
        add_food(&store, user_id, "banana", false);

        let mushy = store
            .ensure_catalog_entry(Catalog::Sensory, "mushy texture", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Sensory, mushy, true)
            .unwrap();
        let arfid = store
            .ensure_catalog_entry(Catalog::Condition, "arfid", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Condition, arfid, true)
            .unwrap();

        // Break the conditions relation so its fetch errors at the SQL level
        store
            .conn
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE user_conditions")
            .unwrap();

        // The broken category is omitted; the other two still render
        assert_eq!(
            store.user_constraints(Some(user_id)),
            "AVOID FOODS: banana\nSENSORY TRIGGERS: mushy texture"
        );
    }

    #[test]
    fn test_format_category_empty_is_none() {
        assert!(format_category("AVOID FOODS", &[]).is_none());
    }
}
