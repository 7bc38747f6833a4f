//! Per-user constraint tuples: upserts and reads.

use rusqlite::{OptionalExtension, params};
use tracing::debug;

use morsel_types::{CatalogId, UserId};

use crate::catalog::Catalog;
use crate::error::Result;

use super::ConstraintStore;

impl ConstraintStore {
    /// Insert or replace the flag for a (user, entry) tuple.
    ///
    /// Re-applying the same fact is a no-op in observable effect; a
    /// different flag replaces the stored one (never accumulates).
    pub fn upsert_constraint(
        &self,
        user_id: UserId,
        catalog: Catalog,
        entry_id: CatalogId,
        flag: bool,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            &format!(
                "INSERT INTO {table} (user_id, {entry}, {flag}) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, {entry}) DO UPDATE SET {flag} = excluded.{flag}",
                table = catalog.link_table(),
                entry = catalog.link_column(),
                flag = catalog.flag_column(),
            ),
            params![user_id, entry_id, flag as i64],
        )?;

        debug!(user_id, catalog = %catalog, entry_id, flag, "Upserted constraint");
        Ok(())
    }

    /// Read the stored flag for a (user, entry) tuple, if any.
    pub fn constraint_flag(
        &self,
        user_id: UserId,
        catalog: Catalog,
        entry_id: CatalogId,
    ) -> Result<Option<bool>> {
        let conn = self.conn.lock().unwrap();

        let flag: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT {flag} FROM {table} WHERE user_id = ?1 AND {entry} = ?2",
                    flag = catalog.flag_column(),
                    table = catalog.link_table(),
                    entry = catalog.link_column(),
                ),
                params![user_id, entry_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(flag.map(|f| f != 0))
    }

    /// All food preferences for a user as (name, is_safe) pairs, in
    /// dictionary insertion order.
    ///
    /// Both safe and unsafe rows are returned; the summary layer surfaces
    /// only the unsafe ones.
    pub fn food_preferences(&self, user_id: UserId) -> Result<Vec<(String, bool)>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT f.name, ufp.is_safe
            FROM user_food_preferences ufp
            JOIN foods f ON ufp.food_id = f.id
            WHERE ufp.user_id = ?1
            ORDER BY f.id
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Names of sensory attributes flagged problematic for a user.
    pub fn problematic_triggers(&self, user_id: UserId) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT sa.name
            FROM user_sensory_triggers ust
            JOIN sensory_attributes sa ON ust.attribute_id = sa.id
            WHERE ust.user_id = ?1 AND ust.is_problematic = 1
            ORDER BY sa.id
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Names of conditions confirmed present for a user.
    pub fn confirmed_conditions(&self, user_id: UserId) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT c.name
            FROM user_conditions uc
            JOIN conditions c ON uc.condition_id = c.id
            WHERE uc.user_id = ?1 AND uc.has_condition = 1
            ORDER BY c.id
            "#,
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user() -> (ConstraintStore, UserId) {
        let store = ConstraintStore::open_in_memory().unwrap();
        let user = store.create_user("kid@example.com", "kid", "pw").unwrap();
        (store, user.id)
    }

    #[test]
    fn test_upsert_replaces_flag() {
        let (store, user_id) = store_with_user();
        let banana = store
            .ensure_catalog_entry(Catalog::Food, "banana", None)
            .unwrap()
            .unwrap();

        store
            .upsert_constraint(user_id, Catalog::Food, banana, false)
            .unwrap();
        assert_eq!(
            store
                .constraint_flag(user_id, Catalog::Food, banana)
                .unwrap(),
            Some(false)
        );

        // Same fact again: unchanged
        store
            .upsert_constraint(user_id, Catalog::Food, banana, false)
            .unwrap();
        assert_eq!(
            store
                .constraint_flag(user_id, Catalog::Food, banana)
                .unwrap(),
            Some(false)
        );

        // New fact replaces, never accumulates
        store
            .upsert_constraint(user_id, Catalog::Food, banana, true)
            .unwrap();
        assert_eq!(
            store
                .constraint_flag(user_id, Catalog::Food, banana)
                .unwrap(),
            Some(true)
        );
        assert_eq!(store.food_preferences(user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_food_preferences_returns_both_flags() {
        let (store, user_id) = store_with_user();
        for (name, safe) in [("banana", false), ("rice", true)] {
            let id = store
                .ensure_catalog_entry(Catalog::Food, name, None)
                .unwrap()
                .unwrap();
            store
                .upsert_constraint(user_id, Catalog::Food, id, safe)
                .unwrap();
        }

        let prefs = store.food_preferences(user_id).unwrap();
        assert_eq!(
            prefs,
            vec![
                ("banana".to_string(), false),
                ("rice".to_string(), true)
            ]
        );
    }

    #[test]
    fn test_trigger_and_condition_reads_filter_false() {
        let (store, user_id) = store_with_user();

        let mushy = store
            .ensure_catalog_entry(Catalog::Sensory, "mushy texture", None)
            .unwrap()
            .unwrap();
        let crunchy = store
            .ensure_catalog_entry(Catalog::Sensory, "crunchy", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Sensory, mushy, true)
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Sensory, crunchy, false)
            .unwrap();

        assert_eq!(
            store.problematic_triggers(user_id).unwrap(),
            vec!["mushy texture".to_string()]
        );

        let arfid = store
            .ensure_catalog_entry(Catalog::Condition, "ARFID", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Condition, arfid, true)
            .unwrap();
        assert_eq!(
            store.confirmed_conditions(user_id).unwrap(),
            vec!["ARFID".to_string()]
        );
    }

    #[test]
    fn test_constraints_are_user_scoped() {
        let (store, user_a) = store_with_user();
        let user_b = store.create_user("b@example.com", "b", "pw").unwrap().id;

        let banana = store
            .ensure_catalog_entry(Catalog::Food, "banana", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_a, Catalog::Food, banana, false)
            .unwrap();

        assert!(store.food_preferences(user_b).unwrap().is_empty());
    }

    #[test]
    fn test_delete_user_cascades_constraints_not_dictionary() {
        let (store, user_id) = store_with_user();
        let banana = store
            .ensure_catalog_entry(Catalog::Food, "banana", None)
            .unwrap()
            .unwrap();
        store
            .upsert_constraint(user_id, Catalog::Food, banana, false)
            .unwrap();

        store.delete_user(user_id).unwrap();

        assert_eq!(
            store
                .constraint_flag(user_id, Catalog::Food, banana)
                .unwrap(),
            None
        );
        // Shared dictionary survives
        assert_eq!(store.catalog_len(Catalog::Food).unwrap(), 1);
    }
}
