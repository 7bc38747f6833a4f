//! Master-record resolution for dictionary entries.
//!
//! Dictionary rows are created lazily the first time any user mentions a
//! previously-unseen item, and only after the grounding check passes. The
//! lookup-then-insert pair is not atomic; the `COLLATE NOCASE` uniqueness
//! constraint resolves creation races, and a constraint violation on insert
//! means another request won — re-run the lookup.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use morsel_types::CatalogId;

use crate::catalog::Catalog;
use crate::error::{MemoryError, Result};
use crate::grounding::is_grounded;

use super::ConstraintStore;
use super::user_ops::is_unique_violation;

impl ConstraintStore {
    /// Resolve an item name to its dictionary id, creating the entry if
    /// absent and grounded.
    ///
    /// Returns `Ok(None)` when the name fails the grounding check against
    /// `source_message`; the item is skipped silently (diagnostic log only)
    /// and no row is created.
    pub fn ensure_catalog_entry(
        &self,
        catalog: Catalog,
        name: &str,
        source_message: Option<&str>,
    ) -> Result<Option<CatalogId>> {
        if !is_grounded(name, source_message) {
            debug!(
                catalog = %catalog,
                name,
                "Skipped catalog entry: not found in user message"
            );
            return Ok(None);
        }

        let conn = self.conn.lock().unwrap();

        if let Some(id) = find_entry(&conn, catalog, name)? {
            return Ok(Some(id));
        }

        let insert = conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", catalog.table()),
            params![name],
        );

        match insert {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                info!(catalog = %catalog, name, id, "Created catalog entry");
                Ok(Some(id))
            }
            Err(e) if is_unique_violation(&e) => {
                // Lost the creation race; the row exists now.
                debug!(catalog = %catalog, name, "Catalog insert raced, re-reading");
                find_entry(&conn, catalog, name)?
                    .map(Some)
                    .ok_or_else(|| MemoryError::Database(e))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a dictionary entry id by name (case-insensitive), without
    /// creating anything.
    pub fn find_catalog_entry(&self, catalog: Catalog, name: &str) -> Result<Option<CatalogId>> {
        let conn = self.conn.lock().unwrap();
        find_entry(&conn, catalog, name)
    }

    /// Number of entries in a dictionary.
    pub fn catalog_len(&self, catalog: Catalog) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", catalog.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Case-insensitive name lookup; the column's NOCASE collation does the work.
fn find_entry(conn: &Connection, catalog: Catalog, name: &str) -> Result<Option<CatalogId>> {
    let id = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", catalog.table()),
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
