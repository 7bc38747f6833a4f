//! Constraint store implementation using SQLite.
//!
//! Persists per-user dietary constraints: three shared dictionaries (foods,
//! sensory attributes, conditions) plus three per-user link relations, each
//! holding one boolean flag per (user, entry) key. All writes flow through
//! the validated applier in [`apply_ops`]; reads for prompt injection flow
//! through [`summary_ops`].

mod apply_ops;
mod catalog_ops;
mod constraint_ops;
mod summary_ops;
mod user_ops;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::Result;

pub use apply_ops::MAX_ITEMS_PER_CATEGORY;
pub use summary_ops::MAX_NAMES_PER_LINE;
pub use user_ops::User;

// ─────────────────────────────────────────────────────────────────────────────
// Schema Version
// ─────────────────────────────────────────────────────────────────────────────

/// Current schema version for migrations.
const SCHEMA_VERSION: i32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Constraint Store
// ─────────────────────────────────────────────────────────────────────────────

/// Dietary constraint store backed by SQLite.
///
/// Uses WAL mode for better concurrent read performance. The connection is
/// wrapped in a `Mutex` for thread safety; callers on async executors should
/// dispatch through `spawn_blocking`.
///
/// Dictionary names are unique case-insensitively (`COLLATE NOCASE`); that
/// constraint is the backstop against duplicate entries when concurrent
/// requests race on creating the same item.
pub struct ConstraintStore {
    /// The SQLite connection (wrapped in Mutex for thread safety).
    pub(crate) conn: Mutex<Connection>,
}

impl std::fmt::Debug for ConstraintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintStore").finish_non_exhaustive()
    }
}

impl ConstraintStore {
    /// Open or create a constraint store at the given path.
    ///
    /// Creates the database file and initializes the schema if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|_| {
                    crate::error::MemoryError::Database(rusqlite::Error::InvalidPath(
                        path.to_path_buf(),
                    ))
                })?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!("Constraint store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        debug!("In-memory constraint store created");
        Ok(store)
    }

    /// Initialize the database with schema and pragmas.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // WAL for better concurrent reads; cascades rely on foreign keys
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        self.create_schema(&conn)?;

        Ok(())
    }

    /// Create the database schema.
    fn create_schema(&self, conn: &Connection) -> Result<()> {
        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!("Schema up to date (version {})", current_version);
            return Ok(());
        }

        conn.execute_batch(
            r#"
            -- Users: owners of constraint records. Deleting a user cascades
            -- its link rows but never touches the shared dictionaries.
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                username TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Shared dictionaries, one per taxonomy. Names are unique
            -- case-insensitively; this is the race backstop for lazy creation.
            CREATE TABLE IF NOT EXISTS foods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE
            );

            CREATE TABLE IF NOT EXISTS sensory_attributes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE
            );

            CREATE TABLE IF NOT EXISTS conditions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE
            );

            -- Per-user link relations: at most one row per (user, entry),
            -- later writes replace the flag (upsert semantics).
            CREATE TABLE IF NOT EXISTS user_food_preferences (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                food_id INTEGER NOT NULL REFERENCES foods(id),
                is_safe INTEGER NOT NULL,
                PRIMARY KEY (user_id, food_id)
            );

            CREATE TABLE IF NOT EXISTS user_sensory_triggers (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                attribute_id INTEGER NOT NULL REFERENCES sensory_attributes(id),
                is_problematic INTEGER NOT NULL,
                PRIMARY KEY (user_id, attribute_id)
            );

            CREATE TABLE IF NOT EXISTS user_conditions (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                condition_id INTEGER NOT NULL REFERENCES conditions(id),
                has_condition INTEGER NOT NULL,
                PRIMARY KEY (user_id, condition_id)
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        info!("Schema created (version {})", SCHEMA_VERSION);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let store = ConstraintStore::open_in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_open_on_disk_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("morsel.db");
        let store = ConstraintStore::open(&path).unwrap();
        drop(store);
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morsel.db");
        drop(ConstraintStore::open(&path).unwrap());
        // Second open runs against an already-migrated database
        let store = ConstraintStore::open(&path).unwrap();
        let conn = store.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
