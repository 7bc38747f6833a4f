//! User account operations.
//!
//! Passwords are stored and compared as plaintext, matching the deployed
//! system this replaces. Hardening the credential path is explicitly out of
//! scope; the pipeline only needs a stable numeric user id to scope rows.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info};

use morsel_types::UserId;

use crate::error::{MemoryError, Result};

use super::ConstraintStore;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct User {
    /// Numeric identity (SQLite rowid).
    pub id: UserId,
    /// Signup email, unique case-insensitively.
    pub email: String,
    /// Display name.
    pub username: String,
}

impl ConstraintStore {
    /// Create a new user. Fails with [`MemoryError::Conflict`] when the email
    /// is already registered (any case variant).
    pub fn create_user(&self, email: &str, username: &str, password: &str) -> Result<User> {
        let conn = self.conn.lock().unwrap();

        let result = conn.execute(
            "INSERT INTO users (email, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, username, password, Utc::now().to_rfc3339()],
        );

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                info!(user_id = id, "Created user");
                Ok(User {
                    id,
                    email: email.to_string(),
                    username: username.to_string(),
                })
            }
            Err(e) if is_unique_violation(&e) => Err(MemoryError::Conflict(format!(
                "email '{}' is already registered",
                email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by email and verify the password.
    ///
    /// Returns `None` for unknown email or mismatched password; the caller
    /// maps both to the same authentication failure.
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT id, email, username, password FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        User {
                            id: row.get(0)?,
                            email: row.get(1)?,
                            username: row.get(2)?,
                        },
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((user, stored)) if stored == password => Ok(Some(user)),
            Some(_) => {
                debug!(email, "Password mismatch");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Fetch a user by id.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();

        let user = conn
            .query_row(
                "SELECT id, email, username FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        username: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    /// Delete a user. Constraint rows cascade; dictionaries are untouched.
    ///
    /// Returns `true` if the user existed.
    pub fn delete_user(&self, id: UserId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

/// True when a rusqlite error is a uniqueness-constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> ConstraintStore {
        ConstraintStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_get_user() {
        let store = create_test_store();
        let user = store
            .create_user("kid@example.com", "slim-easy", "hunter2")
            .unwrap();
        assert!(user.id > 0);

        let fetched = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(fetched, user);
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = create_test_store();
        store
            .create_user("kid@example.com", "one", "pw")
            .unwrap();

        // Case variant still collides (NOCASE uniqueness)
        let result = store.create_user("KID@example.com", "two", "pw");
        assert!(matches!(result, Err(MemoryError::Conflict(_))));
    }

    #[test]
    fn test_authenticate_user() {
        let store = create_test_store();
        store
            .create_user("kid@example.com", "slim-easy", "hunter2")
            .unwrap();

        let user = store
            .authenticate_user("kid@example.com", "hunter2")
            .unwrap();
        assert_eq!(user.unwrap().username, "slim-easy");

        // Wrong password and unknown email both yield None
        assert!(
            store
                .authenticate_user("kid@example.com", "wrong")
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .authenticate_user("nobody@example.com", "hunter2")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_delete_user() {
        let store = create_test_store();
        let user = store.create_user("kid@example.com", "u", "pw").unwrap();

        assert!(store.delete_user(user.id).unwrap());
        assert!(store.get_user(user.id).unwrap().is_none());
        assert!(!store.delete_user(user.id).unwrap());
    }
}
