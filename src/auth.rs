//! Credential registration and authentication
//!
//! Passwords are stored and compared as plain text, matching the app
//! this store was extracted from. Do not point this at anything that
//! holds real accounts.

use crate::error::Result;
use crate::storage::SqliteStorage;

/// CRUD over the user_credentials table
pub struct CredentialStore {
    sqlite: SqliteStorage,
}

impl CredentialStore {
    pub fn new(sqlite: SqliteStorage) -> Self {
        Self { sqlite }
    }

    /// Register a new user, returning the credential id. Fails with
    /// [`crate::Error::DuplicateEmail`] when the email is taken.
    pub fn register(&self, email: &str, password: &str) -> Result<i64> {
        let id = self.sqlite.insert_credential(email, password)?;
        tracing::info!(email, id, "registered user");
        Ok(id)
    }

    /// True iff the exact (email, password) pair was registered
    pub fn authenticate(&self, email: &str, password: &str) -> Result<bool> {
        self.sqlite.check_credential(email, password)
    }
}
