//! Session context
//!
//! The acting user is an explicit [`Session`] value handed to every
//! operation that needs one, not an ambient global. [`SessionStore`]
//! persists it across restarts in two places the original app used:
//! the single-row current_user table and the preferences file.

use crate::error::Result;
use crate::storage::{Prefs, PrefsStorage, SqliteStorage};

/// The acting user for a sequence of store calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    email: Option<String>,
}

impl Session {
    /// A session with no logged-in user
    pub fn anonymous() -> Self {
        Self { email: None }
    }

    /// A session acting as the given user
    pub fn for_user(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// Email of the acting user, if any
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.email.is_none()
    }
}

/// Persistence for the current session
pub struct SessionStore {
    sqlite: SqliteStorage,
    prefs: PrefsStorage,
}

impl SessionStore {
    pub fn new(sqlite: SqliteStorage, prefs: PrefsStorage) -> Self {
        Self { sqlite, prefs }
    }

    /// Record a login: replaces the current_user row and mirrors the
    /// email into the preferences file.
    pub fn set_current_user(&self, email: &str) -> Result<()> {
        self.sqlite.set_current_user(email)?;
        self.prefs.save(&Prefs {
            user_email: Some(email.to_string()),
        })?;
        tracing::info!(email, "session user set");
        Ok(())
    }

    /// The persisted current user, if any session was ever recorded
    pub fn current_user(&self) -> Result<Option<String>> {
        self.sqlite.current_user()
    }

    /// Load the persisted session. The table is authoritative; the
    /// preferences mirror covers a database wiped out from under a
    /// still-present prefs file.
    pub fn load(&self) -> Result<Session> {
        if let Some(email) = self.sqlite.current_user()? {
            return Ok(Session::for_user(email));
        }

        match self.prefs.load()?.user_email {
            Some(email) => Ok(Session::for_user(email)),
            None => Ok(Session::anonymous()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn session_store() -> (SessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let sqlite = SqliteStorage::in_memory().unwrap();
        let prefs = PrefsStorage::new(&config).unwrap();
        (SessionStore::new(sqlite, prefs), dir)
    }

    #[test]
    fn fresh_store_loads_anonymous() {
        let (store, _dir) = session_store();
        assert!(store.load().unwrap().is_anonymous());
        assert_eq!(store.current_user().unwrap(), None);
    }

    #[test]
    fn last_set_wins() {
        let (store, _dir) = session_store();

        store.set_current_user("a@x.com").unwrap();
        store.set_current_user("b@x.com").unwrap();

        assert_eq!(store.current_user().unwrap().as_deref(), Some("b@x.com"));
        assert_eq!(store.load().unwrap(), Session::for_user("b@x.com"));
    }

    #[test]
    fn prefs_mirror_survives_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        let prefs = PrefsStorage::new(&config).unwrap();

        let first = SessionStore::new(SqliteStorage::in_memory().unwrap(), prefs.clone());
        first.set_current_user("a@x.com").unwrap();

        // new empty database, same prefs file
        let second = SessionStore::new(SqliteStorage::in_memory().unwrap(), prefs);
        assert_eq!(second.load().unwrap(), Session::for_user("a@x.com"));
    }
}
