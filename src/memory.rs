//! Memory records and the store facade

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::error::Result;
use crate::feed;
use crate::session::{Session, SessionStore};
use crate::storage::{PrefsStorage, SqliteStorage};

/// A captured memory: a photo taken at a GPS position, with an
/// optional message, attributed to the user who saved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Row id, assigned on insert
    pub id: i64,

    /// Raw image bytes as captured
    pub image: Vec<u8>,

    /// Capture latitude in degrees
    pub latitude: f64,

    /// Capture longitude in degrees
    pub longitude: f64,

    /// Optional message attached at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Email of the owning user; absent for memories saved with no
    /// session (early databases have these)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,

    /// When the memory was saved; absent on rows migrated from
    /// databases that predate the column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A memory about to be saved. Attribution comes from the session
/// passed to [`MemoryStore::save_memory`], not from the caller.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub image: Vec<u8>,
    pub latitude: f64,
    pub longitude: f64,
    pub message: Option<String>,
}

impl NewMemory {
    pub fn new(image: Vec<u8>, latitude: f64, longitude: f64) -> Self {
        Self {
            image,
            latitude,
            longitude,
            message: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The main store coordinating all backends
pub struct MemoryStore {
    config: Config,
    sqlite: SqliteStorage,
    credentials: CredentialStore,
    session: SessionStore,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new(config: Config) -> Result<Self> {
        config.ensure_dirs()?;

        let sqlite = SqliteStorage::new(&config)?;
        let prefs = PrefsStorage::new(&config)?;
        let credentials = CredentialStore::new(sqlite.clone());
        let session = SessionStore::new(sqlite.clone(), prefs);

        Ok(Self {
            config,
            sqlite,
            credentials,
            session,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the credential store
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Get the session store
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Save a memory, attributed to the session's user
    pub fn save_memory(&self, new: NewMemory, session: &Session) -> Result<i64> {
        let id = self.sqlite.insert_memory(&new, session.email())?;
        tracing::debug!(id, owner = session.email(), "saved memory");
        Ok(id)
    }

    /// List all memories, newest first
    pub fn list_memories(&self) -> Result<Vec<MemoryRecord>> {
        self.sqlite.list_memories()
    }

    /// List memories not owned by the given user, newest first
    pub fn list_memories_excluding_owner(&self, owner_email: &str) -> Result<Vec<MemoryRecord>> {
        self.sqlite.list_memories_excluding_owner(owner_email)
    }

    /// Candidates for a discovery feed: everyone else's memories, or
    /// all memories when the session is anonymous
    pub fn discover_candidates(&self, session: &Session) -> Result<Vec<MemoryRecord>> {
        match session.email() {
            Some(email) => self.list_memories_excluding_owner(email),
            None => self.list_memories(),
        }
    }

    /// Build a discovery feed: sample up to `count` of other users'
    /// memories with the given random source
    pub fn discover_feed<R: Rng + ?Sized>(
        &self,
        session: &Session,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<MemoryRecord>> {
        let candidates = self.discover_candidates(session)?;
        Ok(feed::pick_random_feed(candidates, count, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (MemoryStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        (MemoryStore::new(config).unwrap(), dir)
    }

    #[test]
    fn saved_memory_appears_first_in_listing() {
        let (store, _dir) = store();
        let session = Session::for_user("a@x.com");

        store
            .save_memory(NewMemory::new(vec![1], 1.0, 1.0), &session)
            .unwrap();
        let before = store.list_memories().unwrap();

        let new = NewMemory::new(vec![2, 3], 38.72, -9.14).with_message("belém");
        let id = store.save_memory(new, &session).unwrap();

        let after = store.list_memories().unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0].id, id);
        assert_eq!(after[0].image, vec![2, 3]);
        assert_eq!(after[0].latitude, 38.72);
        assert_eq!(after[0].longitude, -9.14);
        assert_eq!(after[0].message.as_deref(), Some("belém"));
        assert_eq!(after[0].owner_email.as_deref(), Some("a@x.com"));
        // every previously existing record comes after the new one
        assert_eq!(&after[1..], &before[..]);
    }

    #[test]
    fn anonymous_session_saves_unowned() {
        let (store, _dir) = store();

        store
            .save_memory(NewMemory::new(vec![9], 2.0, 2.0), &Session::anonymous())
            .unwrap();

        let listed = store.list_memories().unwrap();
        assert_eq!(listed[0].owner_email, None);
    }

    #[test]
    fn discover_candidates_skip_own_memories() {
        let (store, _dir) = store();

        store
            .save_memory(NewMemory::new(vec![1], 1.0, 1.0), &Session::for_user("a@x.com"))
            .unwrap();
        store
            .save_memory(NewMemory::new(vec![2], 2.0, 2.0), &Session::for_user("b@x.com"))
            .unwrap();
        store
            .save_memory(NewMemory::new(vec![3], 3.0, 3.0), &Session::for_user("a@x.com"))
            .unwrap();

        let candidates = store.discover_candidates(&Session::for_user("a@x.com")).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].owner_email.as_deref(), Some("b@x.com"));

        let all = store.discover_candidates(&Session::anonymous()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn discover_feed_samples_only_other_users() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let (store, _dir) = store();

        for i in 0u8..6 {
            let owner = if i % 2 == 0 { "a@x.com" } else { "b@x.com" };
            store
                .save_memory(
                    NewMemory::new(vec![i], f64::from(i), f64::from(i)),
                    &Session::for_user(owner),
                )
                .unwrap();
        }

        let session = Session::for_user("a@x.com");
        let mut rng = StdRng::seed_from_u64(11);

        let feed = store.discover_feed(&session, 2, &mut rng).unwrap();
        assert_eq!(feed.len(), 2);
        assert!(feed.iter().all(|m| m.owner_email.as_deref() == Some("b@x.com")));

        // same seed, same feed
        let mut again = StdRng::seed_from_u64(11);
        assert_eq!(store.discover_feed(&session, 2, &mut again).unwrap(), feed);
    }
}
