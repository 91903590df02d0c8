//! SQLite storage for memories, credentials, and the current session

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{is_constraint_violation, Error, Result};
use crate::memory::{MemoryRecord, NewMemory};

use super::schema;

/// SQLite storage backend
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the database at the configured path
    pub fn new(config: &Config) -> Result<Self> {
        let conn = Connection::open(config.sqlite_path())?;
        schema::init_db(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_db(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| Error::storage(e.to_string()))
    }

    // --- memories ---

    /// Append one memory row, returning its id
    pub fn insert_memory(&self, new: &NewMemory, owner_email: Option<&str>) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO memories (image, latitude, longitude, message, owner_email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.image,
                new.latitude,
                new.longitude,
                new.message,
                owner_email,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Read all memories, newest first
    pub fn list_memories(&self) -> Result<Vec<MemoryRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, image, latitude, longitude, message, owner_email, created_at
             FROM memories ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], map_memory_row)?;

        let mut memories = Vec::new();
        for row in rows {
            memories.push(row?.into_record()?);
        }

        Ok(memories)
    }

    /// Read all memories not owned by the given email, newest first.
    /// Rows with no owner are included: they belong to someone else
    /// from every viewer's perspective.
    pub fn list_memories_excluding_owner(&self, owner_email: &str) -> Result<Vec<MemoryRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, image, latitude, longitude, message, owner_email, created_at
             FROM memories
             WHERE owner_email IS NULL OR owner_email != ?1
             ORDER BY id DESC",
        )?;

        let rows = stmt.query_map(params![owner_email], map_memory_row)?;

        let mut memories = Vec::new();
        for row in rows {
            memories.push(row?.into_record()?);
        }

        Ok(memories)
    }

    // --- credentials ---

    /// Insert a credential row, returning its id. A duplicate email
    /// surfaces the UNIQUE violation as [`Error::DuplicateEmail`];
    /// there is no separate existence check.
    pub fn insert_credential(&self, email: &str, password: &str) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO user_credentials (email, password) VALUES (?1, ?2)",
            params![email, password],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::DuplicateEmail(email.to_string())
            } else {
                Error::Sqlite(e)
            }
        })?;

        Ok(conn.last_insert_rowid())
    }

    /// True iff a credential row matches both fields exactly
    pub fn check_credential(&self, email: &str, password: &str) -> Result<bool> {
        let conn = self.lock()?;

        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM user_credentials WHERE email = ?1 AND password = ?2",
                params![email, password],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id.is_some())
    }

    // --- current user ---

    /// Replace the single current_user row with the given email
    pub fn set_current_user(&self, email: &str) -> Result<()> {
        let conn = self.lock()?;

        // Replace-not-append: at most one row exists at any time
        conn.execute("DELETE FROM current_user", [])?;
        conn.execute("INSERT INTO current_user (email) VALUES (?1)", params![email])?;

        Ok(())
    }

    /// Read the current user, if a session was ever set
    pub fn current_user(&self) -> Result<Option<String>> {
        let conn = self.lock()?;

        let email = conn
            .query_row("SELECT email FROM current_user LIMIT 1", [], |row| row.get(0))
            .optional()?;

        Ok(email)
    }
}

/// Intermediate struct for reading from SQLite
struct MemoryRow {
    id: i64,
    image: Vec<u8>,
    latitude: f64,
    longitude: f64,
    message: Option<String>,
    owner_email: Option<String>,
    created_at: Option<String>,
}

fn map_memory_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRow> {
    Ok(MemoryRow {
        id: row.get(0)?,
        image: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        message: row.get(4)?,
        owner_email: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl MemoryRow {
    fn into_record(self) -> Result<MemoryRecord> {
        Ok(MemoryRecord {
            id: self.id,
            image: self.image,
            latitude: self.latitude,
            longitude: self.longitude,
            message: self.message,
            owner_email: self.owner_email,
            created_at: self.created_at.and_then(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .ok()
            }),
        })
    }
}
