//! SQLite schema and migrations
//!
//! The schema grew in stages: plain memories first, then the auth
//! tables, then per-memory attribution. Each stage is an additive
//! migration keyed by `PRAGMA user_version`, so opening an older
//! database applies only the missing steps and never drops rows.

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version
pub const SCHEMA_VERSION: i64 = 3;

/// Initialize or upgrade the database schema in place.
pub fn init_db(conn: &Connection) -> Result<()> {
    let version = user_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }
    if version < 3 {
        migrate_v3(conn)?;
    }

    if version < SCHEMA_VERSION {
        set_user_version(conn, SCHEMA_VERSION)?;
        tracing::info!(from = version, to = SCHEMA_VERSION, "migrated database schema");
    }

    Ok(())
}

/// Read the database's schema version.
pub fn user_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

fn set_user_version(conn: &Connection, version: i64) -> Result<()> {
    // PRAGMA does not accept bound parameters
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}

/// v1: the memories table
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS memories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image BLOB,
            latitude REAL,
            longitude REAL,
            message TEXT
        )",
        [],
    )?;
    Ok(())
}

/// v2: credentials and the single-row current_user table
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_credentials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS current_user (
            email TEXT UNIQUE NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// v3: memory attribution and capture time
fn migrate_v3(conn: &Connection) -> Result<()> {
    if !has_column(conn, "memories", "owner_email")? {
        conn.execute("ALTER TABLE memories ADD COLUMN owner_email TEXT", [])?;
    }
    if !has_column(conn, "memories", "created_at")? {
        conn.execute("ALTER TABLE memories ADD COLUMN created_at TEXT", [])?;
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn
        .prepare("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")?
        .query_row(rusqlite::params![table, column], |row| row.get(0))?;
    Ok(count > 0)
}
