//! Storage backends for geomemo

mod prefs;
pub mod schema;
mod sqlite;

pub use prefs::{Prefs, PrefsStorage};
pub use sqlite::SqliteStorage;
