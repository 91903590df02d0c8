//! File-backed preferences
//!
//! Small JSON file mirroring session state, the stand-in for the
//! platform preference store the app originally wrote its logged-in
//! email to. Reads tolerate a missing file; writes replace it whole.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// Persisted preference values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
    /// Email of the logged-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// JSON preference storage backend
#[derive(Clone)]
pub struct PrefsStorage {
    path: PathBuf,
}

impl PrefsStorage {
    /// Create a new preference storage
    pub fn new(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            path: config.prefs_path(),
        })
    }

    /// Read the preferences, defaulting when no file exists yet
    pub fn load(&self) -> Result<Prefs> {
        if !self.path.exists() {
            return Ok(Prefs::default());
        }

        let file = File::open(&self.path)?;
        let prefs = serde_json::from_reader(BufReader::new(file))?;
        Ok(prefs)
    }

    /// Write the preferences, replacing any existing file
    pub fn save(&self, prefs: &Prefs) -> Result<()> {
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), prefs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());

        let storage = PrefsStorage::new(&config).unwrap();
        let prefs = storage.load().unwrap();
        assert_eq!(prefs.user_email, None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());

        let storage = PrefsStorage::new(&config).unwrap();
        storage
            .save(&Prefs {
                user_email: Some("a@x.com".to_string()),
            })
            .unwrap();

        let prefs = storage.load().unwrap();
        assert_eq!(prefs.user_email.as_deref(), Some("a@x.com"));
    }
}
