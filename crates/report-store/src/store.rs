//! File-backed key-value store.
//!
//! Each key maps to one JSON document under the store root. Writes go to a
//! temp file first and are renamed into place, so readers never observe a
//! half-written value.

use std::path::{Path, PathBuf};

use report_core::error::{ReportError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Key under which the CLI persists its accumulated period summaries.
pub const SUMMARIES_KEY: &str = "summaries";

/// Key under which the CLI persists the last loaded schedule.
pub const SCHEDULE_KEY: &str = "schedule";

// ── DataStore ─────────────────────────────────────────────────────────────────

/// JSON key-value store rooted at a directory.
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    /// Store rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the default location, `~/.audience-report/store`.
    pub fn default_location() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".audience-report").join("store"))
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serialize `value` under `key`, replacing any previous value.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(value)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &path)?;

        debug!("Stored key \"{}\" at {}", key, path.display());
        Ok(())
    }

    /// Load the value under `key`, or `None` when the key is absent.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ReportError::FileRead {
                    path,
                    source: err,
                })
            }
        };

        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// Remove the value under `key`, if present.
    pub fn clear(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("Cleared key \"{}\"", key);
        }
        Ok(())
    }

    /// Path for a key, with the key sanitized into a safe file stem.
    fn key_path(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", stem))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
