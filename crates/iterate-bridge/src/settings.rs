//! Local key-value settings store (`last_use.json`).
//!
//! The file is a flat JSON object. The screens only read it, through
//! [`SettingsStore::history`]; the last-used journal is written back after
//! the backend confirms a file selection.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

/// File name of the settings store.
pub const LAST_USE_FILE: &str = "last_use.json";

/// Key holding the display name of the last journal.
pub const LAST_DB_NAME: &str = "last_db_name";

/// Key holding the path of the last journal.
pub const LAST_DB_PATH: &str = "last_db_path";

/// Key holding when the last journal was opened (RFC 3339).
pub const LAST_DB_OPENED_AT: &str = "last_db_opened_at";

/// Error type for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings file is not a JSON object: {0}")]
    NotAnObject(PathBuf),
}

/// A previously used journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalReference {
    pub name: Option<String>,
    pub path: Option<String>,
    pub last_opened: Option<DateTime<Utc>>,
}

impl JournalReference {
    /// Whether the store had nothing to say about the last journal.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.path.is_none()
    }
}

/// The settings store, loaded into memory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl SettingsStore {
    /// Default location: `<data dir>/iterate/last_use.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("iterate").join(LAST_USE_FILE))
    }

    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                _ => return Err(SettingsError::NotAnObject(path)),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file yet");
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    /// An empty store that will be written to `path` on save.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Map::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `key`. Values of the wrong type read as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "ignoring settings value of unexpected type");
                None
            }
        }
    }

    /// Set `key` in memory. Call [`save`](Self::save) to persist.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), SettingsError> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove `key` in memory.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Write the store to disk atomically.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(&self.entries)?;
        atomic_write(&self.path, &content)?;
        Ok(())
    }

    /// The last-used journal.
    pub fn history(&self) -> JournalReference {
        let last_opened = self
            .get::<String>(LAST_DB_OPENED_AT)
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        JournalReference {
            name: self.get(LAST_DB_NAME),
            path: self.get(LAST_DB_PATH),
            last_opened,
        }
    }

    /// Record `path` as the last-used journal and persist the store.
    ///
    /// The display name is the file stem.
    pub fn record_last_use(&mut self, path: &str, now: DateTime<Utc>) -> Result<(), SettingsError> {
        let name = Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(path)
            .to_string();

        self.set(LAST_DB_NAME, name)?;
        self.set(LAST_DB_PATH, path)?;
        self.set(LAST_DB_OPENED_AT, now.to_rfc3339())?;
        self.save()
    }
}

/// Write content atomically using temp file + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(LAST_USE_FILE);
    let tmp_path = path.with_file_name(format!("{file_name}.{timestamp}.{pid}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}
