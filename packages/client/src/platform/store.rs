//! File-backed preference store

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use serde_json::Value;

use super::PlatformData;

/// Key reserved for the last captured panic. Never rendered as a setting.
pub const LAST_KNOWN_EXCEPTION_KEY: &str = "LAST_KNOWN_EXCEPTION_KEY";

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Preference store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Preference store {path} is not a JSON object: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON object on disk holding application settings plus the reserved
/// last-exception entry.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl PreferenceStore {
    /// Load the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the file exists but cannot be read or
    /// parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PlatformError> {
        let path = path.into();
        let entries: BTreeMap<String, Value> = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| PlatformError::Format {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PlatformError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Store `value` under `key` and write the store to disk.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Io` if the file cannot be written.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), PlatformError> {
        let mut entries = self.lock();
        entries.insert(key.into(), value.into());
        self.write(&entries)
    }

    /// Remove `key`, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Io` if the file cannot be written.
    pub fn remove(&self, key: &str) -> Result<Option<Value>, PlatformError> {
        let mut entries = self.lock();
        let previous = entries.remove(key);
        self.write(&entries)?;
        Ok(previous)
    }

    /// Forget the captured panic, typically after a successful upload.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Io` if the file cannot be written.
    pub fn clear_last_known_exception(&self) -> Result<(), PlatformError> {
        self.remove(LAST_KNOWN_EXCEPTION_KEY).map(|_| ())
    }

    /// Like [`set`](Self::set) but gives up instead of blocking. Returns
    /// `false` when the lock was busy.
    pub(super) fn try_set(&self, key: &str, value: String) -> Result<bool, PlatformError> {
        // the panicking thread may already hold the lock
        let mut entries = match self.entries.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Ok(false),
        };
        entries.insert(key.to_string(), Value::String(value));
        self.write(&entries)?;
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        // a panic hook may run while another thread held the lock
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, entries: &BTreeMap<String, Value>) -> Result<(), PlatformError> {
        let io_error = |source: std::io::Error| PlatformError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_vec_pretty(entries).map_err(|e| io_error(e.into()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&self.path, json).map_err(io_error)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl PlatformData for PreferenceStore {
    fn user_settings(&self) -> String {
        self.lock()
            .iter()
            .filter(|(key, _)| key.as_str() != LAST_KNOWN_EXCEPTION_KEY)
            .map(|(key, value)| format!("\n{key}: {}", render(value)))
            .collect()
    }

    fn last_known_exception(&self) -> String {
        self.lock()
            .get(LAST_KNOWN_EXCEPTION_KEY)
            .map(render)
            .unwrap_or_default()
    }
}
