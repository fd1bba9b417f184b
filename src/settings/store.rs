//! Settings persistence
//!
//! Holds the one authoritative in-memory settings record and writes it through to a
//! JSON file on every mutation. Persistence problems are logged and swallowed; the
//! in-memory record keeps working either way.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tempfile::NamedTempFile;

use super::{check_extension, SettingsError, SettingsRecord};
use crate::logging::LogLevel;

/// Store for the current settings record
#[derive(Debug)]
pub struct SettingsStore {
    /// The current record
    current: Mutex<SettingsRecord>,
    /// Extension fields (with their defaults) registered at startup
    extension_defaults: BTreeMap<String, Value>,
    /// Path to the settings file
    store_path: PathBuf,
    /// Harness enablement; when false the store never touches the disk
    enabled: bool,
}

impl SettingsStore {
    /// Create a store whose current record is `initial`
    ///
    /// Extension fields present on `initial` become part of every fresh default record.
    pub fn new(store_path: PathBuf, enabled: bool, initial: SettingsRecord) -> Self {
        Self {
            extension_defaults: initial.extensions.clone(),
            current: Mutex::new(initial),
            store_path,
            enabled,
        }
    }

    /// Path to the settings file
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A fresh default record, including registered extension defaults
    pub fn default_record(&self) -> SettingsRecord {
        SettingsRecord {
            extensions: self.extension_defaults.clone(),
            ..SettingsRecord::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, SettingsRecord> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current record
    pub fn current(&self) -> SettingsRecord {
        self.lock().clone()
    }

    /// Read the current record without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&SettingsRecord) -> R) -> R {
        f(&self.lock())
    }

    /// Load settings from disk
    ///
    /// - Disabled harness: fresh defaults, no IO.
    /// - Missing or undecodable file: fresh defaults; the current record is left alone.
    /// - Stored record with `persistSettings` on: it becomes the current record.
    /// - Stored record with `persistSettings` off: fresh defaults with persistence
    ///   still off become the current record, so the opt-out sticks.
    pub fn load(&self) -> SettingsRecord {
        if !self.enabled {
            return self.default_record();
        }

        let mut current = self.lock();

        let stored = match self.read_from_disk() {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(
                    "No settings file at {}, using defaults",
                    self.store_path.display()
                );
                return self.default_record();
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unusable settings file {}: {}",
                    self.store_path.display(),
                    e
                );
                return self.default_record();
            }
        };

        let record = if stored.persist_settings {
            self.with_missing_extensions(stored)
        } else {
            tracing::debug!("Stored settings opted out of persistence, resetting to defaults");
            SettingsRecord {
                persist_settings: false,
                ..self.default_record()
            }
        };

        *current = record.clone();
        record
    }

    /// Fill extension fields registered at startup but absent from a stored record
    fn with_missing_extensions(&self, mut record: SettingsRecord) -> SettingsRecord {
        for (name, value) in &self.extension_defaults {
            record
                .extensions
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        record
    }

    fn read_from_disk(&self) -> Result<Option<SettingsRecord>, SettingsError> {
        if !self.store_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.store_path)?;
        SettingsRecord::from_json(&content).map(Some)
    }

    /// Make a record current and write it to disk, logging and swallowing any failure
    pub fn save(&self, record: &SettingsRecord) {
        let mut current = self.lock();
        let record = self.promote(&current, record.clone());
        *current = record;
        self.write_through(&current);
    }

    /// Make a record current and write it to disk atomically
    ///
    /// The record is written to a temporary file next to the target and renamed over
    /// it, so readers only ever see a complete file. The in-memory record is replaced
    /// even when the write fails. Nothing touches disk when the harness is disabled.
    pub fn try_save(&self, record: &SettingsRecord) -> Result<(), SettingsError> {
        let mut current = self.lock();
        let record = self.promote(&current, record.clone());
        *current = record;
        self.write(&current)
    }

    /// Mutate the current record and write it through in one step
    ///
    /// The lock is held across the write so the file never lags behind a newer
    /// in-memory value.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut SettingsRecord) -> R) -> R {
        let mut current = self.lock();
        let mut next = current.clone();
        let result = mutate(&mut next);
        let next = self.promote(&current, next);
        *current = next;
        self.write_through(&current);
        result
    }

    /// Turning persistence off swaps in fresh defaults, matching what the next `load` sees
    fn promote(&self, current: &SettingsRecord, next: SettingsRecord) -> SettingsRecord {
        if current.persist_settings && !next.persist_settings {
            SettingsRecord {
                persist_settings: false,
                ..self.default_record()
            }
        } else {
            next
        }
    }

    fn write(&self, record: &SettingsRecord) -> Result<(), SettingsError> {
        if !self.enabled {
            return Ok(());
        }
        write_atomically(&self.store_path, &record.to_json()?)
    }

    fn write_through(&self, record: &SettingsRecord) {
        if let Err(e) = self.write(record) {
            match e.disk_error_kind() {
                Some(kind) => tracing::warn!(
                    "Failed to save settings to {} ({}): {}",
                    self.store_path.display(),
                    kind.user_message(),
                    e
                ),
                None => tracing::warn!(
                    "Failed to save settings to {}: {}",
                    self.store_path.display(),
                    e
                ),
            }
        }
    }

    /// Replace the current record with defaults and write it through
    pub fn reset(&self) {
        let defaults = self.default_record();
        self.update(|record| *record = defaults);
    }

    pub fn set_hide_screen_logs(&self, hide: bool) {
        self.update(|record| record.hide_screen_logs = hide);
    }

    pub fn set_level_enabled(&self, level: LogLevel, enabled: bool) {
        self.update(|record| record.set_level_enabled(level, enabled));
    }

    /// Set the tag filter; surrounding whitespace is trimmed
    pub fn set_filter(&self, filter: &str) {
        let filter = filter.trim().to_string();
        self.update(|record| record.filter = filter);
    }

    pub fn set_do_not_filter_error_critical_logs(&self, bypass: bool) {
        self.update(|record| record.do_not_filter_error_critical_logs = bypass);
    }

    pub fn set_persist_settings(&self, persist: bool) {
        self.update(|record| record.persist_settings = persist);
    }

    /// Set an application-defined setting and write it through
    pub fn set_extension(&self, name: &str, value: impl Into<Value>) -> Result<(), SettingsError> {
        let value = value.into();
        check_extension(name, &value)?;
        self.update(|record| {
            record.extensions.insert(name.to_string(), value);
        });
        Ok(())
    }
}

/// Write `content` to `path` via a temp file in the same directory
fn write_atomically(path: &Path, content: &str) -> Result<(), SettingsError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|e| SettingsError::Persist(e.error))?;
    Ok(())
}
