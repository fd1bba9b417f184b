//! Persisted harness settings
//!
//! The settings record governs which console log levels are emitted, the active tag
//! filter, and whether the screen log overlay is shown. Applications can attach their
//! own scalar settings as extensions; those are stored flat next to the base fields.

mod error;
pub mod store;

pub use error::SettingsError;
pub use store::SettingsStore;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::LogLevel;

/// Current version of the settings file format
pub const SETTINGS_VERSION: u32 = 1;

/// JSON names of the base fields; extensions may not use these
pub const RESERVED_FIELDS: &[&str] = &[
    "version",
    "hideScreenLogs",
    "infoConsoleLogs",
    "debugConsoleLogs",
    "warnConsoleLogs",
    "errorConsoleLogs",
    "criticalConsoleLogs",
    "todoConsoleLogs",
    "filter",
    "doNotFilterErrorCriticalLogs",
    "persistSettings",
];

/// Check if a name belongs to a base settings field
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// The settings record
///
/// Defaults are safe for a release build: every level logs, nothing is filtered,
/// and settings persist between launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    /// File format version
    pub version: u32,

    /// Stop showing the screen log overlay (messages are still collected)
    pub hide_screen_logs: bool,

    pub info_console_logs: bool,
    pub debug_console_logs: bool,
    pub warn_console_logs: bool,
    pub error_console_logs: bool,
    pub critical_console_logs: bool,
    pub todo_console_logs: bool,

    /// Active tag filter; empty matches every log call
    pub filter: String,

    /// Error and critical logs ignore the tag filter
    pub do_not_filter_error_critical_logs: bool,

    /// Keep using the stored settings on the next launch
    pub persist_settings: bool,

    /// Application-defined settings, keyed by JSON name
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            hide_screen_logs: false,
            info_console_logs: true,
            debug_console_logs: true,
            warn_console_logs: true,
            error_console_logs: true,
            critical_console_logs: true,
            todo_console_logs: true,
            filter: String::new(),
            do_not_filter_error_critical_logs: true,
            persist_settings: true,
            extensions: BTreeMap::new(),
        }
    }
}

impl SettingsRecord {
    /// Builder form of [`SettingsRecord::set_extension`]
    pub fn with_extension(
        mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Self, SettingsError> {
        self.set_extension(name, value)?;
        Ok(self)
    }

    /// Set an application-defined setting
    pub fn set_extension(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SettingsError> {
        let value = value.into();
        check_extension(name, &value)?;
        self.extensions.insert(name.to_string(), value);
        Ok(())
    }

    /// Raw value of an application-defined setting
    pub fn extension_value(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Typed value of an application-defined setting
    pub fn extension<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.extensions
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn extension_bool(&self, name: &str) -> Option<bool> {
        self.extensions.get(name).and_then(Value::as_bool)
    }

    /// Iterate over all application-defined settings
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extensions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether console logs of this level are switched on
    pub fn level_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Info => self.info_console_logs,
            LogLevel::Debug => self.debug_console_logs,
            LogLevel::Warn => self.warn_console_logs,
            LogLevel::Error => self.error_console_logs,
            LogLevel::Critical => self.critical_console_logs,
            LogLevel::Todo => self.todo_console_logs,
        }
    }

    pub fn set_level_enabled(&mut self, level: LogLevel, enabled: bool) {
        let flag = match level {
            LogLevel::Info => &mut self.info_console_logs,
            LogLevel::Debug => &mut self.debug_console_logs,
            LogLevel::Warn => &mut self.warn_console_logs,
            LogLevel::Error => &mut self.error_console_logs,
            LogLevel::Critical => &mut self.critical_console_logs,
            LogLevel::Todo => &mut self.todo_console_logs,
        };
        *flag = enabled;
    }

    /// Encode as the JSON stored on disk
    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(SettingsError::Encode)
    }

    /// Decode a stored record
    ///
    /// Files written by a newer format version are rejected. Non-scalar extension
    /// values are dropped.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut record: SettingsRecord =
            serde_json::from_str(json).map_err(SettingsError::Decode)?;

        if record.version > SETTINGS_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: record.version,
                supported: SETTINGS_VERSION,
            });
        }

        record.extensions.retain(|name, value| {
            let keep = is_scalar(value);
            if !keep {
                tracing::debug!("Dropping non-scalar settings extension '{}'", name);
            }
            keep
        });
        record.version = SETTINGS_VERSION;

        Ok(record)
    }
}

impl fmt::Display for SettingsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "SettingsRecord: {}", json),
            Err(_) => write!(f, "SettingsRecord: nil"),
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Validate an extension name and value
pub(crate) fn check_extension(name: &str, value: &Value) -> Result<(), SettingsError> {
    if is_reserved_field(name) {
        return Err(SettingsError::ReservedField(name.to_string()));
    }
    if !is_scalar(value) {
        return Err(SettingsError::UnsupportedValue(name.to_string()));
    }
    Ok(())
}
