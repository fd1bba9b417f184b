//! Error type for settings persistence
//!
//! None of these reach the host application through `load`/`save`; they are logged
//! and swallowed there. `try_save` and the extension setters return them directly.

use thiserror::Error;

use crate::config::{categorize_io_error, DiskErrorKind};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("settings could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("settings file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("'{0}' is a reserved settings field and cannot be used as an extension")]
    ReservedField(String),

    #[error("extension '{0}' must be a bool, number or string")]
    UnsupportedValue(String),

    #[error("failed to replace settings file: {0}")]
    Persist(#[source] std::io::Error),
}

impl SettingsError {
    /// Disk error category for IO-backed failures
    pub fn disk_error_kind(&self) -> Option<DiskErrorKind> {
        match self {
            SettingsError::Io(e) | SettingsError::Persist(e) => Some(categorize_io_error(e)),
            _ => None,
        }
    }
}
