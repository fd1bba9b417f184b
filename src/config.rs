//! Startup configuration for the diagnostic harness

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the `enabled` flag from the config file
pub const ENABLED_ENV_VAR: &str = "DIAG_HARNESS_ENABLED";

/// File name of the persisted settings record
pub const SETTINGS_FILE_NAME: &str = "harness_settings.json";

/// Categories of disk errors for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Get a short description for this error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full",
            DiskErrorKind::PermissionDenied => "permission denied",
            DiskErrorKind::NotFound => "file or directory not found",
            DiskErrorKind::Other => "io error",
        }
    }
}

/// Categorize an IO error
pub fn categorize_io_error(e: &std::io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28, EDQUOT = 122 (Linux) / 69 (macOS)
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

/// Harness startup configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Master switch for all diagnostic behavior. Release builds set this to false.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Override for the settings file location (default: `<config dir>/harness_settings.json`)
    #[serde(default)]
    pub settings_file: Option<PathBuf>,

    /// Maximum screen log messages kept in memory; 0 keeps everything (default: 1000)
    #[serde(default = "default_screen_log_capacity")]
    pub screen_log_capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_screen_log_capacity() -> usize {
    1_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            settings_file: None,
            screen_log_capacity: default_screen_log_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or return defaults if not found
    ///
    /// The `DIAG_HARNESS_ENABLED` environment variable takes precedence over the file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_file_path())?;
        if let Some(enabled) = enabled_from_env() {
            config.enabled = enabled;
        }
        Ok(config)
    }

    /// Load configuration from a specific path, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Resolved settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.settings_file
            .clone()
            .unwrap_or_else(settings_file_path)
    }

    /// Screen log capacity as an optional bound
    pub fn screen_log_bound(&self) -> Option<usize> {
        match self.screen_log_capacity {
            0 => None,
            n => Some(n),
        }
    }
}

/// Parse the enablement override from the environment
fn enabled_from_env() -> Option<bool> {
    std::env::var(ENABLED_ENV_VAR)
        .ok()
        .and_then(|v| parse_flag(&v))
}

/// Parse a boolean-ish flag value
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the base configuration directory (~/.diag-harness)
/// Falls back to ./.diag-harness if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".diag-harness")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".diag-harness"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the default path to the persisted settings record
pub fn settings_file_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE_NAME)
}
