//! The harness context
//!
//! Constructed once at startup with the enablement flag and the initial settings
//! record, then shared (usually behind an `Arc`) with everything that logs. When the
//! harness is disabled nothing touches the disk, no console line is written and the
//! screen log stays empty.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::logging::{
    CallSite, ConsoleSink, LogLevel, LogRouter, ScreenLogBuffer, StdoutSink,
};
use crate::settings::{SettingsRecord, SettingsStore};

/// Startup options for [`Harness::new`]
pub struct HarnessOptions {
    /// Master switch; release builds pass false
    pub enabled: bool,
    /// Location of the persisted settings file
    pub settings_path: PathBuf,
    /// Initial settings, including any application extension fields and their defaults
    pub initial_settings: SettingsRecord,
    /// Bound on the screen log; `None` or `Some(0)` keeps everything
    pub screen_log_capacity: Option<usize>,
    /// Where console lines go
    pub sink: Arc<dyn ConsoleSink>,
}

impl HarnessOptions {
    pub fn new(enabled: bool, settings_path: PathBuf) -> Self {
        Self {
            enabled,
            settings_path,
            initial_settings: SettingsRecord::default(),
            screen_log_capacity: None,
            sink: Arc::new(StdoutSink),
        }
    }

    pub fn with_initial_settings(mut self, settings: SettingsRecord) -> Self {
        self.initial_settings = settings;
        self
    }

    pub fn with_screen_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.screen_log_capacity = capacity;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ConsoleSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// Diagnostic harness: settings store, console router and screen log
pub struct Harness {
    enabled: bool,
    settings: Arc<SettingsStore>,
    router: LogRouter,
    screen_logs: ScreenLogBuffer,
}

impl Harness {
    /// Build the harness and load any persisted settings
    pub fn new(options: HarnessOptions) -> Self {
        let HarnessOptions {
            enabled,
            settings_path,
            initial_settings,
            screen_log_capacity,
            sink,
        } = options;

        let settings = Arc::new(SettingsStore::new(settings_path, enabled, initial_settings));
        if enabled {
            settings.load();
            tracing::debug!("Harness enabled, settings at {}", settings.path().display());
        }

        Self {
            enabled,
            router: LogRouter::new(enabled, Arc::clone(&settings), sink),
            screen_logs: ScreenLogBuffer::new(enabled, screen_log_capacity, Arc::clone(&settings)),
            settings,
        }
    }

    /// Build the harness from the startup config file
    pub fn from_config(config: &Config, initial_settings: SettingsRecord) -> Self {
        Self::new(
            HarnessOptions::new(config.enabled, config.settings_path())
                .with_initial_settings(initial_settings)
                .with_screen_log_capacity(config.screen_log_bound()),
        )
    }

    /// A harness that does nothing, for release builds
    pub fn disabled() -> Self {
        Self::new(HarnessOptions::new(false, config::settings_file_path()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The settings store (what a settings panel reads and writes)
    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn router(&self) -> &LogRouter {
        &self.router
    }

    /// The screen log buffer (what an overlay displays)
    pub fn screen_logs(&self) -> &ScreenLogBuffer {
        &self.screen_logs
    }

    /// Emit a console log call; returns true if a line was written
    pub fn log(
        &self,
        level: LogLevel,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.router.emit(level, message, filter_tag, site)
    }

    pub fn info(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Info, message, filter_tag, site)
    }

    pub fn debug(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Debug, message, filter_tag, site)
    }

    pub fn warn(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Warn, message, filter_tag, site)
    }

    /// Error line; passes a non-matching filter when the bypass setting is on
    pub fn error(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Error, message, filter_tag, site)
    }

    /// Critical line; passes a non-matching filter when the bypass setting is on
    pub fn critical(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Critical, message, filter_tag, site)
    }

    pub fn todo(
        &self,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        self.log(LogLevel::Todo, message, filter_tag, site)
    }

    /// Add a message to the screen log, regardless of levels and filters
    ///
    /// An absent message is shown as `nil`.
    pub fn to_screen(
        &self,
        message: Option<&dyn fmt::Display>,
        details: Option<&dyn fmt::Display>,
    ) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let text = match message {
            Some(m) => m.to_string(),
            None => "nil".to_string(),
        };
        self.screen_logs
            .append(text, details.map(|d| d.to_string()))
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("enabled", &self.enabled)
            .field("settings_path", &self.settings.path())
            .field("screen_logs", &self.screen_logs)
            .finish()
    }
}
