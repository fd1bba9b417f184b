//! Console log routing
//!
//! Decides whether a log call is emitted based on the current settings (level switches
//! and tag filter) and writes the formatted line to a console sink.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::level::LogLevel;
use crate::settings::{SettingsRecord, SettingsStore};

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file as given by `file!()`
    pub file: &'static str,
    /// Name of the enclosing function
    pub function: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }

    /// Last path component of the source file
    pub fn file_name(&self) -> &str {
        Path::new(self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file)
    }
}

/// Destination for emitted console lines
pub trait ConsoleSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes lines to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
    }
}

/// Keeps emitted lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl ConsoleSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Whether the call's tag matches the active filter
///
/// An empty stored filter matches everything, including an untagged call.
pub fn filter_matches(settings: &SettingsRecord, filter_tag: Option<&str>) -> bool {
    settings.filter.is_empty() || filter_tag.unwrap_or("") == settings.filter
}

/// Level and filter decision for a single log call
pub fn should_emit(settings: &SettingsRecord, level: LogLevel, filter_tag: Option<&str>) -> bool {
    if !settings.level_enabled(level) {
        return false;
    }
    if filter_matches(settings, filter_tag) {
        return true;
    }
    level.can_bypass_filter() && settings.do_not_filter_error_critical_logs
}

/// Format a console line
///
/// `<symbol>\t====> <message> ............ <file>: <function> [Line: <n>]`
pub fn format_line(level: LogLevel, message: Option<&dyn fmt::Display>, site: &CallSite) -> String {
    let message = match message {
        Some(m) => m.to_string(),
        None => "nil".to_string(),
    };
    format!(
        "{}\t====> {} ............ {}: {} [Line: {}]",
        level.symbol(),
        message,
        site.file_name(),
        site.function,
        site.line
    )
}

/// Routes log calls to the console sink
pub struct LogRouter {
    enabled: bool,
    settings: Arc<SettingsStore>,
    sink: Arc<dyn ConsoleSink>,
}

impl LogRouter {
    pub fn new(enabled: bool, settings: Arc<SettingsStore>, sink: Arc<dyn ConsoleSink>) -> Self {
        Self {
            enabled,
            settings,
            sink,
        }
    }

    /// Check the current settings for a level and tag
    pub fn can_log(&self, level: LogLevel, filter_tag: Option<&str>) -> bool {
        if !self.enabled {
            return false;
        }
        self.settings
            .read(|settings| should_emit(settings, level, filter_tag))
    }

    /// Emit a log call if the settings allow it
    ///
    /// Returns true if a line was written.
    pub fn emit(
        &self,
        level: LogLevel,
        message: Option<&dyn fmt::Display>,
        filter_tag: Option<&str>,
        site: &CallSite,
    ) -> bool {
        if !self.can_log(level, filter_tag) {
            return false;
        }
        self.sink.write_line(&format_line(level, message, site));
        true
    }
}

impl fmt::Debug for LogRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRouter")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SITE: CallSite = CallSite::new("src/net/client.rs", "fetch", 42);

    fn settings_with_filter(filter: &str) -> SettingsRecord {
        let mut settings = SettingsRecord::default();
        settings.filter = filter.to_string();
        settings
    }

    fn router(temp_dir: &TempDir, enabled: bool) -> (LogRouter, Arc<SettingsStore>, Arc<MemorySink>) {
        let store = Arc::new(SettingsStore::new(
            temp_dir.path().join("harness_settings.json"),
            enabled,
            SettingsRecord::default(),
        ));
        let sink = Arc::new(MemorySink::new());
        let router = LogRouter::new(enabled, Arc::clone(&store), sink.clone());
        (router, store, sink)
    }

    #[test]
    fn test_empty_filter_matches_any_tag() {
        let settings = SettingsRecord::default();
        assert!(filter_matches(&settings, None));
        assert!(filter_matches(&settings, Some("")));
        assert!(filter_matches(&settings, Some("net")));
    }

    #[test]
    fn test_filter_requires_exact_tag() {
        let settings = settings_with_filter("net");
        assert!(filter_matches(&settings, Some("net")));
        assert!(!filter_matches(&settings, Some("network")));
        assert!(!filter_matches(&settings, Some("ui")));
        assert!(!filter_matches(&settings, None));
    }

    #[test]
    fn test_non_error_levels_follow_switch_and_filter() {
        for level in [LogLevel::Info, LogLevel::Debug, LogLevel::Warn, LogLevel::Todo] {
            for bypass in [false, true] {
                let mut settings = settings_with_filter("net");
                settings.do_not_filter_error_critical_logs = bypass;

                assert!(should_emit(&settings, level, Some("net")));
                assert!(!should_emit(&settings, level, Some("ui")));

                settings.set_level_enabled(level, false);
                assert!(!should_emit(&settings, level, Some("net")));
            }
        }
    }

    #[test]
    fn test_error_levels_bypass_filter_when_configured() {
        for level in [LogLevel::Error, LogLevel::Critical] {
            let mut settings = settings_with_filter("net");

            settings.do_not_filter_error_critical_logs = true;
            assert!(should_emit(&settings, level, Some("ui")));
            assert!(should_emit(&settings, level, None));

            settings.do_not_filter_error_critical_logs = false;
            assert!(!should_emit(&settings, level, Some("ui")));
            assert!(should_emit(&settings, level, Some("net")));

            settings.do_not_filter_error_critical_logs = true;
            settings.set_level_enabled(level, false);
            assert!(!should_emit(&settings, level, Some("ui")));
            assert!(!should_emit(&settings, level, Some("net")));
        }
    }

    #[test]
    fn test_format_line() {
        let line = format_line(LogLevel::Warn, Some(&"disk almost full"), &SITE);
        assert_eq!(
            line,
            "⚠️\t====> disk almost full ............ client.rs: fetch [Line: 42]"
        );
    }

    #[test]
    fn test_format_line_absent_message() {
        let line = format_line(LogLevel::Info, None, &SITE);
        assert!(line.starts_with("👁\t====> nil ............ "));
    }

    #[test]
    fn test_format_line_todo() {
        let line = format_line(LogLevel::Todo, Some(&"wire up retry"), &SITE);
        assert!(line.starts_with("📌 TODO:\t====> wire up retry"));
    }

    #[test]
    fn test_call_site_file_name() {
        assert_eq!(SITE.file_name(), "client.rs");
        assert_eq!(CallSite::new("main.rs", "main", 1).file_name(), "main.rs");
    }

    #[test]
    fn test_emit_scenario_error_bypass() {
        let temp_dir = TempDir::new().unwrap();
        let (router, store, sink) = router(&temp_dir, true);
        store.update(|settings| {
            settings.filter = "net".to_string();
            settings.do_not_filter_error_critical_logs = true;
            settings.error_console_logs = true;
            settings.info_console_logs = true;
        });

        assert!(router.emit(LogLevel::Error, Some(&"x"), Some("ui"), &SITE));
        assert!(!router.emit(LogLevel::Info, Some(&"x"), Some("ui"), &SITE));

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("‼️\t====> x"));
    }

    #[test]
    fn test_emit_sees_latest_settings() {
        let temp_dir = TempDir::new().unwrap();
        let (router, store, sink) = router(&temp_dir, true);

        assert!(router.emit(LogLevel::Debug, Some(&1), None, &SITE));
        store.set_level_enabled(LogLevel::Debug, false);
        assert!(!router.emit(LogLevel::Debug, Some(&2), None, &SITE));
        store.set_level_enabled(LogLevel::Debug, true);
        assert!(router.emit(LogLevel::Debug, Some(&3), None, &SITE));

        assert_eq!(sink.lines().len(), 2);
    }

    #[test]
    fn test_emit_sees_saved_record_without_reload() {
        let temp_dir = TempDir::new().unwrap();
        let (router, store, sink) = router(&temp_dir, true);

        let mut quiet = SettingsRecord::default();
        quiet.info_console_logs = false;
        store.save(&quiet);

        assert!(!router.emit(LogLevel::Info, Some(&"x"), None, &SITE));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_emit_after_opt_out_agrees_with_load() {
        let temp_dir = TempDir::new().unwrap();
        let (router, store, _sink) = router(&temp_dir, true);

        store.set_filter("net");
        assert!(!router.can_log(LogLevel::Info, Some("ui")));

        store.set_persist_settings(false);
        assert!(router.can_log(LogLevel::Info, Some("ui")));
        assert_eq!(store.load().filter, "");
        assert!(router.can_log(LogLevel::Info, Some("ui")));
    }

    #[test]
    fn test_disabled_router_never_writes() {
        let temp_dir = TempDir::new().unwrap();
        let (router, _store, sink) = router(&temp_dir, false);

        for level in LogLevel::ALL {
            assert!(!router.can_log(level, None));
            assert!(!router.emit(level, Some(&"x"), None, &SITE));
        }
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_memory_sink_clear() {
        let sink = MemorySink::new();
        sink.write_line("a");
        sink.write_line("b");
        assert_eq!(sink.lines(), vec!["a".to_string(), "b".to_string()]);
        sink.clear();
        assert!(sink.lines().is_empty());
    }
}
