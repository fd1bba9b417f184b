//! Console log levels

use std::fmt;

/// Severity of a console log call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Debug,
    Warn,
    Error,
    Critical,
    Todo,
}

impl LogLevel {
    /// Every level, in settings panel order
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Todo,
    ];

    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Todo => "TODO",
        }
    }

    /// Glyph that prefixes console lines of this level
    pub fn symbol(&self) -> &'static str {
        match self {
            LogLevel::Info => "👁",
            LogLevel::Debug => "🕸",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "‼️",
            LogLevel::Critical => "🛑",
            LogLevel::Todo => "📌 TODO:",
        }
    }

    /// Check if this level may skip the tag filter (error and critical)
    pub fn can_bypass_filter(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
