//! diag-harness - in-app diagnostic harness
//!
//! Leveled, tag-filterable console logging and an on-screen log feed, governed by a
//! settings record that is persisted between launches and can be changed at runtime.

#[macro_use]
mod macros;

pub mod config;
pub mod harness;
pub mod logging;
pub mod settings;

pub use harness::{Harness, HarnessOptions};
pub use logging::{
    CallSite, ConsoleSink, LogLevel, LogRouter, MemorySink, ScreenLogBuffer, ScreenLogMessage,
    StdoutSink,
};
pub use settings::{SettingsError, SettingsRecord, SettingsStore};
