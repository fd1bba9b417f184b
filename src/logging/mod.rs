//! Logging for the diagnostic harness
//!
//! Provides the console log router with its level and tag filtering, the screen log
//! buffer behind the overlay, and tracing setup for the harness's own diagnostics.

mod level;
mod router;
mod screen;
mod subscriber;

pub use level::LogLevel;
pub use router::{
    filter_matches, format_line, should_emit, CallSite, ConsoleSink, LogRouter, MemorySink,
    StdoutSink,
};
pub use screen::{ScreenLogBuffer, ScreenLogMessage};
pub use subscriber::{init_tracing, DEFAULT_FILTER};
