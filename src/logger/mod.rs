//! Structured logging for the relay core
//!
//! Tag-based logging with standard levels (Error/Warning/Info/Debug/Verbose),
//! per-module debug control via `--debug-<module>` flags, and colored console
//! output.
//!
//! ## Usage
//!
//! ```rust
//! use datarelay::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "upstream request failed");
//! logger::info(LogTag::Dispatch, "ticker served from cache");
//! logger::debug(LogTag::Relay, "wrapping URL for relay proxy"); // --debug-relay
//! ```
//!
//! Call `logger::init()` once at startup to pick up command-line flags;
//! logging works with defaults (Info level) without it.

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger from command-line arguments.
///
/// Scans for `--quiet`, `--verbose`, and `--debug-<module>` flags and
/// configures filtering accordingly.
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown).
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues).
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations).
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level. Only shown when `--debug-<module>` is set for the tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level. Only shown with `--verbose`.
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
