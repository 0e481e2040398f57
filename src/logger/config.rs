/// Logger configuration and command-line flag parsing
///
/// Filtering state lives in a process-wide RwLock so the logging functions
/// stay free functions. Defaults (Info level, no debug tags) apply until
/// `init_from_args` runs.
use std::collections::HashSet;
use std::env;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::levels::LogLevel;
use super::tags::LogTag;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    /// Tags with `--debug-<module>` enabled.
    pub debug_tags: HashSet<String>,
    /// Tags with `--verbose-<module>` enabled.
    pub verbose_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Parse command-line arguments into the logger configuration.
///
/// Recognized flags:
/// - `--quiet`            minimum level Warning
/// - `--verbose`          minimum level Verbose
/// - `--debug-<module>`   enable Debug logs for one tag (e.g. `--debug-relay`)
/// - `--verbose-<module>` enable Verbose logs for one tag
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    for arg in env::args() {
        if arg == "--quiet" {
            config.min_level = LogLevel::Warning;
        } else if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
        } else if let Some(module) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(module.to_string());
        } else if let Some(module) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(module.to_string());
        }
    }

    set_logger_config(config);
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config().debug_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config()
        .verbose_tags
        .contains(&tag.to_debug_key())
}
