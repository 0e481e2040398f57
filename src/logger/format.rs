/// Log formatting and console output
///
/// Colorized output with aligned tag and level columns. Broken pipes (piped
/// output cut short) are swallowed rather than panicking.
use std::io::{stdout, ErrorKind, Write};

use chrono::Local;
use colored::*;

use super::levels::LogLevel;
use super::tags::LogTag;

const TAG_WIDTH: usize = 10;

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();

    let tag_str = format!("{:width$}", tag.as_str(), width = TAG_WIDTH);
    let tag_str = match tag {
        LogTag::Dispatch => tag_str.cyan(),
        LogTag::Cache => tag_str.green(),
        LogTag::Api => tag_str.blue(),
        LogTag::Rpc => tag_str.magenta(),
        LogTag::Relay => tag_str.yellow(),
        LogTag::Config => tag_str.white(),
    };

    let level_str = match level {
        LogLevel::Error => level.as_str().red().bold(),
        LogLevel::Warning => level.as_str().yellow(),
        LogLevel::Info => level.as_str().normal(),
        LogLevel::Debug => level.as_str().blue(),
        LogLevel::Verbose => level.as_str().dimmed(),
    };

    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        tag_str,
        level_str,
        message
    );

    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("logger write failed: {}", e);
        }
    }
}
