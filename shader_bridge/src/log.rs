//! Compiler diagnostics
//!
//! Every stage of the pipeline reports through one process-wide `Logger`
//! (see `ShaderBridge::set_logger`). Errors carry the file and line that
//! raised them; the default sink writes colored lines to stderr.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for compiler diagnostics
///
/// ```no_run
/// use shader_bridge::shader_bridge::log::{Logger, LogEntry, LogSeverity};
///
/// /// Forwards only failures to the engine console
/// struct ErrorsOnly;
///
/// impl Logger for ErrorsOnly {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity == LogSeverity::Error {
///             eprintln!("shader: {}", entry.message);
///         }
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One diagnostic
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. `shader_bridge::Compiler`
    pub source: String,
    pub message: String,
    /// Set by `bridge_error!` only
    pub file: Option<&'static str>,
    /// Set by `bridge_error!` only
    pub line: Option<u32>,
}

/// Diagnostic severity, ordered from chattiest to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Emitted text, per-resource remaps, skipped patches
    Trace,
    /// Per-stage progress (lowering, linking, flattening)
    Debug,
    /// Toolchain claimed and initialized
    Info,
    /// Input the pipeline accepts but probably should not see
    Warn,
    /// The compile call failed
    Error,
}

impl LogSeverity {
    /// Five-character label, padded so columns line up
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

fn timestamp(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn location(entry: &LogEntry) -> String {
    match (entry.file, entry.line) {
        (Some(file), Some(line)) => format!(" ({}:{})", file, line),
        _ => String::new(),
    }
}

/// Stderr logger installed until `ShaderBridge::set_logger` replaces it
///
/// Lines read `[timestamp] [SEVERITY] [source] message`, with ` (file:line)`
/// appended for errors.
pub struct DefaultLogger;

impl DefaultLogger {
    /// The line `log` prints, without terminal colors
    pub fn format_plain(entry: &LogEntry) -> String {
        format!(
            "[{}] [{}] [{}] {}{}",
            timestamp(entry),
            entry.severity.label(),
            entry.source,
            entry.message,
            location(entry)
        )
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let label = entry.severity.label();
        let severity = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };

        eprintln!(
            "[{}] [{}] [{}] {}{}",
            timestamp(entry),
            severity,
            entry.source.bright_blue(),
            entry.message,
            location(entry)
        );
    }
}

// ===== MACROS =====
//
// All five route through `ShaderBridge`, so they honor the installed logger.

/// ```ignore
/// bridge_trace!("shader_bridge::Compiler", "Emitted {} bytes", len);
/// ```
#[macro_export]
macro_rules! bridge_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::shader_bridge::ShaderBridge::log(
            $crate::shader_bridge::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! bridge_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::shader_bridge::ShaderBridge::log(
            $crate::shader_bridge::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! bridge_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::shader_bridge::ShaderBridge::log(
            $crate::shader_bridge::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! bridge_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::shader_bridge::ShaderBridge::log(
            $crate::shader_bridge::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Records the call site's `file!()` and `line!()`
///
/// ```ignore
/// bridge_error!("shader_bridge::Compiler", "Failed to compile: {}", error);
/// ```
#[macro_export]
macro_rules! bridge_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::shader_bridge::ShaderBridge::log_detailed(
            $crate::shader_bridge::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
