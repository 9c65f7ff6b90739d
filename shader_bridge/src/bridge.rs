/// Shader bridge - process-wide state for the translation toolchain
///
/// The front-end toolchain keeps global state between its init and shutdown
/// calls, so at most one compiler may own it at a time. This module holds that
/// ownership flag together with the global logger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Set while a ToolchainClaim is alive
static TOOLCHAIN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

// ===== TOOLCHAIN CLAIM =====

/// Exclusive ownership of the process-wide toolchain
///
/// Obtained by `ShaderCompiler::new` before the toolchain is initialized and
/// released when the compiler is dropped, after the toolchain has shut down.
#[derive(Debug)]
pub struct ToolchainClaim {
    _private: (),
}

impl ToolchainClaim {
    /// Claim the toolchain
    ///
    /// # Errors
    ///
    /// Returns `Error::ToolchainBusy` if another claim is alive.
    pub fn acquire() -> Result<Self> {
        TOOLCHAIN_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ToolchainBusy)?;

        crate::bridge_debug!("shader_bridge::ShaderBridge", "Toolchain claimed");
        Ok(Self { _private: () })
    }
}

impl Drop for ToolchainClaim {
    fn drop(&mut self) {
        TOOLCHAIN_ACTIVE.store(false, Ordering::Release);
        crate::bridge_debug!("shader_bridge::ShaderBridge", "Toolchain released");
    }
}

// ===== PUBLIC API =====

/// Process-wide shader bridge state
///
/// # Example
///
/// ```no_run
/// use shader_bridge::shader_bridge::ShaderBridge;
/// use shader_bridge::shader_bridge::log::{Logger, LogEntry};
///
/// struct Quiet;
/// impl Logger for Quiet {
///     fn log(&self, _entry: &LogEntry) {}
/// }
///
/// ShaderBridge::set_logger(Quiet);
/// assert!(!ShaderBridge::is_toolchain_active());
/// ```
pub struct ShaderBridge;

impl ShaderBridge {
    /// Whether a compiler currently owns the toolchain
    pub fn is_toolchain_active() -> bool {
        TOOLCHAIN_ACTIVE.load(Ordering::Acquire)
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
        }
    }

    /// Reset logger to DefaultLogger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log a message without file:line information
    ///
    /// Used by bridge_info!, bridge_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log a message with file:line information
    ///
    /// Used by bridge_error!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
