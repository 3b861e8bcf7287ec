#![deny(missing_docs)]
//! Shared logging utilities for the cheapo workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a per-thread graph pass context that the macros stamp onto every record,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Id of the dataflow pass currently being evaluated on this thread.
    static PASS_ID: Cell<u64> = const { Cell::new(0) };
}

/// Records the id of the pass the current thread is evaluating.
/// The core calls this at the start of every recomputation pass.
pub fn set_pass(pass: u64) {
    PASS_ID.with(|v| v.set(pass));
}

/// Returns the id of the last pass recorded on this thread, or 0 before the
/// first pass.
pub fn current_pass() -> u64 {
    PASS_ID.with(|v| v.get())
}

/// Logs a trace-level message, prefixed with the current pass id.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[pass {}] {}", $crate::current_pass(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message, prefixed with the current pass id.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[pass {}] {}", $crate::current_pass(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message, prefixed with the current pass id.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[pass {}] {}", $crate::current_pass(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message, prefixed with the current pass id.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[pass {}] {}", $crate::current_pass(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message, prefixed with the current pass id.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[pass {}] {}", $crate::current_pass(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
