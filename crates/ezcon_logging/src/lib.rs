#![deny(missing_docs)]
//! Shared logging utilities for the ezCon launcher workspace.
//!
//! This crate provides the `ezcon_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Messages logged from
//! a thread that has a run tag set are prefixed with `[run N]`, so output of
//! the drain and wait threads can be told apart in `ezcon_gui.log`.

use std::cell::Cell;

thread_local! {
    /// Run id of the launch the current thread is working for, 0 when none.
    static RUN_TAG: Cell<u64> = const { Cell::new(0) };
}

/// Tags every message logged from the current thread with `run_id`.
///
/// Pass 0 to clear the tag.
pub fn set_run_tag(run_id: u64) {
    RUN_TAG.with(|v| v.set(run_id));
}

/// Returns the run id the current thread is tagged with, or 0.
pub fn run_tag() -> u64 {
    RUN_TAG.with(|v| v.get())
}

/// Prefix inserted in front of each message by the logging macros.
#[doc(hidden)]
pub fn run_prefix() -> String {
    match run_tag() {
        0 => String::new(),
        id => format!("[run {id}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! ezcon_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! ezcon_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! ezcon_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! ezcon_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! ezcon_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::run_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
