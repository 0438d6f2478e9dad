//! Logging utilities for the Slotbook service.
//!
//! Every crate logs through `tracing`; this module installs the subscriber once
//! and offers a couple of helpers for recording outcomes.

use std::str::FromStr;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// # Examples
///
/// ```
/// use slotbook_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG); // no-op, already installed
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives are honoured; the `slotbook` target is set to `level` on top.
/// Calling this more than once is harmless.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("slotbook={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parses a configured level name, falling back to INFO.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
