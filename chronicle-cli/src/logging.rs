//! Logging setup for the CLI.
//!
//! Logging is off unless requested through the environment:
//!
//! - `CHRONICLE_DEBUG=true|1|yes` - enable debug-level logging
//! - `CHRONICLE_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `CHRONICLE_LOG_FORMAT=json|pretty|compact` - output format (default: compact)
//!
//! Logs always go to stderr; stdout carries command output such as merged scripts.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `CHRONICLE_DEBUG`.
pub fn is_debug_enabled() -> bool {
    env::var("CHRONICLE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `CHRONICLE_LOG_LEVEL`.
///
/// Defaults to "debug" if `CHRONICLE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    if let Ok(level) = env::var("CHRONICLE_LOG_LEVEL") {
        match level.to_lowercase().as_str() {
            "trace" => return "trace",
            "debug" => return "debug",
            "info" => return "info",
            "warn" => return "warn",
            "error" => return "error",
            _ => {}
        }
    }

    if is_debug_enabled() { "debug" } else { "warn" }
}

/// Get the configured output format from `CHRONICLE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    match env::var("CHRONICLE_LOG_FORMAT")
        .map(|v| v.to_lowercase())
        .as_deref()
    {
        Ok("json") => "json",
        Ok("pretty") => "pretty",
        _ => "compact",
    }
}

/// Initialize logging. Subsequent calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("CHRONICLE_LOG_LEVEL").is_err() {
            return;
        }

        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let level = get_log_level();
        let filter = EnvFilter::try_new(format!(
            "chronicle={},chronicle_cli={},chronicle_migrate={}",
            level, level, level
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let registry = tracing_subscriber::registry().with(filter);
        match get_log_format() {
            "json" => registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init(),
            "pretty" => registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init(),
            _ => registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init(),
        }

        tracing::debug!(level = level, format = get_log_format(), "Logging initialized");
    });
}
