use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

/// Structured logging macro for server lifecycle events
#[macro_export]
macro_rules! server_info {
    ($($arg:tt)*) => {
        tracing::info!(category = "server", $($arg)*)
    };
}

/// Structured logging macro for server lifecycle events with fields
#[macro_export]
macro_rules! server_info_with_fields {
    ($($field:ident = $value:expr),*; $($arg:tt)*) => {
        tracing::info!(category = "server", $($field = $value,)* $($arg)*)
    };
}

/// Structured logging macro for server warnings
#[macro_export]
macro_rules! server_warn {
    ($($arg:tt)*) => {
        tracing::warn!(category = "server", $($arg)*)
    };
}

/// Structured logging macro for server errors
#[macro_export]
macro_rules! server_error {
    ($($arg:tt)*) => {
        tracing::error!(category = "server", $($arg)*)
    };
}

/// Structured logging macro for rate limiter activity
#[macro_export]
macro_rules! ratelimit_info {
    ($($arg:tt)*) => {
        tracing::info!(category = "ratelimit", $($arg)*)
    };
}

/// Structured logging macro for tutoring requests with fields
#[macro_export]
macro_rules! tutor_info_with_fields {
    ($($field:ident = $value:expr),*; $($arg:tt)*) => {
        tracing::info!(category = "tutor", $($field = $value,)* $($arg)*)
    };
}

/// Structured logging macro for recoverable upstream trouble
#[macro_export]
macro_rules! upstream_warn {
    ($($arg:tt)*) => {
        tracing::warn!(category = "upstream", $($arg)*)
    };
}

/// Structured logging macro for failed upstream attempts
#[macro_export]
macro_rules! upstream_error {
    ($($arg:tt)*) => {
        tracing::error!(category = "upstream", $($arg)*)
    };
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let result = match config.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(false).try_init(),
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("tracing subscriber already installed: {}", e);
    }
}
