#![forbid(unsafe_code)]

//! Logging bootstrap for hosts that do not install their own subscriber.
//!
//! The library only emits `tracing` events. Filtering follows the
//! `DOCKGRID_LOG` environment variable (standard `EnvFilter` directives,
//! e.g. `dockgrid.resolve=trace,info`) and falls back to the level the host
//! passes in.

use tracing_subscriber::EnvFilter;

/// Environment variable read for filter directives.
pub const LOG_ENV_VAR: &str = "DOCKGRID_LOG";

fn filter(default_level: tracing::Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()))
}

/// Install a human-readable `fmt` subscriber.
///
/// Returns `false` if a global subscriber was already set; the existing one
/// stays in place.
pub fn init(default_level: tracing::Level) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install a JSON-lines subscriber.
#[cfg(feature = "tracing-json")]
pub fn init_json(default_level: tracing::Level) -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(default_level))
        .with_current_span(true)
        .try_init()
        .is_ok()
}
