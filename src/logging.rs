//! Structured logging to stderr via `tracing`.
//!
//! The filter comes from `GROVE_LOG` (any `EnvFilter` directive, e.g.
//! `debug` or `prompt_grove::store=trace`) and defaults to `warn` so normal
//! command output stays clean.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

pub fn init() {
    let directive = std::env::var(crate::config::LOG_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string());
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(crate::config::color_enabled())
        .with_target(false)
        .try_init();
}
