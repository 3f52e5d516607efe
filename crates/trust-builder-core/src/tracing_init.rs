//! Shared tracing/logging initialization.
//!
//! Logs go to stderr so stdout carries only the operator guidance printed
//! after a successful run.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown at the requested level.
pub const LOG_TARGETS: &[&str] = &["trust_builder", "trust_builder_core"];

/// Build an env-filter directive applying `level` to each of `targets`,
/// e.g. `"trust_builder=debug,trust_builder_core=debug"`.
pub fn filter_directive(targets: &[&str], level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    targets
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG`, when set, overrides `level` entirely. With `log_json`, emit
/// structured JSON lines instead of the human-readable format.
pub fn init_tracing(level: &str, log_json: bool) {
    let directive = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| filter_directive(LOG_TARGETS, level));
    let env_filter = tracing_subscriber::EnvFilter::new(directive);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt)
            .init();
    }
}
