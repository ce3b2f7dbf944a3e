//! Diagnostic tracing.
//!
//! Tracing output is for debugging devmate itself and goes to stderr. What
//! the user sees in a session goes through `ui::RenderSink` instead.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter variable checked first.
pub const ENV_LOG: &str = "DEVMATE_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Initialize the global subscriber.
///
/// Reads `DEVMATE_LOG`, then `RUST_LOG`, and defaults to `warn`. Safe to call
/// more than once; later calls are ignored.
///
/// ```bash
/// DEVMATE_LOG=devmate=debug devmate
/// ```
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(filter_from(|key| std::env::var(key).ok()))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

fn filter_from(env_lookup: impl Fn(&str) -> Option<String>) -> EnvFilter {
    [ENV_LOG, EnvFilter::DEFAULT_ENV]
        .into_iter()
        .filter_map(|key| env_lookup(key))
        .filter(|spec| !spec.trim().is_empty())
        .find_map(|spec| EnvFilter::try_new(spec.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
