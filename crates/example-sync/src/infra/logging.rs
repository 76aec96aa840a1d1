//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "EXAMPLE_SYNC_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Install a stderr `fmt` subscriber filtered by `EXAMPLE_SYNC_LOG`.
///
/// Standard output is reserved for the usage and confirmation lines.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
