// src/logging.rs
// =============================================================================
// Logging setup.
//
// The crawler reports what each task does through `tracing` (claimed,
// fetching, saved, abandoned). This installs a subscriber that prints those
// events to stderr, so stdout stays clean for the report (and --json).
//
// RUST_LOG overrides the default filter, e.g. RUST_LOG=site_mirror=trace
// =============================================================================

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, early in main.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "site_mirror=debug"
    } else {
        "site_mirror=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
