use tracing_subscriber::{fmt, EnvFilter};

/// Installs the process-wide `tracing` subscriber: `RUST_LOG`-driven
/// filtering (default `info`) with human-readable formatting. Called
/// exactly once, at the top of `main`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}
