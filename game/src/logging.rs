use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Without `debug` the level is pinned to `info`. With it, `RUST_LOG` may override the default
/// `debug` filter (use `flowgrid=trace` to see per-step engine timings).
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
