use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global `tracing` subscriber. Logs go to stderr so stdout
/// carries only progress and the report.
///
/// The filter comes from `STRESSTEST_LOG`, then `RUST_LOG`, falling back to
/// `info` (or `debug` when `verbose` is set).
///
/// Returns `false` without touching the existing setup when a subscriber is
/// already installed.
pub fn init_logging(verbose: bool) -> bool {
    let filter = std::env::var("STRESSTEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| default_filter(verbose),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| default_filter(verbose)),
        );

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}
