//! Tracing subscriber setup for binaries and benchmarks

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber.
///
/// `CLIENTPOOL_LOG` takes precedence over `RUST_LOG`; without either the
/// level is `debug` when `verbose` is set and `info` otherwise.
pub fn init_logging(verbose: bool) {
    let filter = std::env::var("CLIENTPOOL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
