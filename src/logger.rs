use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. `SWARMLOAD_LOG` and `RUST_LOG` take
/// precedence over `--log-level`, which takes precedence over `--verbose`.
pub fn init_logging(verbose: bool, no_color: bool, log_level: Option<&str>) {
    let fallback = || {
        log_level.map_or_else(
            || EnvFilter::new(if verbose { "debug" } else { "info" }),
            |level| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
    };
    let filter = std::env::var("SWARMLOAD_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| fallback(),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| fallback()),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
