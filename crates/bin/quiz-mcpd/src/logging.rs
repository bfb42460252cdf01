use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Output goes to stderr; stdout carries the stdio transport.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
