//! CLI command implementations.

pub mod info;
pub mod simulate;
pub mod start;
pub mod version;

/// Initializes logging once, with `RUST_LOG` taking precedence over the
/// supplied default filter.
pub(crate) fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
