//! Tracing setup: env-filter directive from config, optional JSON output.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global `tracing` subscriber from `config`.
///
/// Call once, near the top of `main`. A second call panics (tracing-subscriber
/// only allows one global default).
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
