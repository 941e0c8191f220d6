//! Logging setup
//!
//! Hosts embedding the library may install their own subscriber; the CLI
//! calls [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a `tracing` fmt subscriber for `config`.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let level = config.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // Configure timestamps
    if config.timestamps {
        subscriber.try_init().is_ok()
    } else {
        subscriber.without_time().try_init().is_ok()
    }
}
