//! Logging setup and configuration

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a stderr subscriber for the application
///
/// `RUST_LOG` takes precedence over `default_level` when set. Output goes to
/// stderr so command output on stdout stays machine-readable.
pub fn setup_logging(default_level: &str) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| parse_filter(default_level))?;
    let directives = filter.to_string();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| crate::Error::Logging(format!("Logging already initialized: {}", e)))?;

    debug!("Logging initialized with filter '{}'", directives);
    Ok(())
}

/// Parse a level or `RUST_LOG`-style directive list
pub fn parse_filter(directives: &str) -> crate::Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| crate::Error::Logging(format!("Invalid log filter '{}': {}", directives, e)))
}
