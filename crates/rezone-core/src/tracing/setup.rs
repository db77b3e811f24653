use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::errors::ConfigError;

/// Install a global fmt subscriber filtered by `config`.
///
/// Safe to call more than once; only the first successful call installs
/// a subscriber, later calls leave the existing one in place.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_filter(config)?;
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        ::tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if config.use_env {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(config.level.trim()).map_err(|e| ConfigError::Invalid {
        field: "logging.level",
        reason: e.to_string(),
    })
}

/// Route `debug` output into the test harness's captured writer.
pub fn init_for_tests() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}
