//! Process-wide log/trace subscriber setup.
//!
//! `log` records are bridged into `tracing` so both the `log::` macros and
//! `tracing` spans end up in the same output.

use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_filter(&config.level)?;

    let fmt_layer = if config.json {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let subscriber = Registry::default().with(fmt_layer).with(filter);

    LogTracer::init().map_err(|e| ConfigError::Logging(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    log::debug!("Logging initialized (level = {})", config.level);
    Ok(())
}

/// `RUST_LOG` overrides the configured level when set.
fn build_filter(level: &str) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| ConfigError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // The first call may already fail if another test installed a
        // subscriber; the second must fail either way.
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(ConfigError::Logging(_))
        ));
    }

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_err() {
            assert!(build_filter("ratecard=loud").is_err());
        }
    }
}
