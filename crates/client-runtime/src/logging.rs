//! Tracing subscriber setup. Logs go to stderr; stdout carries command output.

use crate::config::LogConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("Cannot install log subscriber: {0}")]
    Install(String),
}

/// Filter from `RUST_LOG` when set, else from the configured level (which
/// `OEM_LOG_LEVEL` already overrode).
pub fn filter(config: &LogConfig, rust_log: Option<String>) -> Result<EnvFilter, LoggingError> {
    let directive = rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.level.clone());
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
        directive,
        reason: e.to_string(),
    })
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = filter(config, std::env::var("RUST_LOG").ok())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins_over_level() {
        let config = LogConfig::default();
        let filter = filter(&config, Some("fc_02_submission=trace".into())).unwrap();
        assert!(filter.to_string().contains("fc_02_submission=trace"));
    }

    #[test]
    fn test_blank_rust_log_falls_back() {
        let config = LogConfig {
            level: "debug".into(),
            json: false,
        };
        assert_eq!(filter(&config, Some("  ".into())).unwrap().to_string(), "debug");
    }

    #[test]
    fn test_bad_directive_rejected() {
        let config = LogConfig {
            level: "fc_02=loud".into(),
            json: false,
        };
        assert!(matches!(filter(&config, None), Err(LoggingError::Filter { .. })));
    }
}
