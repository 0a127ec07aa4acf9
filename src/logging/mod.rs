//! # Logging
//!
//! The SDK logs through the `log` facade under per-feature targets (see
//! [`features::LogFeature`]). Applications that do not install their own
//! logger can call [`init_with_level`] or [`init_from_config`] to get an
//! `env_logger` backend.

pub mod features;

use once_cell::sync::OnceCell;

use crate::config::ClientConfig;

static LOGGER_INSTALLED: OnceCell<()> = OnceCell::new();

/// Parse an upper- or lower-case level name
pub fn parse_level(level: &str) -> Option<log::LevelFilter> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(log::LevelFilter::Trace),
        "DEBUG" => Some(log::LevelFilter::Debug),
        "INFO" => Some(log::LevelFilter::Info),
        "WARN" => Some(log::LevelFilter::Warn),
        "ERROR" => Some(log::LevelFilter::Error),
        "OFF" => Some(log::LevelFilter::Off),
        _ => None,
    }
}

/// Install an `env_logger` backend at `level`. `RUST_LOG` still refines
/// per-target levels. Calling it again is a no-op.
pub fn init_with_level(level: &str) -> Result<(), LoggingError> {
    let filter = parse_level(level).ok_or_else(|| LoggingError::InvalidLevel(level.to_string()))?;

    let mut result = Ok(());
    LOGGER_INSTALLED.get_or_init(|| {
        result = env_logger::Builder::new()
            .filter_level(filter)
            .parse_default_env()
            .try_init()
            .map_err(LoggingError::from);
    });
    result
}

/// Install the logger at the level named in the client configuration
pub fn init_from_config(config: &ClientConfig) -> Result<(), LoggingError> {
    init_with_level(&config.log_level)
}

/// Logging setup errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    #[error("Another logger is already installed: {0}")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_invalid_level_rejected_before_install() {
        assert!(matches!(
            init_with_level("chatty"),
            Err(LoggingError::InvalidLevel(_))
        ));
    }
}
