//! Configuration for index server clients
//!
//! Values come from defaults, then an optional JSON or TOML file, then
//! `INDEX_SERVER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{IndexServerError, IndexServerResult};

/// Config file read by [`load_client_config`] when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/index_server.json";

/// Configuration for an index server client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout for each HTTP request in seconds
    pub request_timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Retry forbidden reads through the remote script channel
    pub fallback_enabled: bool,
    /// Accept self-signed node certificates
    pub accept_invalid_certs: bool,
    /// Log level used by [`crate::logging::init_from_config`]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            user_agent: format!("index-server-sdk/{}", env!("CARGO_PKG_VERSION")),
            fallback_enabled: true,
            accept_invalid_certs: false,
            log_level: "INFO".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Load a JSON or TOML (by `.toml` extension) file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> IndexServerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndexServerError::configuration_error(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_toml = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
        let mut config: ClientConfig = if is_toml {
            toml::from_str(&content).map_err(|e| {
                IndexServerError::configuration_error(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                IndexServerError::configuration_error(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    e
                ))
            })?
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(timeout) = env::var("INDEX_SERVER_TIMEOUT_SECONDS") {
            self.request_timeout_secs = timeout.parse().unwrap_or(self.request_timeout_secs);
        }
        if let Ok(user_agent) = env::var("INDEX_SERVER_USER_AGENT") {
            self.user_agent = user_agent;
        }
        if let Ok(enabled) = env::var("INDEX_SERVER_FALLBACK_ENABLED") {
            self.fallback_enabled = enabled.parse().unwrap_or(self.fallback_enabled);
        }
        if let Ok(accept) = env::var("INDEX_SERVER_ACCEPT_INVALID_CERTS") {
            self.accept_invalid_certs = accept.parse().unwrap_or(self.accept_invalid_certs);
        }
        if let Ok(level) = env::var("INDEX_SERVER_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> IndexServerResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(IndexServerError::configuration_error(
                "request_timeout_secs must be greater than 0",
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(IndexServerError::configuration_error(
                "user_agent must not be empty",
            ));
        }

        if crate::logging::parse_level(&self.log_level).is_none() {
            return Err(IndexServerError::configuration_error(format!(
                "Invalid log level: {}",
                self.log_level
            )));
        }

        Ok(())
    }
}

/// Load client configuration from `path`, or the `INDEX_SERVER_CONFIG`
/// environment variable, or [`DEFAULT_CONFIG_PATH`].
///
/// A missing file yields the defaults with environment overrides; a file
/// that exists but does not parse is an error.
pub fn load_client_config(path: Option<&str>) -> IndexServerResult<ClientConfig> {
    let config_path = path
        .map(|p| p.to_string())
        .or_else(|| env::var("INDEX_SERVER_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    if Path::new(&config_path).exists() {
        ClientConfig::from_file(&config_path).map_err(|e| {
            log::error!("Failed to load client configuration: {}", e);
            e
        })
    } else {
        let config = ClientConfig::from_env();
        config.validate()?;
        Ok(config)
    }
}
