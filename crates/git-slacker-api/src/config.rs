//! Configuration types for the HTTP service

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log levels accepted by [`LoggingConfig::level`]
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Startup caches
    pub boot: BootConfig,

    /// Received-event persistence
    pub storage: StorageConfig,

    /// Outbound chat platform endpoints
    pub chat: ChatConfig,

    /// Attach error chains to error responses
    pub debug: bool,
}

impl ServiceConfig {
    /// Check every section for values the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.chat.validate()?;
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "server.host".to_string(),
            });
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "logging.level '{}' is not one of {}",
                    self.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Startup cache locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BootConfig {
    /// Routing table cache file; the table is derived on every start when unset
    pub handlers_cache: Option<PathBuf>,
}

/// Received-event persistence
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the webhook record log; persistence is off when unset
    pub event_directory: Option<PathBuf>,
}

/// Outbound chat platform endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the Slack Web API
    pub slack_api_url: String,

    /// Base URL of the Telegram Bot API
    pub telegram_api_url: String,

    /// Timeout for a single outbound call in seconds
    pub timeout_seconds: u64,
}

impl ChatConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("chat.slack_api_url", &self.slack_api_url),
            ("chat.telegram_api_url", &self.telegram_api_url),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::Invalid {
                message: format!("{key} '{value}' is not a valid URL: {e}"),
            })?;
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "chat.timeout_seconds must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            slack_api_url: "https://slack.com/api".to_string(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
