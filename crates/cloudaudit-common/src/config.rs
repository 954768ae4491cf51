//! Configuration management for CloudAudit components

use cloudaudit_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Report store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Merge with environment variables (CLOUDAUDIT_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("CLOUDAUDIT_STORE_URI") {
            self.store.uri = Some(val);
        }
        if let Ok(val) = std::env::var("CLOUDAUDIT_CHECK_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                self.engine.check_timeout_seconds = n;
            }
        }
        if let Ok(val) = std::env::var("CLOUDAUDIT_MAX_CONCURRENT_CHECKS") {
            if let Ok(n) = val.parse() {
                self.engine.max_concurrent_checks = n;
            }
        }
        if let Ok(val) = std::env::var("CLOUDAUDIT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("CLOUDAUDIT_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// The store URI, required for any persisting deployment
    pub fn store_uri(&self) -> Result<&str> {
        self.store.uri.as_deref().ok_or(Error::MissingConfig {
            key: String::from("store.uri"),
        })
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-check timeout in seconds
    #[serde(default = "default_check_timeout")]
    pub check_timeout_seconds: u64,

    /// Upper bound on checks running concurrently within one scan
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_checks: usize,
}

fn default_check_timeout() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_timeout_seconds: 10,
            max_concurrent_checks: 8,
        }
    }
}

/// Report store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URI of the report store; absent means in-memory only
    pub uri: Option<String>,

    /// Collection/table receiving scan reports
    #[serde(default = "default_reports_collection")]
    pub reports_collection: String,
}

fn default_reports_collection() -> String {
    String::from("scan_reports")
}

// The serde default attribute only applies while a [store] table is being
// deserialized; a config with no [store] table at all goes through this
// impl, which must agree with it.
impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: None,
            reports_collection: default_reports_collection(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [engine]
            check_timeout_seconds = 5
            max_concurrent_checks = 4

            [store]
            uri = "mongodb://reports.internal:27017"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.engine.check_timeout_seconds, 5);
        assert_eq!(config.engine.max_concurrent_checks, 4);
        assert_eq!(config.store_uri().unwrap(), "mongodb://reports.internal:27017");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.engine.check_timeout_seconds, 10);
        assert_eq!(config.store.reports_collection, "scan_reports");
        assert!(config.store_uri().is_err());
    }

    #[test]
    fn test_struct_defaults_match_serde_defaults() {
        // Config::default() and an empty TOML document take different
        // code paths; both must land on the same values.
        let from_toml = Config::from_toml("").unwrap();
        let from_default = Config::default();
        assert_eq!(
            from_default.store.reports_collection,
            from_toml.store.reports_collection
        );
        assert_eq!(
            from_default.engine.check_timeout_seconds,
            from_toml.engine.check_timeout_seconds
        );
        assert_eq!(
            from_default.logging.level,
            from_toml.logging.level
        );
    }
}
