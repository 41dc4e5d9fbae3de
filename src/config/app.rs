//! Application configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::snmp::{SnmpVersion, oids};

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default SNMP timeout (milliseconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Default concurrent connection bound.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Default queue directory.
pub const DEFAULT_QUEUE_DIR: &str = "./queue";

fn default_mode() -> String {
    "standalone".to_string()
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    161
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retries() -> u32 {
    1
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_delay_ms() -> u64 {
    50
}

fn default_suspicious_values() -> Vec<i64> {
    oids::default_suspicious_values()
}

fn default_queue_path() -> String {
    DEFAULT_QUEUE_DIR.to_string()
}

fn default_http_retries() -> u32 {
    3
}

fn default_backoff_max_seconds() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

// =============================================================================
// Sections
// =============================================================================

/// SNMP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnmpSection {
    pub community: String,
    pub version: SnmpVersion,
    pub port: u16,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for SnmpSection {
    fn default() -> Self {
        Self {
            community: default_community(),
            version: SnmpVersion::V2c,
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

impl SnmpSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Discovery scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub enabled: bool,
    pub ip_range: String,
    pub max_concurrent: usize,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            enabled: true,
            ip_range: String::new(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSection {
    pub enabled: bool,
    pub delay_ms: u64,
    /// Counter values treated as firmware sentinels rather than tallies.
    pub suspicious_values: Vec<i64>,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: default_delay_ms(),
            suspicious_values: default_suspicious_values(),
        }
    }
}

/// File queue sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkSection {
    pub enabled: bool,
    pub path: String,
}

impl Default for FileSinkSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_queue_path(),
        }
    }
}

/// HTTP upload sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSinkSection {
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    pub retries: u32,
    pub backoff_max_seconds: u64,
}

impl Default for HttpSinkSection {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            token: None,
            retries: default_http_retries(),
            backoff_max_seconds: default_backoff_max_seconds(),
        }
    }
}

/// Sink settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinksSection {
    pub file: FileSinkSection,
    pub http: HttpSinkSection,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub verbose: bool,
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            verbose: false,
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: String,
    pub snmp: SnmpSection,
    pub discovery: DiscoverySection,
    pub collector: CollectorSection,
    pub sinks: SinksSection,
    pub logging: LoggingSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            snmp: SnmpSection::default(),
            discovery: DiscoverySection::default(),
            collector: CollectorSection::default(),
            sinks: SinksSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snmp.community.is_empty() {
            return Err(ConfigError::Validation(
                "snmp community must be non-empty".to_string(),
            ));
        }
        if self.snmp.port == 0 {
            return Err(ConfigError::Validation(
                "snmp port must be non-zero".to_string(),
            ));
        }
        if self.snmp.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "snmp timeout_ms must be positive".to_string(),
            ));
        }
        if self.discovery.max_concurrent == 0 {
            return Err(ConfigError::Validation(
                "discovery max_concurrent must be positive".to_string(),
            ));
        }
        if self.sinks.file.enabled && self.sinks.file.path.is_empty() {
            return Err(ConfigError::Validation(
                "file sink path must be set when enabled".to_string(),
            ));
        }
        if self.sinks.http.enabled && self.sinks.http.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "http sink endpoint must be set when enabled".to_string(),
            ));
        }
        Ok(())
    }
}
