//! Configuration module for the agent.
//!
//! Provides YAML-based configuration loading and validation for:
//! - SNMP settings (community, version, port, timeout, retries)
//! - Discovery settings (range, concurrency)
//! - Collector settings (delays, suspicious counter sentinels)
//! - Sink settings (file queue, HTTP upload)

mod app;
mod validation;

pub use app::{
    AppConfig, CollectorSection, DiscoverySection, FileSinkSection, HttpSinkSection,
    LoggingSection, SinksSection, SnmpSection,
};
pub use validation::ConfigError;
