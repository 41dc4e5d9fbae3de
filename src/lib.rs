//! Printmon - Printer Fleet Telemetry Library
//!
//! This crate provides the core functionality for the printmon telemetry
//! agent. It can be used as a library by other Rust projects, or run as a
//! standalone binary with the `printmon` executable.
//!
//! # Architecture
//!
//! - **Scanner**: IP range expansion, parallel SNMP discovery, brand
//!   detection from system descriptors
//! - **Profile**: per-printer OID knowledge, discovered once and cached
//!   as JSON files to accelerate later polls
//! - **Collector**: per-device SNMP interrogation and normalization into
//!   one canonical device model, plus counter state with delta and reset
//!   detection
//! - **Telemetry**: one self-contained JSON event per printer per poll
//! - **Sinks**: local queue directory and HTTP upload with retry
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use printmon::collector::{CountersInfo, StateStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StateStore::new("./state")?;
//!
//!     let current = CountersInfo {
//!         total_pages: 12345,
//!         ..CountersInfo::default()
//!     };
//!     let (delta, reset) = store.calculate_delta("10.0.0.5", &current);
//!     println!("delta: {delta:?}, reset: {reset}");
//!
//!     store.save("10.0.0.5", current)?;
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod profile;
pub mod report;
pub mod scanner;
pub mod sink;
pub mod snmp;
pub mod telemetry;

// Re-export the primary types.
pub use collector::{CountersSnapshot, DataCollector, DeviceInfo, PrinterData, StateStore};
pub use config::{AppConfig, ConfigError};
pub use profile::{Profile, ProfileStore};
pub use report::ScanSummary;
pub use scanner::{Brand, DiscoveryResult, DiscoveryScanner};
pub use sink::{FileSink, HttpSink, Sink, SinkError};
pub use snmp::{SnmpError, SnmpSession, SnmpVersion};
pub use telemetry::{Telemetry, TelemetryBuilder};
