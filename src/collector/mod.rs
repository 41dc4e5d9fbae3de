//! Per-device data collection and counter state.
//!
//! The collector owns the ordered per-printer pipeline (identification →
//! status → network → supplies → counters → admin → trays → discovery
//! sweep → normalization) and the on-disk counter state used for delta
//! computation between polls.

pub mod collect;
pub mod data;
pub mod state;

pub use collect::{CollectorConfig, DataCollector};
pub use data::{DeviceInfo, NormalizedSupply, PrinterData, SupplyReading};
pub use state::{CountersDiff, CountersInfo, CountersSnapshot, PrinterState, StateError, StateStore};
