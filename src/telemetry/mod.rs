//! Telemetry events: the canonical per-printer JSON document.
//!
//! One poll of one printer produces one self-contained event. The builder
//! is a pure mapping from collected data to the event schema; the
//! serializer turns an event into its JSON octet stream.

pub mod builder;
pub mod models;
pub mod serializer;

pub use builder::TelemetryBuilder;
pub use models::{
    AgentSource, AlertInfo, AlertSeverity, MetricsInfo, PollingMetrics, PrinterInfo, SupplyInfo,
    SupplyStatus, SupplyType, Telemetry,
};
pub use serializer::{TelemetryError, serialize};
