//! The telemetry event schema, version 1.0.0.
//!
//! Field names and shapes are frozen: downstream consumers parse these
//! documents from the queue directory and the upload endpoint. Optional
//! collections serialize as `null`, never as empty arrays; optional
//! strings as `null`, never as `""`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collector::CountersSnapshot;
use crate::scanner::Brand;

/// Frozen schema version stamped on every event.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// One poll of one printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    pub schema_version: String,
    pub event_id: String,
    pub collected_at: DateTime<Utc>,
    pub source: AgentSource,
    pub printer: PrinterInfo,

    pub counters: Option<CountersSnapshot>,
    pub supplies: Option<Vec<SupplyInfo>>,
    pub alerts: Option<Vec<AlertInfo>>,

    pub metrics: MetricsInfo,
}

/// Who sent the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSource {
    pub agent_id: String,
    pub hostname: String,
    pub os: String,
    pub version: String,
}

/// Device identity. `id` is deterministic: MAC with separators stripped
/// and lower-cased when present, else the trimmed lower-cased serial,
/// else the IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub id: String,
    pub ip: String,
    pub brand: Brand,
    pub brand_confidence: f64,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
}

/// Consumable classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyType {
    Toner,
    Drum,
    Fuser,
    Waste,
    Roller,
    Transfer,
    Pickup,
    Cartridge,
    Consumable,
}

impl SupplyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toner => "toner",
            Self::Drum => "drum",
            Self::Fuser => "fuser",
            Self::Waste => "waste",
            Self::Roller => "roller",
            Self::Transfer => "transfer",
            Self::Pickup => "pickup",
            Self::Cartridge => "cartridge",
            Self::Consumable => "consumable",
        }
    }
}

/// Remaining-level band for a supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyStatus {
    Critical,
    Low,
    Ok,
    Good,
}

impl SupplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Ok => "ok",
            Self::Good => "good",
        }
    }
}

/// One consumable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub supply_type: SupplyType,
    pub level: i64,
    pub max_level: i64,
    /// Remaining percentage, clamped to 0–100.
    pub percentage: i64,
    pub status: SupplyStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

/// Alert urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// One active alert, derived from supply levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub detected_at: DateTime<Utc>,
}

/// Poll metrics wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsInfo {
    pub polling: PollingMetrics,
}

/// How the snapshot was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingMetrics {
    pub response_time_ms: i64,
    pub poll_duration_ms: i64,
    pub oid_success_rate: f64,
    pub retry_count: u32,
    pub last_poll_at: DateTime<Utc>,
    pub next_poll_at: DateTime<Utc>,
    pub error_count: usize,
}
