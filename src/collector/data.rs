//! Collected per-device data, prior to event building.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scanner::Brand;
use crate::snmp::SnmpVersion;

/// A device handed to the collector after discovery and brand detection.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub ip: String,
    pub brand: Brand,
    pub brand_confidence: f64,
    pub sys_descr: String,
    pub community: String,
    pub snmp_version: SnmpVersion,
}

/// One structured consumable read from the marker supplies table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplyReading {
    pub description: String,
    pub level: Option<i64>,
    pub max: Option<i64>,
    pub type_code: Option<String>,
    pub part: Option<String>,
    pub state: Option<String>,
}

/// A supply after percentage computation and status banding.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSupply {
    pub description: String,
    pub level: f64,
    pub max: f64,
    pub percentage: f64,
    pub status: String,
}

/// Everything collected from one printer in one poll.
///
/// Buckets hold primitive scalars keyed by field name or flattened OID;
/// `supplies` holds the structured marker-table readings. Counter values
/// are filtered at ingestion: zero, negative, and > 3×10⁹ never enter.
#[derive(Debug, Clone)]
pub struct PrinterData {
    pub ip: String,
    pub brand: Brand,
    pub brand_confidence: f64,

    pub identification: BTreeMap<String, String>,
    pub status: BTreeMap<String, String>,
    pub supplies: BTreeMap<String, SupplyReading>,
    /// Raw supply-tree leaves from the discovery sweep, keyed
    /// `{prefix}_{flattened_oid}`.
    pub supplies_raw: BTreeMap<String, String>,
    pub counters: BTreeMap<String, i64>,
    pub trays: BTreeMap<String, String>,
    pub network_info: BTreeMap<String, String>,
    pub admin_info: BTreeMap<String, String>,

    pub normalized_supplies: BTreeMap<String, NormalizedSupply>,
    pub normalized_counters: BTreeMap<String, i64>,

    pub errors: Vec<String>,
    pub missing_sections: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub response_time: Duration,
    pub probe_attempts: u32,
}

impl PrinterData {
    pub fn new(device: &DeviceInfo) -> Self {
        Self {
            ip: device.ip.clone(),
            brand: device.brand,
            brand_confidence: device.brand_confidence,
            identification: BTreeMap::new(),
            status: BTreeMap::new(),
            supplies: BTreeMap::new(),
            supplies_raw: BTreeMap::new(),
            counters: BTreeMap::new(),
            trays: BTreeMap::new(),
            network_info: BTreeMap::new(),
            admin_info: BTreeMap::new(),
            normalized_supplies: BTreeMap::new(),
            normalized_counters: BTreeMap::new(),
            errors: Vec::new(),
            missing_sections: Vec::new(),
            timestamp: Utc::now(),
            response_time: Duration::ZERO,
            probe_attempts: 1,
        }
    }

    /// True when any bucket already carries this key. Used by the
    /// discovery sweep to avoid shadowing firsthand data.
    pub fn has_key(&self, key: &str) -> bool {
        self.identification.contains_key(key)
            || self.status.contains_key(key)
            || self.counters.contains_key(key)
            || self.supplies.contains_key(key)
            || self.supplies_raw.contains_key(key)
            || self.trays.contains_key(key)
            || self.network_info.contains_key(key)
    }
}
