//! Persistent profile records.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scanner::Brand;

/// Classification buckets for discovered OIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OidCategory {
    Supplies,
    Counters,
    Status,
    Network,
    System,
    Vendor,
}

impl OidCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplies => "supplies",
            Self::Counters => "counters",
            Self::Status => "status",
            Self::Network => "network",
            Self::System => "system",
            Self::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for OidCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-OID metadata captured at discovery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidMetadata {
    pub oid: String,
    pub category: OidCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub data_type: String,
    /// Passed the multi-poll variance test.
    #[serde(default)]
    pub consistent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_value: Option<f64>,
}

/// Capability flags deduced from which categories answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub duplex: bool,
    pub color: bool,
    pub scanner: bool,
    pub fax: bool,
    pub supplies: bool,
    pub counters: bool,
    pub network: bool,
    pub status: bool,
}

/// Everything the agent knows about one printer. One printer, one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub printer_id: String,
    pub ip: String,
    pub brand: Brand,
    pub model: String,

    /// Discovered OIDs grouped by category name.
    #[serde(default)]
    pub oids: HashMap<String, Vec<String>>,

    /// OID → semantic counter name (`total_pages`, `mono_pages`, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub counter_mappings: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub oid_metadata: HashMap<String, OidMetadata>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub oid_friendly_names: HashMap<String, String>,

    #[serde(default)]
    pub capabilities: Capabilities,

    pub discovered_at: DateTime<Utc>,
    pub last_validated_at: DateTime<Utc>,
    #[serde(default)]
    pub firmware_version: String,
    pub snmp_version: String,

    pub discovery_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default)]
    pub error_count: u32,
    /// Rolling validation success rate, 0.0–1.0.
    pub success_rate: f64,
}

impl Profile {
    /// OIDs discovered under one category, empty when none.
    pub fn oids_in(&self, category: OidCategory) -> &[String] {
        self.oids
            .get(category.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&OidCategory::Supplies).unwrap(),
            "\"supplies\""
        );
        let back: OidCategory = serde_json::from_str("\"vendor\"").unwrap();
        assert_eq!(back, OidCategory::Vendor);
    }

    #[test]
    fn test_oids_in_missing_category_is_empty() {
        let profile = Profile {
            printer_id: "10.0.0.5".to_string(),
            ip: "10.0.0.5".to_string(),
            brand: Brand::Hp,
            model: String::new(),
            oids: HashMap::new(),
            counter_mappings: HashMap::new(),
            oid_metadata: HashMap::new(),
            oid_friendly_names: HashMap::new(),
            capabilities: Capabilities::default(),
            discovered_at: Utc::now(),
            last_validated_at: Utc::now(),
            firmware_version: String::new(),
            snmp_version: "2c".to_string(),
            discovery_attempts: 1,
            last_error: None,
            error_count: 0,
            success_rate: 1.0,
        };
        assert!(profile.oids_in(OidCategory::Counters).is_empty());
    }
}
