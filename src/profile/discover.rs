//! Strategic-walk discovery: build a profile for an unknown printer.
//!
//! Walks a fixed set of standard and vendor sub-trees, filters out useless
//! leaves, classifies the remainder by OID prefix, enriches each with
//! metadata and a friendly name, and derives counter mappings and
//! capability flags.

use std::collections::HashMap;

use chrono::Utc;

use crate::scanner::Brand;
use crate::snmp::{SnmpSession, WalkItem, normalize_oid, oids};

use super::consistency::ConsistencyChecker;
use super::names::FriendlyNameResolver;
use super::types::{Capabilities, OidCategory, OidMetadata, Profile};

/// Bound on vendor OIDs probed for consistency per discovery; each probe
/// costs several round-trips.
const MAX_CONSISTENCY_PROBES: usize = 8;

/// Builds profiles by walking a device's MIB strategically.
#[derive(Debug)]
pub struct Discoverer<'a> {
    session: &'a SnmpSession,
}

impl<'a> Discoverer<'a> {
    pub fn new(session: &'a SnmpSession) -> Self {
        Self { session }
    }

    /// Walk, classify, and enrich. Trees that fail to walk are skipped;
    /// a printer that answers nothing still gets an (empty) profile.
    pub async fn discover(
        &self,
        printer_id: &str,
        ip: &str,
        brand: Brand,
        model: &str,
        snmp_version: &str,
    ) -> Profile {
        let now = Utc::now();
        let mut profile = Profile {
            printer_id: printer_id.to_string(),
            ip: ip.to_string(),
            brand,
            model: model.to_string(),
            oids: HashMap::new(),
            counter_mappings: HashMap::new(),
            oid_metadata: HashMap::new(),
            oid_friendly_names: HashMap::new(),
            capabilities: Capabilities::default(),
            discovered_at: now,
            last_validated_at: now,
            firmware_version: String::new(),
            snmp_version: snmp_version.to_string(),
            discovery_attempts: 1,
            last_error: None,
            error_count: 0,
            success_rate: 1.0,
        };

        let walk_results = self.walk_strategic().await;
        classify_results(&mut profile, &walk_results);
        enrich_profile(&mut profile);
        self.refine_vendor_oids(&mut profile).await;
        profile.counter_mappings = counter_mappings(profile.oids_in(OidCategory::Counters));
        detect_capabilities(&mut profile);

        tracing::debug!(
            printer_id,
            supplies = profile.oids_in(OidCategory::Supplies).len(),
            counters = profile.oids_in(OidCategory::Counters).len(),
            status = profile.oids_in(OidCategory::Status).len(),
            network = profile.oids_in(OidCategory::Network).len(),
            "discovery complete"
        );

        profile
    }

    /// Probe a bounded sample of unclassified vendor OIDs a few times
    /// each to tell counters (monotone) from supply gauges (0–100) from
    /// noise. Reclassified OIDs move between category lists.
    async fn refine_vendor_oids(&self, profile: &mut Profile) {
        let candidates: Vec<String> = profile
            .oids_in(OidCategory::Vendor)
            .iter()
            .take(MAX_CONSISTENCY_PROBES)
            .cloned()
            .collect();
        if candidates.is_empty() {
            return;
        }

        let checker = ConsistencyChecker::new(self.session);
        for oid in candidates {
            let Ok(report) = checker.check(&oid).await else {
                continue;
            };

            let reclassified = if checker.is_counter_oid(&oid).await {
                Some(OidCategory::Counters)
            } else if checker.is_supply_oid(&oid).await {
                Some(OidCategory::Supplies)
            } else {
                None
            };

            if let Some(metadata) = profile.oid_metadata.get_mut(&oid) {
                metadata.consistent = report.consistent;
                metadata.mean_value = Some(report.mean);

                if let Some(category) = reclassified {
                    metadata.category = category;
                    metadata.data_type = "integer".to_string();
                    metadata.min_value = Some(0);
                    match category {
                        OidCategory::Supplies => {
                            metadata.max_value = Some(100);
                            metadata.unit = Some("%".to_string());
                        }
                        _ => {
                            metadata.unit = Some("pages".to_string());
                        }
                    }
                }
            }

            if let Some(category) = reclassified {
                move_oid(profile, &oid, OidCategory::Vendor, category);
            }
        }
    }

    async fn walk_strategic(&self) -> Vec<WalkItem> {
        let mut all = Vec::new();
        for (name, tree) in oids::STRATEGIC_WALK_TREES {
            match self.session.walk(tree).await {
                Ok(items) => all.extend(items),
                Err(e) => {
                    tracing::debug!(tree = name, error = %e, "strategic walk tree skipped");
                }
            }
        }
        all
    }
}

fn classify_results(profile: &mut Profile, results: &[WalkItem]) {
    let mut by_category: HashMap<OidCategory, Vec<String>> = HashMap::new();

    for item in results {
        if !is_useful_value(&item.value) {
            continue;
        }

        let category = classify_oid(&item.oid);
        let bucket = by_category.entry(category).or_default();
        if !bucket.iter().any(|o| o == &item.oid) {
            bucket.push(item.oid.clone());
        }
    }

    for (category, oid_list) in by_category {
        if !oid_list.is_empty() {
            profile.oids.insert(category.as_str().to_string(), oid_list);
        }
    }
}

/// Reject values that carry no information: empties, placeholder strings,
/// and the -1/-2 "not applicable" sentinels.
pub fn is_useful_value(value: &str) -> bool {
    !matches!(value, "" | "unknown" | "null" | "nil" | "-1" | "-2")
}

/// Classify an OID into a category by prefix pattern.
pub fn classify_oid(oid: &str) -> OidCategory {
    let oid = normalize_oid(oid);

    const SUPPLIES: &[&str] = &[
        ".43.11",
        ".11.2.3.9.4.3",
        ".253.8.53.13",
        ".236.11.5.11",
        ".367.3.2",
    ];
    const COUNTERS: &[&str] = &[
        ".43.10",
        ".43.4",
        ".11.2.3.9.4.2",
        ".253.8.53.3",
        ".236.11.5.1",
    ];
    const STATUS: &[&str] = &[".25.3.2.1.5", ".43.13", ".43.5", ".11.2.3.9.4.2.1.5"];
    const NETWORK: &[&str] = &[".2.1.4", ".2.1.6", ".2.1.2"];
    const SYSTEM: &[&str] = &[".2.1.1", ".1.3.0", ".1.6.0", ".1.4.0"];

    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| oid.contains(p));

    if contains_any(SUPPLIES) {
        OidCategory::Supplies
    } else if contains_any(COUNTERS) {
        OidCategory::Counters
    } else if contains_any(STATUS) {
        OidCategory::Status
    } else if contains_any(NETWORK) {
        OidCategory::Network
    } else if contains_any(SYSTEM) {
        OidCategory::System
    } else {
        OidCategory::Vendor
    }
}

fn enrich_profile(profile: &mut Profile) {
    let resolver = FriendlyNameResolver::new();

    let all_oids: Vec<String> = profile.oids.values().flatten().cloned().collect();
    for oid in all_oids {
        let friendly = resolver.friendly_name(&oid);
        let object_type = resolver.detect_type(&friendly);
        let unit = resolver.unit(&friendly);

        let mut metadata = OidMetadata {
            oid: oid.clone(),
            category: classify_oid(&oid),
            min_value: None,
            max_value: None,
            unit: (!unit.is_empty()).then(|| unit.to_string()),
            data_type: "string".to_string(),
            consistent: false,
            mean_value: None,
        };

        match object_type {
            "supplies" => {
                metadata.min_value = Some(0);
                metadata.max_value = Some(100);
                metadata.unit = Some("%".to_string());
                metadata.data_type = "integer".to_string();
            }
            "counter" => {
                metadata.min_value = Some(0);
                metadata.data_type = "integer".to_string();
            }
            _ => {}
        }

        profile.oid_friendly_names.insert(oid.clone(), friendly);
        profile.oid_metadata.insert(oid, metadata);
    }
}

/// Map discovered counter OIDs onto the canonical per-function names.
fn counter_mappings(counter_oids: &[String]) -> HashMap<String, String> {
    let mut mappings = HashMap::new();

    for oid in counter_oids {
        let normalized = normalize_oid(oid);
        if let Some((_, name)) = oids::RFC3805_COUNTER_MAP
            .iter()
            .find(|(leaf, _)| *leaf == normalized)
        {
            mappings.insert(normalized, (*name).to_string());
        }
    }

    mappings
}

fn move_oid(profile: &mut Profile, oid: &str, from: OidCategory, to: OidCategory) {
    if let Some(list) = profile.oids.get_mut(from.as_str()) {
        list.retain(|o| o != oid);
    }
    let target = profile.oids.entry(to.as_str().to_string()).or_default();
    if !target.iter().any(|o| o == oid) {
        target.push(oid.to_string());
    }
}

fn detect_capabilities(profile: &mut Profile) {
    profile.capabilities.supplies = !profile.oids_in(OidCategory::Supplies).is_empty();
    profile.capabilities.counters = !profile.oids_in(OidCategory::Counters).is_empty();
    profile.capabilities.status = !profile.oids_in(OidCategory::Status).is_empty();
    profile.capabilities.network = !profile.oids_in(OidCategory::Network).is_empty();
    // Refined later from supplies and counters; optimistic by default.
    profile.capabilities.color = true;
    profile.capabilities.duplex = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_supplies() {
        assert_eq!(
            classify_oid("1.3.6.1.2.1.43.11.1.1.6.1.1"),
            OidCategory::Supplies
        );
        assert_eq!(
            classify_oid("1.3.6.1.4.1.253.8.53.13.2.1.2.1.20.1"),
            OidCategory::Supplies
        );
    }

    #[test]
    fn test_classify_counters() {
        assert_eq!(
            classify_oid("1.3.6.1.2.1.43.10.2.1.4.1.1"),
            OidCategory::Counters
        );
        assert_eq!(
            classify_oid(".1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.1"),
            OidCategory::Counters
        );
    }

    #[test]
    fn test_classify_status_and_network() {
        assert_eq!(
            classify_oid("1.3.6.1.2.1.25.3.2.1.5.1"),
            OidCategory::Status
        );
        assert_eq!(classify_oid("1.3.6.1.2.1.2.2.1.6.1"), OidCategory::Network);
    }

    #[test]
    fn test_classify_vendor_fallback() {
        assert_eq!(
            classify_oid("1.3.6.1.4.1.2435.2.3.9.4.2.1.5.5.8.0"),
            OidCategory::Vendor
        );
    }

    #[test]
    fn test_useful_value_filter() {
        assert!(is_useful_value("12345"));
        assert!(is_useful_value("Black Toner"));
        assert!(!is_useful_value(""));
        assert!(!is_useful_value("unknown"));
        assert!(!is_useful_value("null"));
        assert!(!is_useful_value("nil"));
        assert!(!is_useful_value("-1"));
        assert!(!is_useful_value("-2"));
    }

    #[test]
    fn test_move_oid_between_categories() {
        let mut profile = Profile {
            printer_id: "p".to_string(),
            ip: "10.0.0.5".to_string(),
            brand: Brand::Generic,
            model: String::new(),
            oids: HashMap::from([(
                "vendor".to_string(),
                vec!["1.3.6.1.4.1.999.1.1".to_string()],
            )]),
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

        move_oid(
            &mut profile,
            "1.3.6.1.4.1.999.1.1",
            OidCategory::Vendor,
            OidCategory::Counters,
        );

        assert!(profile.oids_in(OidCategory::Vendor).is_empty());
        assert_eq!(
            profile.oids_in(OidCategory::Counters),
            &["1.3.6.1.4.1.999.1.1".to_string()]
        );
    }

    #[test]
    fn test_counter_mappings_standard_leaves() {
        let discovered = vec![
            "1.3.6.1.2.1.43.10.2.1.4.1.1".to_string(),
            "1.3.6.1.2.1.43.10.2.1.4.1.3".to_string(),
            "1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.1".to_string(),
        ];
        let mappings = counter_mappings(&discovered);
        assert_eq!(
            mappings.get("1.3.6.1.2.1.43.10.2.1.4.1.1").map(String::as_str),
            Some("total_pages")
        );
        assert_eq!(
            mappings.get("1.3.6.1.2.1.43.10.2.1.4.1.3").map(String::as_str),
            Some("color_pages")
        );
        assert!(!mappings.contains_key("1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.1"));
    }
}
