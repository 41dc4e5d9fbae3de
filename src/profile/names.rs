//! Friendly names, types, and units for discovered OIDs.

use std::collections::HashMap;

/// Resolves OIDs to human-readable names and infers value types/units
/// from those names. Known OIDs hit a fixed table; the rest fall back to
/// pattern rules over the OID itself.
#[derive(Debug, Clone)]
pub struct FriendlyNameResolver {
    known: HashMap<&'static str, &'static str>,
}

impl Default for FriendlyNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FriendlyNameResolver {
    pub fn new() -> Self {
        Self {
            known: known_oids(),
        }
    }

    pub fn friendly_name(&self, oid: &str) -> String {
        if let Some(name) = self.known.get(oid) {
            return (*name).to_string();
        }
        generate_name(oid)
    }

    /// Coarse value type inferred from the friendly name: `counter`,
    /// `supplies`, `status`, `network`, `system`, or `vendor`.
    pub fn detect_type(&self, friendly_name: &str) -> &'static str {
        let name = friendly_name.to_uppercase();
        let has = |needle: &str| name.contains(needle);

        if has("PAGE") || has("COUNT") || has("IMPRESSION") || has("SCAN") || has("COPY")
            || has("FAX")
        {
            return "counter";
        }
        if has("TONER") || has("SUPPLY") || has("DRUM") || has("FUSER") || has("ROLLER")
            || has("PAD")
            || has("INK")
        {
            return "supplies";
        }
        if has("STATUS") || has("STATE") || has("ALERT") || has("ERROR") || has("WARNING") {
            return "status";
        }
        if has("MAC") || has("IP") || has("NETWORK") || has("INTERFACE") || has("ADDRESS") {
            return "network";
        }
        if has("HOSTNAME") || has("UPTIME") || has("SYSTEM") || has("DESCRIPTION")
            || has("LOCATION")
            || has("CONTACT")
        {
            return "system";
        }
        "vendor"
    }

    /// Unit hint for a friendly name: `%`, `pages`, `seconds`, or empty.
    pub fn unit(&self, friendly_name: &str) -> &'static str {
        let name = friendly_name.to_uppercase();
        let has = |needle: &str| name.contains(needle);

        if has("LEVEL") || has("CAPACITY") {
            return "%";
        }
        if has("PAGE") || has("IMPRESSION") || has("SCAN") || has("COPY") || has("FAX")
            || has("COUNT")
        {
            return "pages";
        }
        if has("UPTIME") || has("TIME") {
            return "seconds";
        }
        ""
    }
}

fn generate_name(oid: &str) -> String {
    // RFC 3805 page counter leaves.
    if oid.contains(".43.10.2.1.4") {
        return match oid.rsplit('.').next() {
            Some("1") => "Total Pages".to_string(),
            Some("2") => "Monochrome Pages".to_string(),
            Some("3") => "Color Pages".to_string(),
            Some("4") => "Scan Pages".to_string(),
            Some("5") => "Copy Pages".to_string(),
            Some("6") => "Fax Pages".to_string(),
            _ => "Page Counter".to_string(),
        };
    }

    if oid.contains(".43.11") {
        return "Supply".to_string();
    }
    if oid.contains(".43.5") || oid.contains(".43.13") {
        return "Printer Status".to_string();
    }
    if oid.contains(".25.3.2.1.3") {
        return "Printer Model".to_string();
    }
    if oid.contains(".2.1.6") && !oid.contains(".1.6.0") {
        return "MAC Address".to_string();
    }
    if oid.ends_with(".1.1.0") {
        return "System Description".to_string();
    }
    if oid.ends_with(".1.3.0") {
        return "System Uptime".to_string();
    }
    if oid.ends_with(".1.4.0") {
        return "System Contact".to_string();
    }
    if oid.ends_with(".1.5.0") {
        return "Hostname".to_string();
    }
    if oid.ends_with(".1.6.0") {
        return "System Location".to_string();
    }

    match oid.rsplit('.').next() {
        Some(last) => format!("OID {last}"),
        None => "Unknown OID".to_string(),
    }
}

fn known_oids() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        // Printer MIB
        ("1.3.6.1.2.1.43.10.2.1.4.1.1", "Total Page Count"),
        ("1.3.6.1.2.1.43.10.2.1.4.1.2", "Monochrome Page Count"),
        ("1.3.6.1.2.1.43.10.2.1.4.1.3", "Color Page Count"),
        ("1.3.6.1.2.1.43.10.2.1.4.1.4", "Scan Page Count"),
        ("1.3.6.1.2.1.43.10.2.1.4.1.5", "Copy Page Count"),
        ("1.3.6.1.2.1.43.10.2.1.4.1.6", "Fax Page Count"),
        ("1.3.6.1.2.1.43.11.1.1.6.1.1", "Supply Description"),
        ("1.3.6.1.2.1.43.11.1.1.8.1.1", "Supply Max Capacity"),
        ("1.3.6.1.2.1.43.11.1.1.9.1.1", "Supply Level"),
        ("1.3.6.1.2.1.43.5.1.1.17.1", "Serial Number"),
        // System group
        ("1.3.6.1.2.1.1.1.0", "System Description"),
        ("1.3.6.1.2.1.1.2.0", "System OID"),
        ("1.3.6.1.2.1.1.3.0", "System Uptime"),
        ("1.3.6.1.2.1.1.4.0", "System Contact"),
        ("1.3.6.1.2.1.1.5.0", "System Name (Hostname)"),
        ("1.3.6.1.2.1.1.6.0", "System Location"),
        // Host resources
        ("1.3.6.1.2.1.25.3.2.1.3.1", "Printer Model"),
        ("1.3.6.1.2.1.25.3.2.1.5.1", "Device Status"),
        // Interface / IP groups
        ("1.3.6.1.2.1.2.2.1.6.1", "Interface 1 MAC Address"),
        ("1.3.6.1.2.1.4.20.1.1", "IP Address"),
        // Vendor trees
        ("1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.1", "HP Total Impressions"),
        ("1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.2", "HP Mono Impressions"),
        ("1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.3", "HP Color Impressions"),
        ("1.3.6.1.4.1.253.8.53.3.2.1.1.1", "Xerox Total Pages"),
        ("1.3.6.1.4.1.236.11.5.1.1.1.1", "Samsung Total Pages"),
        ("1.3.6.1.4.1.236.11.5.11.1.1.6.1", "Samsung Toner Level"),
        ("1.3.6.1.4.1.367.3.2.1.5.1.1.1", "Ricoh Total Pages"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_oid_lookup() {
        let resolver = FriendlyNameResolver::new();
        assert_eq!(
            resolver.friendly_name("1.3.6.1.2.1.43.10.2.1.4.1.1"),
            "Total Page Count"
        );
    }

    #[test]
    fn test_generated_counter_names() {
        let resolver = FriendlyNameResolver::new();
        assert_eq!(
            resolver.friendly_name("1.3.6.1.2.1.43.10.2.1.4.2.3"),
            "Color Pages"
        );
    }

    #[test]
    fn test_generated_fallback_name() {
        let resolver = FriendlyNameResolver::new();
        assert_eq!(resolver.friendly_name("1.3.6.1.4.1.999.1.7"), "OID 7");
    }

    #[test]
    fn test_detect_type() {
        let resolver = FriendlyNameResolver::new();
        assert_eq!(resolver.detect_type("Total Page Count"), "counter");
        assert_eq!(resolver.detect_type("Supply Level"), "supplies");
        assert_eq!(resolver.detect_type("Device Status"), "status");
        assert_eq!(resolver.detect_type("MAC Address"), "network");
        assert_eq!(resolver.detect_type("System Uptime"), "system");
        assert_eq!(resolver.detect_type("Mystery Object"), "vendor");
    }

    #[test]
    fn test_units() {
        let resolver = FriendlyNameResolver::new();
        assert_eq!(resolver.unit("Supply Level"), "%");
        assert_eq!(resolver.unit("Total Page Count"), "pages");
        assert_eq!(resolver.unit("System Uptime"), "seconds");
        assert_eq!(resolver.unit("Serial Number"), "");
    }
}
