//! Compile-time OID catalog.
//!
//! RFC 3805 printer MIB roots, the host-resources and system groups, and
//! the enterprise sub-trees of the major printer vendors. New vendors are
//! added by extending these tables, not the type system.

/// System group (RFC 1213).
pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
pub const SYS_OBJECT_ID: &str = "1.3.6.1.2.1.1.2.0";
pub const SYS_UPTIME: &str = "1.3.6.1.2.1.1.3.0";
pub const SYS_CONTACT: &str = "1.3.6.1.2.1.1.4.0";
pub const SYS_NAME: &str = "1.3.6.1.2.1.1.5.0";
pub const SYS_LOCATION: &str = "1.3.6.1.2.1.1.6.0";
pub const SYS_SERVICES: &str = "1.3.6.1.2.1.1.7.0";
pub const SYSTEM_BASE: &str = "1.3.6.1.2.1.1";

/// Host-resources MIB (RFC 2790).
pub const HR_DEVICE_BASE: &str = "1.3.6.1.2.1.25.3.2.1";
pub const HR_DEVICE_STATUS: &str = "1.3.6.1.2.1.25.3.2.1.5.1";
pub const HR_DEVICE_MODEL: &str = "1.3.6.1.2.1.25.3.2.1.3.1";
pub const HR_PRINTER_STATUS: &str = "1.3.6.1.2.1.25.3.5.1.1.1";
pub const HR_ENVIRONMENT_BASE: &str = "1.3.6.1.2.1.25.3.3.1";
pub const HOST_RESOURCES_BASE: &str = "1.3.6.1.2.1.25";

/// Printer MIB (RFC 3805).
pub const PRINTER_MIB_BASE: &str = "1.3.6.1.2.1.43";
pub const PRT_SERIAL_NUMBER: &str = "1.3.6.1.2.1.43.5.1.1.17.1";
pub const PRT_DETAILED_STATUS: &str = "1.3.6.1.2.1.43.18.1.1.2.0";

/// Marker supplies table columns (`prtMarkerSuppliesTable`).
pub const MARKER_SUPPLIES_BASE: &str = "1.3.6.1.2.1.43.11.1.1";
pub const MARKER_SUPPLIES_TYPE: &str = "1.3.6.1.2.1.43.11.1.1.2.1";
pub const MARKER_SUPPLIES_MODEL: &str = "1.3.6.1.2.1.43.11.1.1.4.1";
pub const MARKER_SUPPLIES_DESC: &str = "1.3.6.1.2.1.43.11.1.1.6.1";
pub const MARKER_SUPPLIES_STATE: &str = "1.3.6.1.2.1.43.11.1.1.7.1";
pub const MARKER_SUPPLIES_MAX: &str = "1.3.6.1.2.1.43.11.1.1.8.1";
pub const MARKER_SUPPLIES_LEVEL: &str = "1.3.6.1.2.1.43.11.1.1.9.1";

/// Page counter tree and the canonical per-function leaves.
pub const PAGE_COUNTERS_BASE: &str = "1.3.6.1.2.1.43.10.2";
pub const PAGE_COUNTERS_FALLBACK: &str = "1.3.6.1.2.1.43.10";
pub const TOTAL_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.1";
pub const MONO_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.2";
pub const COLOR_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.3";
pub const SCAN_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.4";
pub const COPY_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.5";
pub const FAX_PAGES: &str = "1.3.6.1.2.1.43.10.2.1.4.1.6";

/// Tray tables.
pub const INPUT_TRAY_BASE: &str = "1.3.6.1.2.1.43.8.2.1";
pub const OUTPUT_TRAY_BASE: &str = "1.3.6.1.2.1.43.9.2.1";

/// Interface / IP groups.
pub const IF_PHYS_ADDRESS_1: &str = "1.3.6.1.2.1.2.2.1.6.1";
pub const IF_PHYS_ADDRESS_2: &str = "1.3.6.1.2.1.2.2.1.6.2";
pub const IP_AD_ENT_ADDR: &str = "1.3.6.1.2.1.4.20.1.1";

/// HP device ID string: semicolon-separated `KEY:VALUE` tokens
/// (`MFG`, `MDL`, `SN`, `DES`).
pub const HP_ID_STRING: &str = "1.3.6.1.4.1.11.2.3.9.1.1.7.0";

/// Vendor enterprise roots, keyed for the strategic discovery walk.
pub const ENTERPRISE_HP: &str = "1.3.6.1.4.1.11";
pub const ENTERPRISE_XEROX: &str = "1.3.6.1.4.1.253";
pub const ENTERPRISE_SAMSUNG: &str = "1.3.6.1.4.1.236";
pub const ENTERPRISE_RICOH: &str = "1.3.6.1.4.1.367";

/// Canonical RFC 3805 counter mapping: leaf OID → semantic name.
pub const RFC3805_COUNTER_MAP: &[(&str, &str)] = &[
    (TOTAL_PAGES, "total_pages"),
    (MONO_PAGES, "mono_pages"),
    (COLOR_PAGES, "color_pages"),
    (SCAN_PAGES, "scan_pages"),
    (COPY_PAGES, "copy_pages"),
    (FAX_PAGES, "fax_pages"),
];

/// Sub-trees swept by the strategic discovery walk.
pub const STRATEGIC_WALK_TREES: &[(&str, &str)] = &[
    ("system", SYSTEM_BASE),
    ("printer-mib", PRINTER_MIB_BASE),
    ("host-resources", HOST_RESOURCES_BASE),
    ("enterprise-hp", ENTERPRISE_HP),
    ("enterprise-xerox", ENTERPRISE_XEROX),
    ("enterprise-samsung", ENTERPRISE_SAMSUNG),
    ("enterprise-ricoh", ENTERPRISE_RICOH),
];

/// Sub-trees swept by the per-poll discovery pass in the collector.
/// The key prefixes the flattened OID when a value lands in a bucket.
pub const DISCOVERY_SWEEP_TREES: &[(&str, &str)] = &[
    ("consumables", "1.3.6.1.2.1.43.11.1.1"),
    ("pageCounters", "1.3.6.1.2.1.43.10.2.1"),
    ("printerAlerts", "1.3.6.1.2.1.43.13"),
    ("deviceInfo", "1.3.6.1.2.1.25.3.2.1"),
    ("environment", "1.3.6.1.2.1.25.3.3.1"),
    ("generalInfo", "1.3.6.1.2.1.1"),
    ("xeroxCounters", "1.3.6.1.4.1.253.8.53.3.2.1"),
    ("xeroxSupplies", "1.3.6.1.4.1.253.8.53.13"),
    ("hpCounters", "1.3.6.1.4.1.11.2.3.9.4.2.1.4"),
    ("hpSupplies", "1.3.6.1.4.1.11.2.3.9.4.3"),
    ("hpStatus", "1.3.6.1.4.1.11.2.3.9.4.2.1.5"),
    ("samsungCounters", "1.3.6.1.4.1.236.11.5.1.1"),
    ("samsungSupplies", "1.3.6.1.4.1.236.11.5.11.1"),
    ("samsungSupplies", "1.3.6.1.4.1.236.11.5.11.26"),
    ("samsungStatus", "1.3.6.1.4.1.236.11.5.11.7"),
    ("kyoceraCounters", "1.3.6.1.4.1.2297.4.13"),
    ("konicaCounters", "1.3.6.1.4.1.1021.1.2"),
    ("canonCounters", "1.3.6.1.4.1.3582.1.1"),
    ("brotherInfo", "1.3.6.1.4.1.2435"),
    ("ricohCounters", "1.3.6.1.4.1.367.3.2.1"),
];

/// Brand-specific counter GET tuples tried when the standard tree yields
/// no usable total. Ordered by descending value at assignment time.
pub const SAMSUNG_COUNTER_OIDS: &[&str] = &[
    "1.3.6.1.4.1.236.11.5.1.1.1.1",
    "1.3.6.1.4.1.236.11.5.1.1.1.4",
    "1.3.6.1.4.1.236.11.5.1.1.1.26",
    "1.3.6.1.4.1.236.11.5.1.1.1.30",
];

pub const HP_COUNTER_OIDS: &[&str] = &[
    "1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.1",
    "1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.2",
    "1.3.6.1.4.1.11.2.3.9.4.2.1.4.1.3",
];

pub const XEROX_COUNTER_OIDS: &[&str] = &[
    "1.3.6.1.4.1.253.8.53.3.2.1.1.1",
    "1.3.6.1.4.1.253.8.53.3.2.1.2.1",
    "1.3.6.1.4.1.253.8.53.3.2.1.3.1",
    "1.3.6.1.4.1.253.8.53.3.2.1.4.1",
    "1.3.6.1.4.1.253.8.53.3.2.1.5.1",
    "1.3.6.1.4.1.253.8.53.3.2.1.6.1",
];

/// Xerox supply-tree leaves that are really page counters, promoted into
/// the counters bucket after the discovery sweep.
pub const XEROX_COUNTER_RESCUE: &[(&str, &str)] = &[
    ("1.3.6.1.4.1.253.8.53.13.2.1.2.1.20.1", "total_pages"),
    ("1.3.6.1.4.1.253.8.53.13.2.1.2.1.20.7", "mono_pages"),
    ("1.3.6.1.4.1.253.8.53.13.2.1.2.1.20.29", "color_pages"),
];

/// Samsung supply-tree leaves that are really page counters.
pub const SAMSUNG_COUNTER_RESCUE: &[(&str, &str)] = &[
    ("1.3.6.1.4.1.236.11.5.11.26.1.1.2.0", "total_pages"),
    ("1.3.6.1.4.1.236.11.5.11.26.1.1.3.0", "color_pages"),
];

/// Counter values above this are overflow markers or garbage, never real
/// page tallies.
pub const MAX_PLAUSIBLE_COUNTER: i64 = 3_000_000_000;

/// Default suspicious-counter sentinels: integer limits, the low powers of
/// two that firmware returns for "not supported", and values observed in
/// the field on Samsung units. Replaceable via configuration.
pub fn default_suspicious_values() -> Vec<i64> {
    let mut values = vec![i64::from(i32::MAX), u32::MAX as i64, 27_327_487];
    for shift in 21..=30 {
        values.push(1i64 << shift);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_map_covers_all_functions() {
        let names: Vec<&str> = RFC3805_COUNTER_MAP.iter().map(|(_, n)| *n).collect();
        assert_eq!(
            names,
            vec![
                "total_pages",
                "mono_pages",
                "color_pages",
                "scan_pages",
                "copy_pages",
                "fax_pages"
            ]
        );
    }

    #[test]
    fn test_suspicious_values_include_int_limits() {
        let values = default_suspicious_values();
        assert!(values.contains(&2_147_483_647));
        assert!(values.contains(&4_294_967_295));
        assert!(values.contains(&(1 << 21)));
        assert!(values.contains(&27_327_487));
        assert!(!values.contains(&(1 << 20)));
    }
}
