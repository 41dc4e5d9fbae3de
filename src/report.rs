//! End-of-run scan summary.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::collector::PrinterData;

/// Aggregate numbers for one scan run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub responsive: usize,
    pub events_queued: usize,
    pub by_brand: BTreeMap<String, usize>,
    pub duration: Duration,
}

impl ScanSummary {
    pub fn new(
        scanned: usize,
        printers: &[PrinterData],
        events_queued: usize,
        duration: Duration,
    ) -> Self {
        let mut by_brand = BTreeMap::new();
        for printer in printers {
            *by_brand.entry(printer.brand.as_str().to_string()).or_insert(0) += 1;
        }

        Self {
            scanned,
            responsive: printers.len(),
            events_queued,
            by_brand,
            duration,
        }
    }
}

impl std::fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let brands = self
            .by_brand
            .iter()
            .map(|(brand, count)| format!("{brand}={count}"))
            .collect::<Vec<_>>()
            .join(", ");

        write!(
            f,
            "scanned {} ips, {} responsive ({}), {} events queued in {:.2}s",
            self.scanned,
            self.responsive,
            if brands.is_empty() { "-" } else { &brands },
            self.events_queued,
            self.duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::collector::DeviceInfo;
    use crate::scanner::Brand;
    use crate::snmp::SnmpVersion;

    use super::*;

    fn printer(brand: Brand) -> PrinterData {
        PrinterData::new(&DeviceInfo {
            ip: "10.0.0.5".to_string(),
            brand,
            brand_confidence: 0.9,
            sys_descr: String::new(),
            community: "public".to_string(),
            snmp_version: SnmpVersion::V2c,
        })
    }

    #[test]
    fn test_summary_counts_by_brand() {
        let printers = vec![printer(Brand::Hp), printer(Brand::Hp), printer(Brand::Xerox)];
        let summary = ScanSummary::new(254, &printers, 3, Duration::from_secs(12));

        assert_eq!(summary.scanned, 254);
        assert_eq!(summary.responsive, 3);
        assert_eq!(summary.by_brand.get("HP"), Some(&2));
        assert_eq!(summary.by_brand.get("Xerox"), Some(&1));

        let line = summary.to_string();
        assert!(line.contains("254 ips"));
        assert!(line.contains("HP=2"));
    }

    #[test]
    fn test_summary_with_no_printers() {
        let summary = ScanSummary::new(10, &[], 0, Duration::from_secs(1));
        assert!(summary.to_string().contains("0 responsive (-)"));
    }
}
