//! Printer brand detection from `sysDescr`.
//!
//! Ordered case-insensitive substring matching; the first brand with a
//! matching pattern wins, anything unmatched is `Generic`. A second lookup
//! scores how specific the match was.

use serde::{Deserialize, Serialize};

/// Known printer brands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Brand {
    #[serde(rename = "HP")]
    Hp,
    Xerox,
    Brother,
    Ricoh,
    Canon,
    KonicaMinolta,
    #[serde(rename = "OKI")]
    Oki,
    Kyocera,
    Sharp,
    Toshiba,
    Samsung,
    #[default]
    Generic,
}

impl Brand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hp => "HP",
            Self::Xerox => "Xerox",
            Self::Brother => "Brother",
            Self::Ricoh => "Ricoh",
            Self::Canon => "Canon",
            Self::KonicaMinolta => "KonicaMinolta",
            Self::Oki => "OKI",
            Self::Kyocera => "Kyocera",
            Self::Sharp => "Sharp",
            Self::Toshiba => "Toshiba",
            Self::Samsung => "Samsung",
            Self::Generic => "Generic",
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection table, ordered by priority. More specific vendors with
/// ambiguous short tokens (e.g. "hp") still win because their entries come
/// first and real descriptors lead with the vendor name.
const PATTERNS: &[(Brand, &[&str])] = &[
    (
        Brand::Hp,
        &[
            "hp",
            "hewlett packard",
            "laserjet",
            "officejet",
            "color laserjet",
        ],
    ),
    (
        Brand::Xerox,
        &["xerox", "docucentre", "workcentre", "docucolor", "versalink"],
    ),
    (Brand::Brother, &["brother", "hl-", "mfc-", "dcpl"]),
    (Brand::Ricoh, &["ricoh", "imagio", "lanier", "gestetner"]),
    (Brand::Canon, &["canon", "imagerunner", "ir-"]),
    (
        Brand::KonicaMinolta,
        &["konica", "minolta", "bizhub", "accurio"],
    ),
    (Brand::Oki, &["oki", "okidata", "c931", "c941"]),
    (Brand::Kyocera, &["kyocera", "mita", "taskalfa", "km-"]),
    (Brand::Sharp, &["sharp", "mx-", "ar-"]),
    (Brand::Toshiba, &["toshiba", "e-studio"]),
    (Brand::Samsung, &["samsung", "ml-", "sl-", "clp-"]),
];

/// Map a system descriptor to a brand. Deterministic: repeated calls with
/// the same descriptor always yield the same brand.
pub fn detect(sys_descr: &str) -> Brand {
    let desc = sys_descr.to_lowercase();

    for (brand, patterns) in PATTERNS {
        if patterns.iter().any(|p| desc.contains(p)) {
            return *brand;
        }
    }

    Brand::Generic
}

/// Score how specific the detection was, 0.0–1.0.
///
/// Strong vendor-plus-family matches score 0.98–0.99, a bare vendor token
/// 0.85–0.96, `Generic` a flat 0.50, everything else 0.75.
pub fn confidence(sys_descr: &str, brand: Brand) -> f64 {
    let desc = sys_descr.to_lowercase();
    let has = |needle: &str| desc.contains(needle);

    match brand {
        Brand::Hp => {
            if has("hewlett packard") {
                0.99
            } else if has("hp") && has("laserjet") {
                0.98
            } else if has("hp") {
                0.85
            } else {
                0.75
            }
        }
        Brand::Xerox => {
            if has("xerox") && has("workcentre") {
                0.99
            } else if has("xerox") {
                0.98
            } else {
                0.75
            }
        }
        Brand::Brother => {
            if has("brother") && (has("hl-") || has("mfc-")) {
                0.99
            } else if has("brother") {
                0.95
            } else {
                0.75
            }
        }
        Brand::Ricoh => {
            if has("ricoh") {
                0.95
            } else if has("imagio") {
                0.90
            } else {
                0.75
            }
        }
        Brand::Canon => {
            if has("canon") && has("imagerunner") {
                0.98
            } else if has("canon") {
                0.95
            } else {
                0.75
            }
        }
        Brand::Samsung => {
            if has("samsung") && (has("ml-") || has("clp-")) {
                0.99
            } else if has("samsung") {
                0.96
            } else {
                0.75
            }
        }
        Brand::Generic => 0.50,
        _ => 0.75,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_major_brands() {
        assert_eq!(detect("HP LaserJet Pro M402"), Brand::Hp);
        assert_eq!(detect("Xerox WorkCentre 6515"), Brand::Xerox);
        assert_eq!(detect("Brother HL-L2350DW series"), Brand::Brother);
        assert_eq!(detect("RICOH IM C300"), Brand::Ricoh);
        assert_eq!(detect("Canon imageRUNNER 1643i"), Brand::Canon);
        assert_eq!(detect("KONICA MINOLTA bizhub C250i"), Brand::KonicaMinolta);
        assert_eq!(detect("Samsung M332x 382x 402x Series"), Brand::Samsung);
        assert_eq!(detect("KYOCERA TASKalfa 3554ci"), Brand::Kyocera);
    }

    #[test]
    fn test_detect_unknown_is_generic() {
        assert_eq!(detect("Some Print Server v2"), Brand::Generic);
        assert_eq!(detect(""), Brand::Generic);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let descr = "Xerox VersaLink C405";
        assert_eq!(detect(descr), detect(descr));
    }

    #[test]
    fn test_confidence_bands() {
        assert!(confidence("HP LaserJet Pro M402", Brand::Hp) >= 0.98);
        assert_eq!(confidence("Hewlett Packard thing", Brand::Hp), 0.99);
        assert_eq!(confidence("whatever", Brand::Generic), 0.50);
        assert_eq!(confidence("Samsung SL-M3820", Brand::Samsung), 0.96);
        assert_eq!(confidence("Samsung CLP-365", Brand::Samsung), 0.99);
        // Fallback for brands without a specific table.
        assert_eq!(confidence("TOSHIBA e-STUDIO2515AC", Brand::Toshiba), 0.75);
    }

    #[test]
    fn test_brand_serde_names() {
        assert_eq!(serde_json::to_string(&Brand::Hp).unwrap(), "\"HP\"");
        assert_eq!(
            serde_json::to_string(&Brand::KonicaMinolta).unwrap(),
            "\"KonicaMinolta\""
        );
        let back: Brand = serde_json::from_str("\"Xerox\"").unwrap();
        assert_eq!(back, Brand::Xerox);
    }
}
