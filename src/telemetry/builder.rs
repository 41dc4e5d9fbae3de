//! Build telemetry events from collected printer data.
//!
//! A pure mapping: no SNMP, no I/O. If the wire protocol ever changes,
//! this module does not.

use chrono::Duration;

use crate::collector::{CountersDiff, CountersInfo, CountersSnapshot, PrinterData, SupplyReading};

use super::models::{
    AgentSource, AlertInfo, AlertSeverity, MetricsInfo, PollingMetrics, PrinterInfo, SCHEMA_VERSION,
    SupplyInfo, SupplyStatus, SupplyType, Telemetry,
};

/// Constant reported until per-OID accounting lands in the collector.
const OID_SUCCESS_RATE: f64 = 0.95;

/// Interval to the next scheduled poll.
fn poll_interval() -> Duration {
    Duration::hours(1)
}

impl AgentSource {
    /// Identity of this agent process, from the environment.
    pub fn from_env() -> Self {
        Self {
            agent_id: std::env::var("AGENT_ID").unwrap_or_else(|_| "AGT-LOCAL-001".to_string()),
            hostname: std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string()),
            os: std::env::consts::OS.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Maps `PrinterData` plus delta results onto the event schema.
#[derive(Debug, Clone)]
pub struct TelemetryBuilder {
    source: AgentSource,
}

impl TelemetryBuilder {
    pub fn new(source: AgentSource) -> Self {
        Self { source }
    }

    /// Build one event. The delta and reset flag come from the state
    /// store, computed against the previous poll.
    pub fn build(
        &self,
        data: &PrinterData,
        delta: Option<CountersDiff>,
        reset_detected: bool,
    ) -> Telemetry {
        let printer = self.build_printer(data);
        let counters = build_counters(data, delta, reset_detected);
        let supplies = self.build_supplies(data);
        let alerts = build_alerts(data, supplies.as_deref());
        let event_id = self.build_event_id(&printer, data);

        Telemetry {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id,
            collected_at: data.timestamp,
            source: self.source.clone(),
            printer,
            counters,
            supplies,
            alerts,
            metrics: build_metrics(data),
        }
    }

    fn build_printer(&self, data: &PrinterData) -> PrinterInfo {
        let mac = data.network_info.get("mac_address").map(String::as_str);

        PrinterInfo {
            id: printer_identity(mac, extract_serial(data).as_deref(), &data.ip),
            ip: data.ip.clone(),
            brand: data.brand,
            brand_confidence: data.brand_confidence,
            model: extract_model(data),
            serial_number: extract_serial(data),
            hostname: non_empty(data.identification.get("hostname")),
            mac_address: non_empty(data.network_info.get("mac_address")),
        }
    }

    /// `{agent_id}::{mac_or_ip_sanitized}::{unix_seconds}`.
    fn build_event_id(&self, printer: &PrinterInfo, data: &PrinterData) -> String {
        let key = printer
            .mac_address
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| m.replace(':', ""))
            .unwrap_or_else(|| printer.ip.clone());

        format!("{}::{}::{}", self.source.agent_id, key, data.timestamp.timestamp())
    }

    fn build_supplies(&self, data: &PrinterData) -> Option<Vec<SupplyInfo>> {
        if data.supplies.is_empty() {
            return None;
        }

        let mut supplies = Vec::new();
        for (key, reading) in &data.supplies {
            if let Some(supply) = build_supply(key, reading) {
                supplies.push(supply);
            }
        }

        (!supplies.is_empty()).then_some(supplies)
    }
}

/// Identity precedence: MAC when it is a real one, else serial, else IP.
fn printer_identity(mac: Option<&str>, serial: Option<&str>, ip: &str) -> String {
    if let Some(mac) = mac {
        let clean: String = mac
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_hexdigit())
            .collect();
        if clean.len() >= 12 {
            return clean;
        }
    }

    if let Some(serial) = serial {
        let trimmed = serial.trim();
        if !trimmed.is_empty() {
            return trimmed.to_lowercase();
        }
    }

    ip.to_string()
}

fn build_counters(
    data: &PrinterData,
    delta: Option<CountersDiff>,
    reset_detected: bool,
) -> Option<CountersSnapshot> {
    let counters = if data.normalized_counters.is_empty() {
        &data.counters
    } else {
        &data.normalized_counters
    };
    if counters.is_empty() {
        return None;
    }

    let get = |key: &str| counters.get(key).copied().unwrap_or(0);
    let absolute = CountersInfo {
        total_pages: get("total_pages"),
        mono_pages: get("mono_pages"),
        color_pages: get("color_pages"),
        scan_pages: get("scan_pages"),
        copy_pages: get("copy_pages"),
        fax_pages: get("fax_pages"),
    };

    Some(CountersSnapshot {
        absolute,
        delta,
        reset_detected,
    })
}

fn build_supply(key: &str, reading: &SupplyReading) -> Option<SupplyInfo> {
    let raw_name = reading.description.trim();
    if raw_name.is_empty() || raw_name.eq_ignore_ascii_case("unknown") {
        return None;
    }

    let level = reading.level.unwrap_or(0);
    let max_level = reading.max.unwrap_or(0);
    let mut percentage = 0i64;
    if max_level > 0 && level > 0 {
        percentage = (level * 100 / max_level).clamp(0, 100);
    }

    // All-zero readings carry nothing unless the name itself does.
    if level == 0 && max_level == 0 && percentage == 0 && !name_carries_info(raw_name) {
        return None;
    }

    let name = clean_supply_name(raw_name);
    if name.is_empty() {
        return None;
    }

    let serial_number = extract_serial_from_description(raw_name);
    let part_number = extract_part_number_from_description(raw_name);
    let model = reading.part.clone().or_else(|| part_number.clone());

    Some(SupplyInfo {
        id: key.to_string(),
        name: name.clone(),
        supply_type: deduce_supply_type(&name),
        level,
        max_level,
        percentage,
        status: deduce_supply_status(percentage),
        model,
        serial_number,
        brand: None,
        description: Some(reading.description.clone()),
        component_type: reading.type_code.clone(),
        page_capacity: reading.max.filter(|&m| m > 1000),
        part_number,
    })
}

fn build_alerts(data: &PrinterData, supplies: Option<&[SupplyInfo]>) -> Option<Vec<AlertInfo>> {
    let supplies = supplies?;

    let mut alerts = Vec::new();
    for supply in supplies {
        let severity = match supply.status {
            SupplyStatus::Critical => AlertSeverity::Critical,
            SupplyStatus::Low => AlertSeverity::Warning,
            _ => continue,
        };

        let status = supply.status.as_str();
        let message = match &supply.model {
            Some(model) => format!(
                "{} {} is {} ({}%)",
                supply.name, model, status, supply.percentage
            ),
            None => format!("{} is {} ({}%)", supply.name, status, supply.percentage),
        };

        alerts.push(AlertInfo {
            id: format!("{}_{}", supply.supply_type.as_str(), status),
            alert_type: "supply".to_string(),
            severity,
            message,
            detected_at: data.timestamp,
        });
    }

    (!alerts.is_empty()).then_some(alerts)
}

fn build_metrics(data: &PrinterData) -> MetricsInfo {
    let response_time_ms = data.response_time.as_millis().min(i64::MAX as u128) as i64;

    MetricsInfo {
        polling: PollingMetrics {
            response_time_ms,
            poll_duration_ms: response_time_ms,
            oid_success_rate: OID_SUCCESS_RATE,
            retry_count: data.probe_attempts.saturating_sub(1),
            last_poll_at: data.timestamp,
            next_poll_at: data.timestamp + poll_interval(),
            error_count: data.errors.len(),
        },
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Model, rejecting values that are plainly serial numbers.
fn extract_model(data: &PrinterData) -> Option<String> {
    for key in ["model", "model_name", "printer_model"] {
        if let Some(model) = data.identification.get(key) {
            let model = model.trim();
            if !model.is_empty() && !looks_like_serial_number(model) {
                return Some(model.to_string());
            }
        }
    }

    // The description is only trusted when it names an actual family.
    if let Some(description) = data.identification.get("description") {
        let lower = description.to_lowercase();
        const FAMILY_WORDS: &[&str] = &[
            "laserjet",
            "officejet",
            "workcentre",
            "versalink",
            "bizhub",
            "taskalfa",
            "imagerunner",
            "e-studio",
            "mfp",
            "m332",
            "m402",
            "m382",
        ];
        if FAMILY_WORDS.iter().any(|w| lower.contains(w)) {
            return Some(description.trim().to_string());
        }
    }

    None
}

/// Serial, rejecting values that are really vendor names.
fn extract_serial(data: &PrinterData) -> Option<String> {
    for key in ["serial_number", "serial"] {
        if let Some(serial) = data.identification.get(key) {
            let serial = serial.trim();
            if !serial.is_empty() && !is_brand_name(serial) {
                return Some(serial.to_string());
            }
        }
    }
    None
}

/// All-alphanumeric, digit-bearing, spaceless strings of 12+ characters
/// are serials, not models.
fn looks_like_serial_number(value: &str) -> bool {
    const MODEL_WORDS: &[&str] = &[
        "officejet",
        "laserjet",
        "colorprint",
        "mfp",
        "multifunction",
        "pro",
        "plus",
        "enterprise",
        "copier",
        "xerox",
        "samsung",
        "ricoh",
    ];
    let lower = value.to_lowercase();
    if MODEL_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }
    if value.contains(' ') {
        return false;
    }

    let all_alphanumeric = value.chars().all(|c| c.is_ascii_alphanumeric());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    all_alphanumeric && has_digit && value.len() >= 12
}

fn is_brand_name(value: &str) -> bool {
    const BRAND_WORDS: &[&str] = &[
        "samsung",
        "xerox",
        "hewlett",
        "canon",
        "ricoh",
        "konica",
        "minolta",
        "kyocera",
        "brother",
        "electronics",
        "corporation",
        "company",
        "inc.",
        "limited",
    ];
    let lower = value.trim().to_lowercase();
    BRAND_WORDS.iter().any(|w| lower.contains(w)) || lower == "hp"
}

/// True when an otherwise-empty supply name still describes something:
/// serial/part/model/firmware fragments, or an unusually long label.
fn name_carries_info(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("s/n")
        || lower.contains("serial")
        || lower.contains("part")
        || lower.contains("model")
        || lower.contains("firmware")
        || lower.contains("version")
        || name.len() > 50
}

/// Strip serial and part-number fragments from a supply name.
///
/// `"Black Toner, PN 006R01509;SN99172880E000044B"` → `"Black Toner"`.
pub fn clean_supply_name(name: &str) -> String {
    let mut name = name.trim().to_string();
    if name.is_empty() {
        return name;
    }

    truncate_at_ci(&mut name, ";SN");
    truncate_at_ci(&mut name, "S/N:");

    for separator in [
        "Serial",
        "Part Number",
        "PN ",
        "PN:",
        "PN=",
        "P/N:",
        "P/N ",
        "Model:",
        "Version:",
    ] {
        if truncate_at_ci(&mut name, separator) {
            break;
        }
    }

    let name = name.trim().trim_end_matches(',').trim();
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.len() < 3 {
        return String::new();
    }
    collapsed
}

/// Cut `name` at the first case-insensitive occurrence of `needle`.
/// Case folding can shift byte offsets for non-ASCII text, so the cut
/// only happens on a clean char boundary.
fn truncate_at_ci(name: &mut String, needle: &str) -> bool {
    let folded = name.to_uppercase();
    if let Some(idx) = folded.find(&needle.to_uppercase())
        && idx <= name.len()
        && name.is_char_boundary(idx)
    {
        name.truncate(idx);
        return true;
    }
    false
}

/// `"PN 006R01509;SN99172880E000044B"` → `Some("99172880E000044B")`.
fn extract_serial_from_description(description: &str) -> Option<String> {
    let upper = description.to_uppercase();

    if let Some(idx) = upper.find(";SN") {
        let serial = description[idx + 3..].trim().trim_end_matches("unknown").trim();
        if serial.len() > 2 {
            return Some(serial.to_string());
        }
    }

    for pattern in ["S/N:", "SN:", "SERIAL:"] {
        if let Some(idx) = upper.find(pattern) {
            let serial = description[idx + pattern.len()..].trim();
            if serial.len() > 2 {
                return Some(serial.to_string());
            }
        }
    }

    None
}

/// `"Black Toner, PN 006R01509;SN…"` → `Some("006R01509")`.
fn extract_part_number_from_description(description: &str) -> Option<String> {
    let upper = description.to_uppercase();

    for pattern in ["PN ", "PN:", "P/N:", "P/N ", "PART NUMBER:"] {
        let Some(idx) = upper.find(pattern) else {
            continue;
        };
        let mut part = description[idx + pattern.len()..].trim();

        for delimiter in [";", ",", " S/N", " SN:"] {
            if let Some(cut) = part.to_uppercase().find(&delimiter.to_uppercase()) {
                part = &part[..cut];
                break;
            }
        }

        let part = part.trim();
        if part.len() > 2 && part != "unknown" {
            return Some(part.to_string());
        }
    }

    None
}

/// Classify a supply from its cleaned name.
fn deduce_supply_type(name: &str) -> SupplyType {
    let lower = name.to_lowercase();

    const KEYWORDS: &[(&str, SupplyType)] = &[
        ("toner", SupplyType::Toner),
        ("ink", SupplyType::Toner),
        ("drum", SupplyType::Drum),
        ("fuser", SupplyType::Fuser),
        ("waste", SupplyType::Waste),
        ("transfer", SupplyType::Transfer),
        ("pickup", SupplyType::Pickup),
        ("roller", SupplyType::Roller),
        ("cartridge", SupplyType::Cartridge),
    ];

    for (keyword, supply_type) in KEYWORDS {
        if lower.contains(keyword) {
            return *supply_type;
        }
    }
    SupplyType::Consumable
}

/// Status from remaining percentage.
fn deduce_supply_status(percentage: i64) -> SupplyStatus {
    if percentage <= 10 {
        SupplyStatus::Critical
    } else if percentage <= 25 {
        SupplyStatus::Low
    } else if percentage <= 75 {
        SupplyStatus::Ok
    } else {
        SupplyStatus::Good
    }
}
