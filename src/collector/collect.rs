//! Per-device data collection.
//!
//! One task per printer, bounded by a semaphore. Each task owns its SNMP
//! session and works through a fixed sequence: profile, identification,
//! status, network, supplies, counters, admin, trays, discovery sweep,
//! counter rescue, normalization, missing-section accounting. A failed
//! section never aborts the device; a failed device never aborts the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::profile::{Discoverer, Profile, ProfileStore};
use crate::scanner::Brand;
use crate::snmp::value::decode_hex_ascii;
use crate::snmp::{SnmpSession, SnmpSessionConfig, oids};

use super::data::{DeviceInfo, NormalizedSupply, PrinterData, SupplyReading};

/// Collector tuning knobs.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub timeout: Duration,
    pub retries: u32,
    pub max_concurrent: usize,
    pub port: u16,
    /// Pause between query phases against one device. Some older
    /// firmwares drop packets when hammered back-to-back.
    pub delay_between_queries: Duration,
    /// Counter values that are firmware sentinels rather than page
    /// tallies. Configurable; see the default table in the OID catalog.
    pub suspicious_values: Vec<i64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            retries: 1,
            max_concurrent: 10,
            port: 161,
            delay_between_queries: Duration::from_millis(50),
            suspicious_values: oids::default_suspicious_values(),
        }
    }
}

/// Orchestrates collection across a set of devices.
#[derive(Debug, Clone)]
pub struct DataCollector {
    config: CollectorConfig,
    profiles: Arc<ProfileStore>,
}

impl DataCollector {
    pub fn new(config: CollectorConfig, profiles: Arc<ProfileStore>) -> Self {
        Self { config, profiles }
    }

    /// Collect from every device, fanned out under the concurrency bound.
    /// Result order is nondeterministic.
    pub async fn collect_all(&self, devices: Vec<DeviceInfo>) -> Vec<PrinterData> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        tracing::info!(devices = devices.len(), "starting data collection");
        let started = std::time::Instant::now();

        for device in devices {
            let permits = Arc::clone(&semaphore);
            let collector = self.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.expect("semaphore closed");
                collector.collect_device(device).await
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(data) => results.push(data),
                Err(e) => tracing::warn!(error = %e, "collection task panicked"),
            }
        }

        tracing::info!(
            collected = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "data collection complete"
        );

        results
    }

    /// The ordered per-device pipeline.
    pub async fn collect_device(&self, device: DeviceInfo) -> PrinterData {
        let started = std::time::Instant::now();
        let mut data = PrinterData::new(&device);

        let session = SnmpSession::new(SnmpSessionConfig {
            host: device.ip.clone(),
            port: self.config.port,
            community: device.community.clone(),
            version: device.snmp_version,
            timeout: self.config.timeout,
            retries: self.config.retries,
        });

        let profile = self.load_or_discover_profile(&session, &device).await;

        self.collect_identification(&session, &mut data).await;
        self.pace().await;
        self.collect_status(&session, &mut data).await;
        self.pace().await;
        self.collect_network(&session, &mut data).await;
        self.pace().await;
        self.collect_supplies(&session, &mut data).await;
        self.pace().await;
        self.collect_counters(&session, &device, profile.as_ref(), &mut data)
            .await;
        self.pace().await;
        self.collect_admin(&session, &mut data).await;
        self.pace().await;
        self.collect_trays(&session, &mut data).await;
        self.pace().await;
        self.discovery_sweep(&session, &mut data).await;
        rescue_page_counters(&mut data);

        apply_status_consistency_override(&mut data);
        normalize(&mut data, &self.config.suspicious_values);
        record_missing_sections(&mut data);

        data.response_time = started.elapsed();

        let poll_ok = data.errors.is_empty();
        let last_error = data.errors.last().map(String::as_str);
        if let Err(e) = self
            .profiles
            .update_validation(&device.ip, poll_ok, last_error)
        {
            tracing::debug!(ip = %device.ip, error = %e, "profile validation update skipped");
        }

        data
    }

    async fn pace(&self) {
        if !self.config.delay_between_queries.is_zero() {
            tokio::time::sleep(self.config.delay_between_queries).await;
        }
    }

    /// Step 1: cached profile, else strategic discovery + persist.
    async fn load_or_discover_profile(
        &self,
        session: &SnmpSession,
        device: &DeviceInfo,
    ) -> Option<Profile> {
        if !self.profiles.needs_rediscovery(&device.ip) {
            return self.profiles.get_or_discover(&device.ip);
        }

        let discoverer = Discoverer::new(session);
        let profile = discoverer
            .discover(
                &device.ip,
                &device.ip,
                device.brand,
                "",
                device.snmp_version.as_str(),
            )
            .await;

        if let Err(e) = self.profiles.save(&profile) {
            tracing::warn!(ip = %device.ip, error = %e, "failed to persist profile");
        }

        Some(profile)
    }

    /// Step 2: identification, including the HP device ID string.
    async fn collect_identification(&self, session: &SnmpSession, data: &mut PrinterData) {
        let oid_fields: &[(&str, &str)] = &[
            (oids::SYS_DESCR, "description"),
            (oids::SYS_NAME, "hostname"),
            (oids::SYS_OBJECT_ID, "sys_object_id"),
            (oids::PRT_SERIAL_NUMBER, "serial_number"),
            (oids::HR_DEVICE_MODEL, "model"),
            (oids::HP_ID_STRING, "hp_device_id"),
        ];
        let oid_list: Vec<&str> = oid_fields.iter().map(|(o, _)| *o).collect();

        let values = match session.get_multiple(&oid_list).await {
            Ok(values) => values,
            Err(e) => {
                data.errors.push(format!("identification_error: {e}"));
                return;
            }
        };

        for (oid, field) in oid_fields {
            if let Some(Some(value)) = values.get(*oid) {
                let clean = sanitize_value(value);
                if !clean.is_empty() {
                    data.identification.insert((*field).to_string(), clean);
                }
            }
        }

        if let Some(hp_id) = data.identification.remove("hp_device_id") {
            for (key, value) in parse_hp_device_id(&hp_id) {
                data.identification.entry(key).or_insert(value);
            }
        }
    }

    /// Step 3: device status. The offline consistency override runs after
    /// supplies and counters exist.
    async fn collect_status(&self, session: &SnmpSession, data: &mut PrinterData) {
        let oid_list = [
            oids::HR_DEVICE_STATUS,
            oids::HR_PRINTER_STATUS,
            oids::PRT_DETAILED_STATUS,
            oids::SYS_UPTIME,
            oids::TOTAL_PAGES,
        ];

        let values = match session.get_multiple(&oid_list).await {
            Ok(values) => values,
            Err(e) => {
                data.errors.push(format!("status_error: {e}"));
                return;
            }
        };

        if let Some(Some(raw)) = values.get(oids::HR_DEVICE_STATUS) {
            data.status
                .insert("state".to_string(), decode_device_status(raw));
        }
        if let Some(Some(raw)) = values.get(oids::HR_PRINTER_STATUS) {
            if !raw.is_empty() {
                data.status.insert("printer_status".to_string(), raw.clone());
            }
        }
        if let Some(Some(raw)) = values.get(oids::PRT_DETAILED_STATUS) {
            if !raw.is_empty() {
                data.status.insert("error_status".to_string(), raw.clone());
            }
        }
        if let Some(Some(raw)) = values.get(oids::SYS_UPTIME) {
            if !raw.is_empty() {
                data.status.insert("uptime_ticks".to_string(), raw.clone());
            }
        }
        // Lifetime page count doubles as the fallback when the counter
        // walk yields only sentinels.
        if let Some(Some(raw)) = values.get(oids::TOTAL_PAGES) {
            if let Some(count) = parse_counter_value(raw) {
                data.status.insert("page_count".to_string(), count.to_string());
            }
        }
    }

    /// Step 4: network addresses. First non-empty interface MAC wins.
    async fn collect_network(&self, session: &SnmpSession, data: &mut PrinterData) {
        let oid_list = [
            oids::IF_PHYS_ADDRESS_1,
            oids::IF_PHYS_ADDRESS_2,
            oids::IP_AD_ENT_ADDR,
            oids::SYS_LOCATION,
        ];

        let values = match session.get_multiple(&oid_list).await {
            Ok(values) => values,
            Err(e) => {
                data.errors.push(format!("network_error: {e}"));
                return;
            }
        };

        let mac = [oids::IF_PHYS_ADDRESS_1, oids::IF_PHYS_ADDRESS_2]
            .iter()
            .filter_map(|oid| values.get(*oid).cloned().flatten())
            .find(|v| !v.is_empty());
        if let Some(mac) = mac {
            data.network_info.insert("mac_address".to_string(), mac);
        }

        if let Some(Some(ip)) = values.get(oids::IP_AD_ENT_ADDR) {
            if !ip.is_empty() {
                data.network_info.insert("ip_address".to_string(), ip.clone());
            }
        }
        if let Some(Some(location)) = values.get(oids::SYS_LOCATION) {
            let clean = sanitize_value(location);
            if !clean.is_empty() {
                data.network_info.insert("location".to_string(), clean);
            }
        }
    }

    /// Step 5: supplies from the marker table walk.
    async fn collect_supplies(&self, session: &SnmpSession, data: &mut PrinterData) {
        let descriptions = match session.walk(oids::MARKER_SUPPLIES_DESC).await {
            Ok(items) => items,
            Err(e) => {
                data.errors.push(format!("supplies_error: {e}"));
                return;
            }
        };

        // Gather the column OIDs for every described index in one batch.
        let mut indexed: Vec<(String, String)> = Vec::new();
        for item in &descriptions {
            if item.value.trim().is_empty() {
                continue;
            }
            if let Some(index) = item.oid.rsplit('.').next() {
                indexed.push((index.to_string(), item.value.trim().to_string()));
            }
        }
        if indexed.is_empty() {
            return;
        }

        let mut column_oids = Vec::with_capacity(indexed.len() * 5);
        for (index, _) in &indexed {
            for column in [
                oids::MARKER_SUPPLIES_LEVEL,
                oids::MARKER_SUPPLIES_MAX,
                oids::MARKER_SUPPLIES_TYPE,
                oids::MARKER_SUPPLIES_MODEL,
                oids::MARKER_SUPPLIES_STATE,
            ] {
                column_oids.push(format!("{column}.{index}"));
            }
        }
        let column_refs: Vec<&str> = column_oids.iter().map(String::as_str).collect();
        let columns = session.get_multiple(&column_refs).await.unwrap_or_default();

        let lookup = |column: &str, index: &str| -> Option<String> {
            columns
                .get(&format!("{column}.{index}"))
                .cloned()
                .flatten()
                .filter(|v| !v.is_empty())
        };

        for (index, description) in indexed {
            let reading = SupplyReading {
                description: description.clone(),
                level: lookup(oids::MARKER_SUPPLIES_LEVEL, &index)
                    .and_then(|v| v.parse::<i64>().ok()),
                max: lookup(oids::MARKER_SUPPLIES_MAX, &index)
                    .and_then(|v| v.parse::<i64>().ok()),
                type_code: lookup(oids::MARKER_SUPPLIES_TYPE, &index),
                part: lookup(oids::MARKER_SUPPLIES_MODEL, &index),
                state: lookup(oids::MARKER_SUPPLIES_STATE, &index),
            };

            let key = canonical_supply_key(&description)
                .unwrap_or_else(|| slugify(&description));
            data.supplies.entry(key).or_insert(reading);
        }
    }

    /// Steps 6–7: counters from the standard tree, with descending-value
    /// name assignment, the sentinel fallback, and vendor GET tuples.
    async fn collect_counters(
        &self,
        session: &SnmpSession,
        device: &DeviceInfo,
        profile: Option<&Profile>,
        data: &mut PrinterData,
    ) {
        let walked = match session.walk(oids::PAGE_COUNTERS_BASE).await {
            Ok(items) if !items.is_empty() => items,
            _ => session
                .walk(oids::PAGE_COUNTERS_FALLBACK)
                .await
                .unwrap_or_default(),
        };

        let mappings = profile.map(|p| &p.counter_mappings);
        for item in &walked {
            let Some(value) = parse_counter_value(&item.value) else {
                continue;
            };

            let semantic = mappings
                .and_then(|m| m.get(&item.oid).cloned())
                .or_else(|| rfc3805_counter_name(&item.oid).map(str::to_string));

            match semantic {
                Some(name) => {
                    data.counters.entry(name).or_insert(value);
                }
                None => {
                    let key = format!("pageCounters_{}", item.oid.replace('.', "_"));
                    data.counters.entry(key).or_insert(value);
                }
            }
        }

        // No mapped total: take the largest raw candidates as total/color.
        if !data.counters.contains_key("total_pages") {
            let mut candidates: Vec<(String, i64)> = data
                .counters
                .iter()
                .filter(|(k, _)| k.starts_with("pageCounters_"))
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            candidates.sort_by(|a, b| b.1.cmp(&a.1));

            for (name, (_, value)) in ["total_pages", "color_pages"].iter().zip(candidates) {
                data.counters.entry((*name).to_string()).or_insert(value);
            }
        }

        apply_sentinel_fallback(data, &self.config.suspicious_values);

        // Still nothing usable: brand-specific counter tuple.
        if !data.counters.contains_key("total_pages") {
            self.collect_vendor_counters(session, device.brand, data).await;
        }
    }

    async fn collect_vendor_counters(
        &self,
        session: &SnmpSession,
        brand: Brand,
        data: &mut PrinterData,
    ) {
        let tuple: &[&str] = match brand {
            Brand::Samsung => oids::SAMSUNG_COUNTER_OIDS,
            Brand::Hp => oids::HP_COUNTER_OIDS,
            Brand::Xerox => oids::XEROX_COUNTER_OIDS,
            _ => return,
        };

        let Ok(values) = session.get_multiple(tuple).await else {
            return;
        };

        let mut readings: Vec<(String, i64)> = values
            .iter()
            .filter_map(|(oid, value)| {
                value
                    .as_deref()
                    .and_then(parse_counter_value)
                    .filter(|v| !self.config.suspicious_values.contains(v))
                    .map(|v| (oid.clone(), v))
            })
            .collect();
        readings.sort_by(|a, b| b.1.cmp(&a.1));

        for (name, (oid, value)) in ["total_pages", "color_pages"].iter().zip(readings) {
            data.counters.entry((*name).to_string()).or_insert(value);
            tracing::debug!(ip = %data.ip, oid, value, name, "vendor counter assigned");
        }
    }

    /// Step 8: administrative info; uptime arrives as centiseconds or an
    /// already-localized string.
    async fn collect_admin(&self, session: &SnmpSession, data: &mut PrinterData) {
        let oid_fields: &[(&str, &str)] = &[
            (oids::SYS_CONTACT, "contact"),
            (oids::SYS_LOCATION, "location"),
            (oids::SYS_UPTIME, "uptime"),
            (oids::SYS_SERVICES, "services"),
        ];
        let oid_list: Vec<&str> = oid_fields.iter().map(|(o, _)| *o).collect();

        let values = match session.get_multiple(&oid_list).await {
            Ok(values) => values,
            Err(e) => {
                data.errors.push(format!("admin_error: {e}"));
                return;
            }
        };

        for (oid, field) in oid_fields {
            let Some(Some(value)) = values.get(*oid) else {
                continue;
            };
            let clean = sanitize_value(value);
            if clean.is_empty() {
                continue;
            }

            if *field == "uptime" {
                if let Some(seconds) = parse_uptime_seconds(&clean) {
                    data.admin_info
                        .insert("uptime_seconds".to_string(), seconds.to_string());
                }
                data.admin_info.insert("uptime".to_string(), clean);
            } else {
                data.admin_info.insert((*field).to_string(), clean);
            }
        }
    }

    /// Tray levels from the input and output tray tables.
    async fn collect_trays(&self, session: &SnmpSession, data: &mut PrinterData) {
        for (prefix, base) in [("input", oids::INPUT_TRAY_BASE), ("output", oids::OUTPUT_TRAY_BASE)]
        {
            let Ok(items) = session.walk(base).await else {
                continue;
            };
            for item in items {
                if item.value.is_empty() || item.value == "0" {
                    continue;
                }
                let suffix: Vec<&str> = item.oid.rsplit('.').take(2).collect();
                if suffix.len() == 2 {
                    let key = format!("{prefix}_{}.{}", suffix[1], suffix[0]);
                    data.trays.insert(key, item.value);
                }
            }
        }
    }

    /// Step 9: exhaustive sweep over standard and vendor trees. New
    /// OID/value pairs are bucketed by key substring; existing keys are
    /// never shadowed.
    async fn discovery_sweep(&self, session: &SnmpSession, data: &mut PrinterData) {
        for (prefix, base) in oids::DISCOVERY_SWEEP_TREES {
            let Ok(items) = session.walk(base).await else {
                continue;
            };

            for item in items {
                if item.value.is_empty() || item.value == "0" || item.value.starts_with('-') {
                    continue;
                }

                let key = format!("{prefix}_{}", item.oid.replace('.', "_"));
                if data.has_key(&key) {
                    continue;
                }

                bucket_discovered(data, key, item.value);
            }
        }
    }
}

/// Route a swept key/value pair into the section its key suggests.
fn bucket_discovered(data: &mut PrinterData, key: String, value: String) {
    let lower = key.to_lowercase();

    if lower.contains("counter") || lower.contains("page") || lower.contains("count") {
        if counter_like(&value)
            && let Some(parsed) = parse_counter_value(&value)
        {
            data.counters.insert(key, parsed);
        }
    } else if lower.contains("status") || lower.contains("error") {
        data.status.insert(key, value);
    } else if lower.contains("supply")
        || lower.contains("consumable")
        || lower.contains("toner")
        || lower.contains("drum")
    {
        data.supplies_raw.insert(key, value);
    } else if lower.contains("tray") || lower.contains("input") || lower.contains("output") {
        data.trays.insert(key, value);
    } else if lower.contains("ip") || lower.contains("mac") || lower.contains("network") {
        data.network_info.insert(key, value);
    } else {
        data.identification.insert(key, value);
    }
}

/// Sentinel fallback: a missing or implausible total yields to the
/// lifetime page count captured with status. A sentinel with no fallback
/// available is dropped rather than shipped.
fn apply_sentinel_fallback(data: &mut PrinterData, suspicious: &[i64]) {
    let total_unusable = match data.counters.get("total_pages") {
        Some(v) => suspicious.contains(v),
        None => true,
    };
    if !total_unusable {
        return;
    }

    if let Some(page_count) = data
        .status
        .get("page_count")
        .and_then(|v| v.parse::<i64>().ok())
    {
        data.counters.insert("total_pages".to_string(), page_count);
    } else if let Some(total) = data.counters.get("total_pages").copied() {
        tracing::debug!(ip = %data.ip, total, "dropping sentinel total page count");
        data.counters.remove("total_pages");
    }
}

/// Step 10: some vendors expose page counters under their supply trees;
/// promote the known ones into the counters bucket.
fn rescue_page_counters(data: &mut PrinterData) {
    let rescues = oids::XEROX_COUNTER_RESCUE
        .iter()
        .map(|(oid, name)| (format!("xeroxSupplies_{}", oid.replace('.', "_")), *name))
        .chain(
            oids::SAMSUNG_COUNTER_RESCUE
                .iter()
                .map(|(oid, name)| (format!("samsungSupplies_{}", oid.replace('.', "_")), *name)),
        );

    for (key, name) in rescues {
        if let Some(value) = data.supplies_raw.get(&key)
            && let Some(parsed) = parse_counter_value(value)
        {
            data.counters.insert(name.to_string(), parsed);
        }
    }
}

/// Demote "offline" to "unknown" when the same poll produced supplies or
/// counters: the device answered, so the status read was a network flap.
fn apply_status_consistency_override(data: &mut PrinterData) {
    let has_data = !data.counters.is_empty() || !data.supplies.is_empty();
    if has_data
        && let Some(state) = data.status.get_mut("state")
        && *state == "offline"
    {
        *state = "unknown".to_string();
    }
}

/// Step 11: percentage and status-band normalization.
fn normalize(data: &mut PrinterData, suspicious: &[i64]) {
    for (key, reading) in &data.supplies {
        let level = reading.level.unwrap_or(0) as f64;
        let max = reading.max.unwrap_or(0) as f64;
        let percentage = if max > 0.0 { level * 100.0 / max } else { 0.0 };

        data.normalized_supplies.insert(
            key.clone(),
            NormalizedSupply {
                description: reading.description.clone(),
                level,
                max,
                percentage,
                status: supply_band(percentage).to_string(),
            },
        );
    }

    for name in [
        "total_pages",
        "mono_pages",
        "color_pages",
        "scan_pages",
        "copy_pages",
        "fax_pages",
    ] {
        if let Some(value) = data.counters.get(name) {
            data.normalized_counters.insert(name.to_string(), *value);
        }
    }

    // Raw leaves with the canonical per-function suffixes.
    for (key, value) in &data.counters {
        let Some(rest) = key.strip_prefix("pageCounters_") else {
            continue;
        };
        let name = match rest {
            r if r.ends_with("_4_1_1") => "total_pages",
            r if r.ends_with("_4_1_2") => "mono_pages",
            r if r.ends_with("_4_1_3") => "color_pages",
            r if r.ends_with("_4_1_4") => "scan_pages",
            r if r.ends_with("_4_1_5") => "copy_pages",
            r if r.ends_with("_4_1_6") => "fax_pages",
            _ => continue,
        };
        data.normalized_counters.entry(name.to_string()).or_insert(*value);
    }

    // Vendor keys that hint at their function.
    for (key, value) in &data.counters {
        let lower = key.to_lowercase();
        if !lower.contains("counters_") {
            continue;
        }
        let name = if lower.contains("color") {
            "color_pages"
        } else if lower.contains("mono") || lower.contains("black") || lower.contains("bw") {
            "mono_pages"
        } else {
            continue;
        };
        data.normalized_counters.entry(name.to_string()).or_insert(*value);
    }

    // A sentinel that slipped through without a fallback never ships.
    if let Some(total) = data.normalized_counters.get("total_pages").copied()
        && suspicious.contains(&total)
    {
        data.normalized_counters.remove("total_pages");
    }
}

/// Step 12: note the canonical sections that stayed empty.
fn record_missing_sections(data: &mut PrinterData) {
    if data.status.is_empty() {
        data.missing_sections.push("status".to_string());
    }
    if data.supplies.is_empty() && data.supplies_raw.is_empty() {
        data.missing_sections.push("supplies".to_string());
    }
    if data.counters.is_empty() {
        data.missing_sections.push("counters".to_string());
    }
    if data.identification.is_empty() {
        data.missing_sections.push("identification".to_string());
    }
}

/// hrDeviceStatus decode.
fn decode_device_status(raw: &str) -> String {
    match raw {
        "1" => "other",
        "2" => "idle",
        "3" => "ready",
        "4" => "printing",
        "5" => "error",
        "6" => "offline",
        other => other,
    }
    .to_string()
}

/// Parse a counter leaf. Zero, negatives, and values above the plausible
/// ceiling are rejected outright.
fn parse_counter_value(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<i64>().ok()?;
    (value > 0 && value <= oids::MAX_PLAUSIBLE_COUNTER).then_some(value)
}

fn rfc3805_counter_name(oid: &str) -> Option<&'static str> {
    oids::RFC3805_COUNTER_MAP
        .iter()
        .find(|(leaf, _)| *leaf == oid)
        .map(|(_, name)| *name)
}

/// Sweep values only count as counters when they look like page tallies.
fn counter_like(value: &str) -> bool {
    static COUNTER_RE: OnceLock<Regex> = OnceLock::new();
    let re = COUNTER_RE.get_or_init(|| Regex::new(r"^\d{3,}$").expect("static regex"));
    re.is_match(value.trim())
}

/// Scrub NUL padding and garbage markers; decode double-hex-encoded text.
fn sanitize_value(value: &str) -> String {
    let trimmed = value.trim_end_matches('\0').trim();
    if trimmed.contains('\u{FFFD}') {
        return String::new();
    }
    if trimmed.len() >= 8
        && let Some(decoded) = decode_hex_ascii(trimmed)
    {
        return decoded.trim().to_string();
    }
    trimmed.to_string()
}

/// Parse the HP device ID string: semicolon-separated `KEY:VALUE` tokens.
fn parse_hp_device_id(id: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for token in id.split(';') {
        let Some((key, value)) = token.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let field = match key.trim().to_uppercase().as_str() {
            "MDL" => "model",
            "SN" => "serial_number",
            "DES" => "designation",
            "MFG" => "manufacturer",
            _ => continue,
        };
        fields.insert(field.to_string(), value.to_string());
    }

    fields
}

/// Map a supply description to its canonical key. HP labels toner
/// cartridges as "ink" on some models; both land on toner.
fn canonical_supply_key(description: &str) -> Option<String> {
    let desc = description.to_lowercase();

    for color in ["black", "cyan", "magenta", "yellow"] {
        if !desc.contains(color) {
            continue;
        }
        if desc.contains("toner") || desc.contains("ink") || desc.contains("cartridge") {
            return Some(format!("toner_{color}"));
        }
        if desc.contains("drum") {
            return Some(format!("drum_{color}"));
        }
    }

    if desc.contains("fuser") {
        return Some("fuser".to_string());
    }
    if desc.contains("transfer roller") {
        return Some("transfer_roller".to_string());
    }
    if desc.contains("waste") {
        return Some("waste_toner".to_string());
    }
    if desc.contains("drum") {
        return Some("drum".to_string());
    }

    None
}

/// Lowercase, non-alphanumerics to underscores, collapsed.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_underscore = true;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_underscore = false;
        } else if !last_underscore {
            slug.push('_');
            last_underscore = true;
        }
    }
    slug.trim_end_matches('_').to_string()
}

/// Uptime seconds from raw centiseconds or a localized uptime string
/// ("41 días, 17 horas, 30 minutos" / "3 days, 2 hours, ...").
fn parse_uptime_seconds(value: &str) -> Option<i64> {
    let value = value.trim();

    if let Ok(ticks) = value.parse::<i64>() {
        return (ticks >= 0).then_some(ticks / 100);
    }

    let mut total: i64 = 0;
    let mut matched = false;
    for part in value.split(',') {
        let part = part.trim().to_lowercase();
        let number: i64 = part
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .ok()?;

        let scale = if part.contains("día") || part.contains("dia") || part.contains("day") {
            86_400
        } else if part.contains("hora") || part.contains("hour") {
            3_600
        } else if part.contains("minuto") || part.contains("minute") || part.contains("min") {
            60
        } else if part.contains("segundo") || part.contains("second") || part.contains("sec") {
            1
        } else {
            continue;
        };

        total += number * scale;
        matched = true;
    }

    (matched && total > 0).then_some(total)
}

/// Supply status band by remaining percentage.
fn supply_band(percentage: f64) -> &'static str {
    if percentage >= 75.0 {
        "ok"
    } else if percentage >= 50.0 {
        "good"
    } else if percentage >= 25.0 {
        "low"
    } else if percentage >= 10.0 {
        "critical"
    } else {
        "empty"
    }
}
