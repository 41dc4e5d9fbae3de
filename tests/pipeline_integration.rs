//! End-to-end tests for the offline pipeline: collected printer data
//! through counter state, event building, serialization, and the file
//! queue, asserting on the parsed JSON documents.

use std::sync::Arc;

use printmon::collector::{CountersInfo, DeviceInfo, PrinterData, StateStore, SupplyReading};
use printmon::profile::{Capabilities, Profile, ProfileStore};
use printmon::scanner::Brand;
use printmon::sink::{FileSink, Sink};
use printmon::snmp::SnmpVersion;
use printmon::telemetry::{AgentSource, TelemetryBuilder, serialize};
use tempfile::TempDir;

fn agent_source() -> AgentSource {
    AgentSource {
        agent_id: "AGT-TEST-001".to_string(),
        hostname: "test-host".to_string(),
        os: "linux".to_string(),
        version: "0.1.0".to_string(),
    }
}

fn hp_device() -> DeviceInfo {
    DeviceInfo {
        ip: "10.0.0.5".to_string(),
        brand: Brand::Hp,
        brand_confidence: 0.98,
        sys_descr: "HP LaserJet Pro M402".to_string(),
        community: "public".to_string(),
        snmp_version: SnmpVersion::V2c,
    }
}

/// Printer data as the collector would leave it after polling a healthy
/// single-toner HP device.
fn hp_printer_data(total_pages: i64) -> PrinterData {
    let mut data = PrinterData::new(&hp_device());
    data.identification
        .insert("description".to_string(), "HP LaserJet Pro M402".to_string());
    data.identification
        .insert("model".to_string(), "HP LaserJet Pro M402".to_string());
    data.status.insert("state".to_string(), "ready".to_string());
    data.supplies.insert(
        "toner_black".to_string(),
        SupplyReading {
            description: "Black Toner".to_string(),
            level: Some(50),
            max: Some(100),
            ..SupplyReading::default()
        },
    );
    data.counters.insert("total_pages".to_string(), total_pages);
    data.normalized_counters
        .insert("total_pages".to_string(), total_pages);
    data
}

fn current_counters(data: &PrinterData) -> CountersInfo {
    CountersInfo {
        total_pages: data.normalized_counters["total_pages"],
        ..CountersInfo::default()
    }
}

async fn run_poll(
    states: &StateStore,
    queue: &FileSink,
    data: &PrinterData,
) -> serde_json::Value {
    let current = current_counters(data);
    let (delta, reset) = states.calculate_delta(&data.ip, &current);

    let builder = TelemetryBuilder::new(agent_source());
    let event = builder.build(data, delta, reset);
    let payload = serialize(&event).unwrap();

    states.save(&data.ip, current).unwrap();
    queue.write(&payload, &event.printer.id).await.unwrap();

    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn test_first_poll_emits_full_event_without_delta() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    let json = run_poll(&states, &queue, &hp_printer_data(12345)).await;

    assert_eq!(json["schema_version"], "1.0.0");
    assert_eq!(json["printer"]["brand"], "HP");
    assert_eq!(json["printer"]["ip"], "10.0.0.5");
    assert!(json["printer"]["brand_confidence"].as_f64().unwrap() > 0.9);

    assert_eq!(json["counters"]["absolute"]["total_pages"], 12345);
    assert!(json["counters"]["delta"].is_null());
    assert_eq!(json["counters"]["reset_detected"], false);

    let supplies = json["supplies"].as_array().unwrap();
    assert_eq!(supplies.len(), 1);
    assert_eq!(supplies[0]["id"], "toner_black");
    assert_eq!(supplies[0]["percentage"], 50);
    assert_eq!(supplies[0]["status"], "ok");

    // One queue file, named {epoch}_{printer_id}.json.
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("queue"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with("_10.0.0.5.json"));
}

#[tokio::test]
async fn test_second_poll_carries_delta() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    run_poll(&states, &queue, &hp_printer_data(12000)).await;
    let json = run_poll(&states, &queue, &hp_printer_data(12345)).await;

    assert_eq!(json["counters"]["absolute"]["total_pages"], 12345);
    assert_eq!(json["counters"]["delta"]["total_pages"], 345);
    assert_eq!(json["counters"]["reset_detected"], false);
}

#[tokio::test]
async fn test_counter_reset_is_detected_and_rebaselined() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    run_poll(&states, &queue, &hp_printer_data(50000)).await;
    let reset_json = run_poll(&states, &queue, &hp_printer_data(200)).await;

    assert!(reset_json["counters"]["delta"].is_null());
    assert_eq!(reset_json["counters"]["reset_detected"], true);

    // The state file now holds the new baseline.
    let state = states.load("10.0.0.5").unwrap();
    assert_eq!(state.counters.total_pages, 200);

    // A subsequent poll resumes diffing from the baseline.
    let next_json = run_poll(&states, &queue, &hp_printer_data(260)).await;
    assert_eq!(next_json["counters"]["delta"]["total_pages"], 60);
    assert_eq!(next_json["counters"]["reset_detected"], false);
}

#[tokio::test]
async fn test_identity_uses_mac_when_present() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    let mut data = hp_printer_data(100);
    data.network_info
        .insert("mac_address".to_string(), "30:CD:A7:C7:22:68".to_string());

    let json = run_poll(&states, &queue, &data).await;
    assert_eq!(json["printer"]["id"], "30cda7c72268");
    let event_id = json["event_id"].as_str().unwrap();
    assert!(event_id.starts_with("AGT-TEST-001::30cda7c72268::"));

    // Identity is stable across polls.
    let again = run_poll(&states, &queue, &data).await;
    assert_eq!(again["printer"]["id"], "30cda7c72268");
}

#[tokio::test]
async fn test_low_supply_produces_warning_alert() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    let mut data = hp_printer_data(100);
    data.supplies.insert(
        "toner_cyan".to_string(),
        SupplyReading {
            description: "Cyan Toner".to_string(),
            level: Some(15),
            max: Some(100),
            ..SupplyReading::default()
        },
    );

    let json = run_poll(&states, &queue, &data).await;
    let alerts = json["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["id"], "toner_low");
    assert_eq!(alerts[0]["severity"], "warning");
    assert!(
        alerts[0]["message"]
            .as_str()
            .unwrap()
            .contains("Cyan Toner is low (15%)")
    );
}

#[tokio::test]
async fn test_event_without_supplies_serializes_nulls() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    let mut data = hp_printer_data(100);
    data.supplies.clear();
    data.missing_sections.push("supplies".to_string());

    let json = run_poll(&states, &queue, &data).await;
    assert!(json["supplies"].is_null());
    assert!(json["alerts"].is_null());
    assert!(!json["supplies"].is_array());
}

#[tokio::test]
async fn test_next_poll_is_one_hour_out_in_utc() {
    let dir = TempDir::new().unwrap();
    let states = StateStore::new(dir.path().join("state")).unwrap();
    let queue = FileSink::new(dir.path().join("queue")).unwrap();

    let json = run_poll(&states, &queue, &hp_printer_data(100)).await;

    let collected: chrono::DateTime<chrono::Utc> =
        json["collected_at"].as_str().unwrap().parse().unwrap();
    let next: chrono::DateTime<chrono::Utc> = json["metrics"]["polling"]["next_poll_at"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(next - collected, chrono::Duration::hours(1));
}

#[test]
fn test_profile_round_trip_survives_restart() {
    let dir = TempDir::new().unwrap();
    let profile_dir = dir.path().join("profiles");

    let profile = Profile {
        printer_id: "10.0.0.5".to_string(),
        ip: "10.0.0.5".to_string(),
        brand: Brand::Samsung,
        model: "M332x".to_string(),
        oids: std::collections::HashMap::from([(
            "counters".to_string(),
            vec!["1.3.6.1.2.1.43.10.2.1.4.1.1".to_string()],
        )]),
        counter_mappings: std::collections::HashMap::from([(
            "1.3.6.1.2.1.43.10.2.1.4.1.1".to_string(),
            "total_pages".to_string(),
        )]),
        oid_metadata: std::collections::HashMap::new(),
        oid_friendly_names: std::collections::HashMap::new(),
        capabilities: Capabilities {
            counters: true,
            color: true,
            duplex: true,
            ..Capabilities::default()
        },
        discovered_at: chrono::Utc::now(),
        last_validated_at: chrono::Utc::now(),
        firmware_version: String::new(),
        snmp_version: "2c".to_string(),
        discovery_attempts: 1,
        last_error: None,
        error_count: 0,
        success_rate: 1.0,
    };

    {
        let store = ProfileStore::new(&profile_dir).unwrap();
        store.save(&profile).unwrap();
    }

    // A fresh store (fresh process) reads the identical record.
    let store = Arc::new(ProfileStore::new(&profile_dir).unwrap());
    let loaded = store.get_or_discover("10.0.0.5").unwrap();
    assert_eq!(loaded, profile);
    assert!(!store.needs_rediscovery("10.0.0.5"));
}
