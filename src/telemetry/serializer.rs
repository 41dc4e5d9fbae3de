//! Event serialization.

use thiserror::Error;

use super::models::Telemetry;

/// Errors from event building or serialization.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to serialize telemetry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("event has no printer identity")]
    MissingIdentity,
}

/// Encode an event as its canonical JSON octet stream: two-space indent,
/// `&` kept literal, no trailing newline.
pub fn serialize(event: &Telemetry) -> Result<Vec<u8>, TelemetryError> {
    let data = serde_json::to_vec_pretty(event)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::scanner::Brand;
    use crate::telemetry::models::{
        AgentSource, MetricsInfo, PollingMetrics, PrinterInfo, SCHEMA_VERSION,
    };

    use super::*;

    fn sample_event() -> Telemetry {
        Telemetry {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: "AGT-LOCAL-001::10.0.0.5::1700000000".to_string(),
            collected_at: Utc::now(),
            source: AgentSource {
                agent_id: "AGT-LOCAL-001".to_string(),
                hostname: "srv-print-01".to_string(),
                os: "linux".to_string(),
                version: "0.1.0".to_string(),
            },
            printer: PrinterInfo {
                id: "10.0.0.5".to_string(),
                ip: "10.0.0.5".to_string(),
                brand: Brand::Hp,
                brand_confidence: 0.98,
                model: Some("M&M LaserJet".to_string()),
                serial_number: None,
                hostname: None,
                mac_address: None,
            },
            counters: None,
            supplies: None,
            alerts: None,
            metrics: MetricsInfo {
                polling: PollingMetrics {
                    response_time_ms: 100,
                    poll_duration_ms: 100,
                    oid_success_rate: 0.95,
                    retry_count: 0,
                    last_poll_at: Utc::now(),
                    next_poll_at: Utc::now(),
                    error_count: 0,
                },
            },
        }
    }

    #[test]
    fn test_two_space_indent() {
        let bytes = serialize(&sample_event()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"schema_version\""));
    }

    #[test]
    fn test_ampersand_stays_literal() {
        let bytes = serialize(&sample_event()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("M&M LaserJet"));
        assert!(!text.contains("\\u0026"));
    }

    #[test]
    fn test_no_trailing_newline() {
        let bytes = serialize(&sample_event()).unwrap();
        assert_eq!(*bytes.last().unwrap(), b'}');
    }

    #[test]
    fn test_round_trips() {
        let bytes = serialize(&sample_event()).unwrap();
        let back: Telemetry = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
    }
}
