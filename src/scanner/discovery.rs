//! Parallel SNMP discovery scan.
//!
//! Fans out one probe task per address, bounded by a counting semaphore.
//! A probe validates the connection, fetches `sysDescr`, and best-effort
//! fetches `sysObjectID`. Addresses that fail or answer with an empty
//! descriptor are silently excluded from the responsive set.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::snmp::{SnmpSession, SnmpSessionConfig, SnmpVersion, oids};

/// Discovery scan parameters.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub retries: u32,
    pub community: String,
    pub version: SnmpVersion,
    pub port: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            timeout: Duration::from_secs(2),
            retries: 1,
            community: "public".to_string(),
            version: SnmpVersion::V2c,
            port: 161,
        }
    }
}

/// One responsive device found by the scan. Immutable after creation.
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    pub ip: Ipv4Addr,
    pub community: String,
    pub snmp_version: SnmpVersion,
    pub sys_descr: String,
    pub sys_object_id: String,
    pub is_responsive: bool,
    pub response_time: Duration,
    pub discovered_at: DateTime<Utc>,
    pub errors: Vec<String>,
}

/// Concurrency-bounded discovery scanner.
#[derive(Debug, Clone)]
pub struct DiscoveryScanner {
    config: DiscoveryConfig,
}

impl DiscoveryScanner {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Scan the given addresses and return only the responsive results.
    /// Unresponsive addresses produce no entry.
    pub async fn scan(&self, ips: &[Ipv4Addr]) -> Vec<DiscoveryResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        tracing::info!(total = ips.len(), "starting discovery scan");
        let started = std::time::Instant::now();

        for &ip in ips {
            let permits = Arc::clone(&semaphore);
            let config = self.config.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.expect("semaphore closed");
                probe_ip(ip, &config).await
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) if result.is_responsive => results.push(result),
                Ok(result) => {
                    tracing::debug!(ip = %result.ip, errors = ?result.errors, "unresponsive");
                }
                Err(e) => tracing::warn!(error = %e, "discovery task panicked"),
            }
        }

        tracing::info!(
            responsive = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "discovery scan complete"
        );

        results
    }
}

async fn probe_ip(ip: Ipv4Addr, config: &DiscoveryConfig) -> DiscoveryResult {
    let mut result = DiscoveryResult {
        ip,
        community: config.community.clone(),
        snmp_version: config.version,
        sys_descr: String::new(),
        sys_object_id: String::new(),
        is_responsive: false,
        response_time: Duration::ZERO,
        discovered_at: Utc::now(),
        errors: Vec::new(),
    };

    let started = std::time::Instant::now();

    let session = SnmpSession::new(SnmpSessionConfig {
        host: ip.to_string(),
        port: config.port,
        community: config.community.clone(),
        version: config.version,
        timeout: config.timeout,
        retries: config.retries,
    });

    if let Err(e) = session.validate_connection().await {
        result.errors.push(format!("validation_error: {e}"));
        return result;
    }

    let sys_descr = match session.get(oids::SYS_DESCR).await {
        Ok(Some(descr)) if !descr.is_empty() => descr,
        Ok(_) => {
            result.errors.push("sysdescr_empty".to_string());
            return result;
        }
        Err(e) => {
            result.errors.push(format!("sysdescr_error: {e}"));
            return result;
        }
    };
    result.sys_descr = sys_descr;

    // Best effort: many devices gate sysObjectID behind stricter views.
    if let Ok(Some(object_id)) = session.get(oids::SYS_OBJECT_ID).await {
        result.sys_object_id = object_id;
    }

    result.is_responsive = true;
    result.response_time = started.elapsed();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_empty_input_yields_nothing() {
        let scanner = DiscoveryScanner::new(DiscoveryConfig::default());
        let results = scanner.scan(&[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unresponsive_address_is_excluded() {
        // TEST-NET-3 address with an aggressive timeout: nothing answers.
        let scanner = DiscoveryScanner::new(DiscoveryConfig {
            timeout: Duration::from_millis(50),
            retries: 0,
            ..DiscoveryConfig::default()
        });
        let results = scanner.scan(&[Ipv4Addr::new(203, 0, 113, 254)]).await;
        assert!(results.is_empty());
    }
}
