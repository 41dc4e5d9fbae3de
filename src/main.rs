//! Printmon Binary Entry Point
//!
//! Runs one scan-and-collect cycle: expand the IP range, discover
//! responsive printers, collect and normalize their data, compute counter
//! deltas against the previous poll, and queue one telemetry event per
//! printer. Core functionality is provided by the `printmon` library
//! crate.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use printmon::collector::{
    CollectorConfig, CountersInfo, DataCollector, DeviceInfo, PrinterData, StateStore,
};
use printmon::config::AppConfig;
use printmon::profile::ProfileStore;
use printmon::report::ScanSummary;
use printmon::scanner::{self, DiscoveryConfig, DiscoveryScanner};
use printmon::sink::{FileSink, HttpSink, HttpSinkConfig, Sink};
use printmon::snmp::SnmpVersion;
use printmon::telemetry::{AgentSource, TelemetryBuilder, serialize};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Directory for per-printer counter state.
const STATE_DIR: &str = "./state";

/// Directory for per-printer profiles.
const PROFILE_DIR: &str = "./profiles";

/// Printmon - Printer Fleet Telemetry Agent
#[derive(Parser, Debug)]
#[command(name = "printmon", about, long_about = None)]
struct Cli {
    /// IP range to scan (e.g. 192.168.1.1-254 or a single address)
    #[arg(long)]
    range: Option<String>,

    /// SNMP community string
    #[arg(long)]
    community: Option<String>,

    /// SNMP protocol version (1 or 2c)
    #[arg(long = "version", value_name = "VERSION")]
    snmp_version: Option<SnmpVersion>,

    /// SNMP port
    #[arg(long)]
    port: Option<u16>,

    /// Per-request SNMP timeout (e.g. 2s, 500ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Maximum concurrent device connections
    #[arg(long)]
    concurrent: Option<usize>,

    /// Queue directory for emitted events (overrides config file)
    #[arg(long)]
    output: Option<String>,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, default_value = "config.yaml", env = "PRINTMON_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Argument errors exit 1, like every other startup failure.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(if e.use_stderr() { 1 } else { 0 });
    });

    // A missing config file falls back to defaults; a malformed one is
    // fatal.
    let mut config = if std::path::Path::new(&cli.config).exists() {
        AppConfig::load(&cli.config)?
    } else {
        AppConfig::default()
    };

    // CLI flags override file values.
    if let Some(range) = cli.range {
        config.discovery.ip_range = range;
    }
    if let Some(community) = cli.community {
        config.snmp.community = community;
    }
    if let Some(version) = cli.snmp_version {
        config.snmp.version = version;
    }
    if let Some(port) = cli.port {
        config.snmp.port = port;
    }
    if let Some(timeout) = cli.timeout {
        config.snmp.timeout_ms = timeout.as_millis() as u64;
    }
    if let Some(concurrent) = cli.concurrent {
        config.discovery.max_concurrent = concurrent;
    }
    if let Some(output) = cli.output {
        config.sinks.file.path = output;
    }
    if cli.verbose {
        config.logging.verbose = true;
    }
    config.validate()?;

    // Initialize tracing.
    let filter = if config.logging.verbose {
        "printmon=debug,info".to_string()
    } else {
        format!("printmon={},warn", config.logging.level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.discovery.ip_range.is_empty() {
        return Err("an IP range is required (--range or discovery.ip_range)".into());
    }
    if !config.discovery.enabled {
        return Err("discovery is disabled in the configuration".into());
    }

    let ips = scanner::parse_ip_range(&config.discovery.ip_range)?;

    // Cancellation: ctrl-c stops backoff waits and the per-device loop.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let started = std::time::Instant::now();

    // Phase 1: discovery.
    let discovery_scanner = DiscoveryScanner::new(DiscoveryConfig {
        max_concurrent: config.discovery.max_concurrent,
        timeout: config.snmp.timeout(),
        retries: config.snmp.retries,
        community: config.snmp.community.clone(),
        version: config.snmp.version,
        port: config.snmp.port,
    });
    let discoveries = discovery_scanner.scan(&ips).await;

    if discoveries.is_empty() {
        let summary = ScanSummary::new(ips.len(), &[], 0, started.elapsed());
        tracing::info!(%summary, "scan complete");
        println!("{summary}");
        return Ok(());
    }

    // Phase 2: brand detection.
    let devices: Vec<DeviceInfo> = discoveries
        .iter()
        .map(|discovery| {
            let brand = scanner::detect(&discovery.sys_descr);
            let confidence = scanner::confidence(&discovery.sys_descr, brand);
            tracing::debug!(
                ip = %discovery.ip,
                %brand,
                confidence,
                "brand detected"
            );
            DeviceInfo {
                ip: discovery.ip.to_string(),
                brand,
                brand_confidence: confidence,
                sys_descr: discovery.sys_descr.clone(),
                community: config.snmp.community.clone(),
                snmp_version: config.snmp.version,
            }
        })
        .collect();

    // Phase 3: collection.
    let printers = if config.collector.enabled {
        let profiles = Arc::new(ProfileStore::new(PROFILE_DIR)?);
        let collector = DataCollector::new(
            CollectorConfig {
                timeout: config.snmp.timeout(),
                retries: config.snmp.retries,
                max_concurrent: config.discovery.max_concurrent,
                port: config.snmp.port,
                delay_between_queries: Duration::from_millis(config.collector.delay_ms),
                suspicious_values: config.collector.suspicious_values.clone(),
            },
            profiles,
        );
        collector.collect_all(devices).await
    } else {
        tracing::warn!("collector disabled; no events will be emitted");
        Vec::new()
    };

    // Phase 4: delta, build, serialize, sink.
    let events_queued =
        emit_events(&config, &printers, &cancel).await?;

    let summary = ScanSummary::new(ips.len(), &printers, events_queued, started.elapsed());
    tracing::info!(%summary, "scan complete");
    println!("{summary}");

    Ok(())
}

/// Turn collected printer data into queued events. Returns how many were
/// delivered to the file queue.
async fn emit_events(
    config: &AppConfig,
    printers: &[PrinterData],
    cancel: &CancellationToken,
) -> Result<usize, Box<dyn std::error::Error>> {
    if printers.is_empty() {
        return Ok(0);
    }

    let builder = TelemetryBuilder::new(AgentSource::from_env());
    let states = StateStore::new(STATE_DIR)?;

    let file_sink = if config.sinks.file.enabled {
        Some(FileSink::new(&config.sinks.file.path)?)
    } else {
        None
    };
    let http_sink = if config.sinks.http.enabled {
        Some(HttpSink::new(
            HttpSinkConfig {
                endpoint: config.sinks.http.endpoint.clone(),
                auth_token: config.sinks.http.token.clone(),
                timeout: Duration::from_secs(10),
                max_retries: config.sinks.http.retries,
                initial_wait: Duration::from_secs(1),
            },
            cancel.clone(),
        )?)
    } else {
        None
    };

    let mut queued = 0;
    for printer in printers {
        if cancel.is_cancelled() {
            tracing::warn!("shutdown requested, leaving remaining printers for the next run");
            break;
        }

        // Delta against the previous poll, keyed by IP.
        let mut delta = None;
        let mut reset_detected = false;
        let has_counters =
            !printer.normalized_counters.is_empty() || !printer.counters.is_empty();
        let current = has_counters.then(|| current_counters(printer));

        if let Some(current) = &current {
            (delta, reset_detected) = states.calculate_delta(&printer.ip, current);
        }

        let event = builder.build(printer, delta, reset_detected);
        let payload = match serialize(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(ip = %printer.ip, error = %e, "failed to serialize event");
                continue;
            }
        };

        // State persists once the event exists, before sink delivery: a
        // crash here loses one event but never double-counts a delta.
        if let Some(current) = current {
            if let Err(e) = states.save(&printer.ip, current) {
                tracing::warn!(ip = %printer.ip, error = %e, "failed to save counter state");
            }
        }

        if let Some(sink) = &file_sink {
            match sink.write(&payload, &event.printer.id).await {
                Ok(()) => queued += 1,
                Err(e) => tracing::error!(ip = %printer.ip, error = %e, "file sink write failed"),
            }
        }
        if let Some(sink) = &http_sink {
            if let Err(e) = sink.write(&payload, &event.printer.id).await {
                tracing::error!(ip = %printer.ip, error = %e, "http sink write failed");
            }
        }
    }

    if let Some(sink) = &file_sink {
        sink.close().await?;
    }
    if let Some(sink) = &http_sink {
        sink.close().await?;
    }

    Ok(queued)
}

/// Current absolute counters from the normalized bucket (falling back to
/// the raw semantic keys).
fn current_counters(printer: &PrinterData) -> CountersInfo {
    let counters = if printer.normalized_counters.is_empty() {
        &printer.counters
    } else {
        &printer.normalized_counters
    };
    let get = |key: &str| counters.get(key).copied().unwrap_or(0);

    CountersInfo {
        total_pages: get("total_pages"),
        mono_pages: get("mono_pages"),
        color_pages: get("color_pages"),
        scan_pages: get("scan_pages"),
        copy_pages: get("copy_pages"),
        fax_pages: get("fax_pages"),
    }
}
