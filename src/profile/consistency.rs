//! Multi-poll consistency probing for ambiguous OIDs.
//!
//! Vendor trees are full of leaves that look numeric but are really
//! timers, noise, or garbage. Polling a candidate a few times 100 ms apart
//! separates stable gauges and monotone counters from the rest.

use std::time::Duration;

use tokio::time::sleep;

use crate::snmp::{SnmpError, SnmpSession};

const DEFAULT_ATTEMPTS: usize = 3;
const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_TOLERANCE: f64 = 0.10;

/// Result of a consistency probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub mean: f64,
    pub last_value: f64,
    pub samples: usize,
}

/// Polls a candidate OID repeatedly and judges the value stream.
#[derive(Debug)]
pub struct ConsistencyChecker<'a> {
    session: &'a SnmpSession,
    attempts: usize,
    interval: Duration,
    tolerance: f64,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(session: &'a SnmpSession) -> Self {
        Self {
            session,
            attempts: DEFAULT_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Probe one OID. Requires at least two parseable samples.
    pub async fn check(&self, oid: &str) -> Result<ConsistencyReport, SnmpError> {
        let values = self.sample(oid).await;

        if values.len() < 2 {
            return Err(SnmpError::Protocol {
                target: self.session.host().to_string(),
                detail: format!("insufficient successful polls for {oid}: {}", values.len()),
            });
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let consistent = values_consistent(&values, mean, self.tolerance);

        Ok(ConsistencyReport {
            consistent,
            mean,
            last_value: *values.last().unwrap_or(&0.0),
            samples: values.len(),
        })
    }

    /// True when the samples never decrease, the signature of a counter.
    pub async fn is_counter_oid(&self, oid: &str) -> bool {
        let values = self.sample(oid).await;
        values.len() >= 2 && values.windows(2).all(|w| w[1] >= w[0])
    }

    /// True when every sample lands in the 0–100 band of a supply gauge.
    pub async fn is_supply_oid(&self, oid: &str) -> bool {
        let values = self.sample(oid).await;
        !values.is_empty() && values.iter().all(|&v| (0.0..=100.0).contains(&v))
    }

    async fn sample(&self, oid: &str) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.attempts);

        for attempt in 0..self.attempts {
            if attempt > 0 {
                sleep(self.interval).await;
            }
            if let Ok(Some(value)) = self.session.get(oid).await
                && let Ok(parsed) = value.trim().parse::<f64>()
            {
                values.push(parsed);
            }
        }

        values
    }
}

fn values_consistent(values: &[f64], mean: f64, tolerance: f64) -> bool {
    if mean == 0.0 {
        // Near-zero streams: any sample clearly above zero is inconsistent.
        return values.iter().all(|&v| v <= 0.5);
    }

    values.iter().all(|&v| ((v - mean) / mean).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_values_are_consistent() {
        let values = [100.0, 100.0, 101.0];
        let mean = values.iter().sum::<f64>() / 3.0;
        assert!(values_consistent(&values, mean, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_noisy_values_are_inconsistent() {
        let values = [100.0, 10.0, 250.0];
        let mean = values.iter().sum::<f64>() / 3.0;
        assert!(!values_consistent(&values, mean, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_zero_mean_tolerates_only_near_zero() {
        assert!(values_consistent(&[0.0, 0.0, 0.0], 0.0, DEFAULT_TOLERANCE));
        assert!(!values_consistent(&[0.0, 3.0, -3.0], 0.0, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_ten_percent_boundary() {
        // Mean 100: a 110 sample sits exactly on the tolerance edge.
        assert!(values_consistent(&[100.0, 110.0, 90.0], 100.0, 0.10));
        assert!(!values_consistent(&[100.0, 120.0, 80.0], 100.0, 0.10));
    }
}
