//! Per-device SNMP session.
//!
//! A session value is cheap: it holds the target coordinates and opens a
//! fresh UDP association for every call, closing it on return. All network
//! waits are bounded by the configured timeout, retried up to the
//! configured retransmit count.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snmp2::{AsyncSession, Value};
use tokio::time::timeout;

use super::error::SnmpError;
use super::value::RawValue;
use super::{normalize_oid, parse_oid};

/// Upper bound on OIDs serviced per opened session in `get_multiple`.
/// Keeps one slow agent from stalling an unbounded batch and mirrors the
/// tooBig-avoidance limit of classic managers.
pub const MAX_OIDS_PER_BATCH: usize = 50;

/// Hard cap on getnext steps per walk; a broken agent that loops its MIB
/// view must not walk us forever.
const MAX_WALK_STEPS: usize = 4096;

/// SNMP protocol version. Only community-based versions are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SnmpVersion {
    #[serde(rename = "1")]
    V1,
    #[default]
    #[serde(rename = "2c")]
    V2c,
}

impl SnmpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2c => "2c",
        }
    }
}

impl std::fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SnmpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::V1),
            "2c" => Ok(Self::V2c),
            other => Err(format!("unsupported snmp version: {other}")),
        }
    }
}

/// Connection parameters for one device.
#[derive(Debug, Clone)]
pub struct SnmpSessionConfig {
    pub host: String,
    pub port: u16,
    pub community: String,
    pub version: SnmpVersion,
    pub timeout: Duration,
    pub retries: u32,
}

impl SnmpSessionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 161,
            community: "public".to_string(),
            version: SnmpVersion::V2c,
            timeout: Duration::from_secs(2),
            retries: 1,
        }
    }
}

/// One OID/value pair returned by a walk.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkItem {
    pub oid: String,
    pub value: String,
}

/// Handle for querying a single device.
#[derive(Debug, Clone)]
pub struct SnmpSession {
    config: SnmpSessionConfig,
    target: String,
}

impl SnmpSession {
    pub fn new(config: SnmpSessionConfig) -> Self {
        let target = format!("{}:{}", config.host, config.port);
        Self { config, target }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Open a fresh association to the target.
    async fn open(&self) -> Result<AsyncSession, SnmpError> {
        let community = self.config.community.as_bytes();
        let attempt = match self.config.version {
            SnmpVersion::V1 => {
                timeout(
                    self.config.timeout,
                    AsyncSession::new_v1(self.target.as_str(), community, 0),
                )
                .await
            }
            SnmpVersion::V2c => {
                timeout(
                    self.config.timeout,
                    AsyncSession::new_v2c(self.target.as_str(), community, 0),
                )
                .await
            }
        };

        match attempt {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => Err(SnmpError::Connect {
                target: self.target.clone(),
                detail: format!("{e}"),
            }),
            Err(_) => Err(SnmpError::Timeout {
                target: self.target.clone(),
                timeout: self.config.timeout,
            }),
        }
    }

    /// Check that an association can be opened at all.
    pub async fn validate_connection(&self) -> Result<(), SnmpError> {
        self.open().await.map(|_| ())
    }

    /// GET a single OID. `Ok(None)` means the agent reported the object as
    /// absent (noSuchObject / noSuchInstance).
    pub async fn get(&self, oid: &str) -> Result<Option<String>, SnmpError> {
        let mut session = self.open().await?;
        let raw = self.get_raw(&mut session, oid).await?;
        Ok(raw.map(|r| r.coerce()))
    }

    /// GET a batch of OIDs, merged into one OID → value mapping.
    ///
    /// Requests are serviced in windows of [`MAX_OIDS_PER_BATCH`]. Per-OID
    /// protocol failures become null entries; only transport failures abort
    /// the batch.
    pub async fn get_multiple(
        &self,
        oids: &[&str],
    ) -> Result<HashMap<String, Option<String>>, SnmpError> {
        let mut values = HashMap::with_capacity(oids.len());
        if oids.is_empty() {
            return Ok(values);
        }

        for window in oids.chunks(MAX_OIDS_PER_BATCH) {
            let mut session = self.open().await?;
            for oid in window {
                let raw = match self.get_raw(&mut session, oid).await {
                    Ok(v) => v,
                    Err(e) if e.is_transport() => return Err(e),
                    Err(_) => None,
                };
                values.insert(normalize_oid(oid), raw.map(|r| r.coerce()));
            }
        }

        Ok(values)
    }

    /// WALK a sub-tree: repeated getnext until the returned OID leaves the
    /// requested prefix. Values are already coerced; useless leaves are the
    /// caller's concern.
    pub async fn walk(&self, base: &str) -> Result<Vec<WalkItem>, SnmpError> {
        let base_norm = normalize_oid(base);
        let mut session = self.open().await?;
        let mut results = Vec::new();
        let mut current = base_norm.clone();

        for _ in 0..MAX_WALK_STEPS {
            let oid = parse_oid(&current)?;
            let pdu = match timeout(self.config.timeout, session.getnext(&oid)).await {
                Ok(Ok(pdu)) => pdu,
                Ok(Err(e)) => {
                    return Err(SnmpError::Protocol {
                        target: self.target.clone(),
                        detail: format!("{e}"),
                    });
                }
                Err(_) => {
                    return Err(SnmpError::Timeout {
                        target: self.target.clone(),
                        timeout: self.config.timeout,
                    });
                }
            };

            let mut advanced = false;
            let mut done = false;
            for (next_oid, value) in pdu.varbinds {
                let oid_norm = normalize_oid(&next_oid.to_string());
                if oid_norm == current || !in_subtree(&base_norm, &oid_norm) {
                    done = true;
                    break;
                }
                if matches!(value, Value::EndOfMibView) {
                    done = true;
                    break;
                }
                if let Some(raw) = RawValue::from_snmp(&value) {
                    results.push(WalkItem {
                        oid: oid_norm.clone(),
                        value: raw.coerce(),
                    });
                }
                current = oid_norm;
                advanced = true;
            }

            if done || !advanced {
                break;
            }
        }

        Ok(results)
    }

    /// One GET round-trip on an open association, with retransmits.
    async fn get_raw(
        &self,
        session: &mut AsyncSession,
        oid_str: &str,
    ) -> Result<Option<RawValue>, SnmpError> {
        let oid = parse_oid(oid_str)?;
        let mut last_err = SnmpError::Timeout {
            target: self.target.clone(),
            timeout: self.config.timeout,
        };

        for _ in 0..=self.config.retries {
            match timeout(self.config.timeout, session.get(&oid)).await {
                Ok(Ok(pdu)) => {
                    let mut varbinds = pdu.varbinds.into_iter();
                    return match varbinds.next() {
                        Some((_, value)) => Ok(RawValue::from_snmp(&value)),
                        None => Err(SnmpError::EmptyResponse {
                            target: self.target.clone(),
                        }),
                    };
                }
                Ok(Err(e)) => {
                    last_err = SnmpError::Protocol {
                        target: self.target.clone(),
                        detail: format!("{e}"),
                    };
                }
                Err(_) => {
                    last_err = SnmpError::Timeout {
                        target: self.target.clone(),
                        timeout: self.config.timeout,
                    };
                }
            }
        }

        Err(last_err)
    }
}

fn in_subtree(base: &str, oid: &str) -> bool {
    oid == base || oid.starts_with(base) && oid.as_bytes().get(base.len()) == Some(&b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_round_trip() {
        assert_eq!("1".parse::<SnmpVersion>().unwrap(), SnmpVersion::V1);
        assert_eq!("2c".parse::<SnmpVersion>().unwrap(), SnmpVersion::V2c);
        assert!("3".parse::<SnmpVersion>().is_err());
        assert_eq!(SnmpVersion::V2c.as_str(), "2c");
    }

    #[test]
    fn test_in_subtree() {
        assert!(in_subtree("1.3.6.1.2.1.43", "1.3.6.1.2.1.43.11.1.1.6.1.1"));
        assert!(in_subtree("1.3.6.1.2.1.43", "1.3.6.1.2.1.43"));
        // Sibling with a shared digit prefix is outside the tree.
        assert!(!in_subtree("1.3.6.1.2.1.43", "1.3.6.1.2.1.431"));
        assert!(!in_subtree("1.3.6.1.2.1.43", "1.3.6.1.2.1.44.1"));
    }

    #[test]
    fn test_session_target() {
        let session = SnmpSession::new(SnmpSessionConfig::new("10.0.0.5"));
        assert_eq!(session.host(), "10.0.0.5");
        assert_eq!(session.target, "10.0.0.5:161");
    }

    #[tokio::test]
    async fn test_get_multiple_empty_input() {
        let session = SnmpSession::new(SnmpSessionConfig::new("203.0.113.1"));
        let values = session.get_multiple(&[]).await.unwrap();
        assert!(values.is_empty());
    }
}
