//! SNMP error taxonomy.
//!
//! Transport failures (socket, timeout) and protocol failures (SNMP error
//! status, empty PDU) are distinct variants so callers can decide whether a
//! device is unreachable or merely uncooperative.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the SNMP session layer.
#[derive(Debug, Error)]
pub enum SnmpError {
    /// OID string could not be parsed into dotted-decimal components.
    #[error("invalid oid: {oid}")]
    InvalidOid { oid: String },

    /// Failed to open a UDP session to the target.
    #[error("failed to connect to {target}: {detail}")]
    Connect { target: String, detail: String },

    /// The request did not complete within the configured deadline.
    #[error("request to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    /// The agent answered with an SNMP-level error or an undecodable PDU.
    #[error("snmp protocol error from {target}: {detail}")]
    Protocol { target: String, detail: String },

    /// The agent answered with a PDU carrying no varbinds.
    #[error("empty response from {target}")]
    EmptyResponse { target: String },
}

impl SnmpError {
    /// True for failures of the transport itself (socket create, connect,
    /// timeout); false for SNMP-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let timeout = SnmpError::Timeout {
            target: "10.0.0.5:161".to_string(),
            timeout: Duration::from_secs(2),
        };
        assert!(timeout.is_transport());

        let protocol = SnmpError::Protocol {
            target: "10.0.0.5:161".to_string(),
            detail: "tooBig".to_string(),
        };
        assert!(!protocol.is_transport());
    }
}
