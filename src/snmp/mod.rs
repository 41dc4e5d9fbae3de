//! SNMP access layer: per-device sessions, value coercion, OID catalog.
//!
//! Every query opens a fresh UDP session to the target and closes it on
//! return, so a misbehaving device can never pin a socket across polls.
//! Raw PDU values are coerced into canonical strings at this boundary;
//! everything above works over one shape.

pub mod error;
pub mod oids;
pub mod session;
pub mod value;

pub use error::SnmpError;
pub use session::{SnmpSession, SnmpSessionConfig, SnmpVersion, WalkItem};
pub use value::RawValue;

use snmp2::Oid;

use error::SnmpError as Error;

/// Parse a dotted-decimal OID string into an `snmp2::Oid`.
///
/// Accepts both the canonical form (`1.3.6.1...`) and the leading-dot
/// form (`.1.3.6.1...`).
pub fn parse_oid(s: &str) -> Result<Oid<'static>, Error> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.map_err(|_| Error::InvalidOid { oid: s.to_string() })?;
    if parts.is_empty() {
        return Err(Error::InvalidOid { oid: s.to_string() });
    }

    Oid::from(&parts).map_err(|_| Error::InvalidOid { oid: s.to_string() })
}

/// Normalize an OID string to the no-leading-dot canonical form.
pub fn normalize_oid(s: &str) -> String {
    s.trim().trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oid_plain() {
        assert!(parse_oid("1.3.6.1.2.1.1.1.0").is_ok());
    }

    #[test]
    fn test_parse_oid_leading_dot() {
        assert!(parse_oid(".1.3.6.1.2.1.1.1.0").is_ok());
    }

    #[test]
    fn test_parse_oid_invalid() {
        assert!(parse_oid("not.an.oid").is_err());
        assert!(parse_oid("").is_err());
    }

    #[test]
    fn test_normalize_oid() {
        assert_eq!(normalize_oid(".1.3.6.1"), "1.3.6.1");
        assert_eq!(normalize_oid("1.3.6.1"), "1.3.6.1");
        assert_eq!(normalize_oid("  .1.3.6.1  "), "1.3.6.1");
    }
}
