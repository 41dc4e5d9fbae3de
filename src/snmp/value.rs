//! Raw SNMP value modeling and coercion.
//!
//! Devices answer with a union of integer widths, printable strings, and
//! opaque octet blobs. The session boundary collapses all of it into a
//! canonical string form so downstream code never matches on wire types.

use snmp2::Value;

/// A raw PDU value captured at the session boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Null,
}

impl RawValue {
    /// Capture an `snmp2::Value` into an owned raw value.
    ///
    /// Returns `None` for the per-OID "missing" markers (noSuchObject,
    /// noSuchInstance, endOfMibView) so batch callers can map them to null
    /// entries instead of errors.
    pub fn from_snmp(value: &Value<'_>) -> Option<RawValue> {
        match value {
            Value::Integer(i) => Some(RawValue::Int(*i)),
            Value::Counter32(v) => Some(RawValue::Int(i64::from(*v))),
            Value::Unsigned32(v) => Some(RawValue::Int(i64::from(*v))),
            Value::Timeticks(v) => Some(RawValue::Int(i64::from(*v))),
            Value::Counter64(v) => {
                if let Ok(i) = i64::try_from(*v) {
                    Some(RawValue::Int(i))
                } else {
                    Some(RawValue::Str(v.to_string()))
                }
            }
            Value::Boolean(b) => Some(RawValue::Int(i64::from(*b))),
            Value::OctetString(bytes) => Some(RawValue::Bytes(bytes.to_vec())),
            Value::ObjectIdentifier(oid) => Some(RawValue::Str(oid.to_string())),
            Value::IpAddress(octets) => Some(RawValue::Str(format!(
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            ))),
            Value::Null => Some(RawValue::Null),
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => None,
            _ => Some(RawValue::Null),
        }
    }

    /// Coerce to the canonical string form.
    ///
    /// - Integers render as decimal.
    /// - Strings are trimmed of trailing NULs; a replacement character
    ///   marks the whole value as garbage and yields empty.
    /// - Octet blobs: mostly-printable UTF-8 is returned as text; exactly
    ///   six non-text bytes format as a colon MAC; pure printable ASCII is
    ///   returned as text; anything else yields empty.
    pub fn coerce(&self) -> String {
        match self {
            RawValue::Int(i) => i.to_string(),
            RawValue::Str(s) => {
                let trimmed = s.trim_end_matches('\0');
                if trimmed.contains('\u{FFFD}') {
                    String::new()
                } else {
                    trimmed.to_string()
                }
            }
            RawValue::Bytes(bytes) => coerce_bytes(bytes),
            RawValue::Null => String::new(),
        }
    }
}

fn coerce_bytes(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        if printable_ratio(bytes) >= 0.8 {
            return text.trim_end_matches('\0').to_string();
        }
    }

    if bytes.len() == 6 {
        return bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":");
    }

    if is_printable_ascii(bytes) {
        return String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .to_string();
    }

    String::new()
}

/// Fraction of bytes that are printable ASCII or common whitespace.
fn printable_ratio(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let printable = bytes
        .iter()
        .filter(|&&c| (32..=126).contains(&c) || c == b'\t' || c == b'\n' || c == b'\r')
        .count();
    printable as f64 / bytes.len() as f64
}

fn is_printable_ascii(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&c| (32..=126).contains(&c) || c == b'\t' || c == b'\n' || c == b'\r')
}

/// Decode a hex-ASCII payload (e.g. `"4150535643"`) back into readable
/// text. Some firmwares double-encode identification strings this way.
///
/// Returns `None` unless the input is even-length pure hex and the decoded
/// bytes are mostly printable.
pub fn decode_hex_ascii(s: &str) -> Option<String> {
    if s.is_empty() || s.len() % 2 != 0 {
        return None;
    }
    if !s.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let mut decoded = Vec::with_capacity(s.len() / 2);
    for chunk in s.as_bytes().chunks(2) {
        let hi = (chunk[0] as char).to_digit(16)?;
        let lo = (chunk[1] as char).to_digit(16)?;
        decoded.push((hi * 16 + lo) as u8);
    }

    if printable_ratio(&decoded) > 0.8 {
        Some(String::from_utf8_lossy(&decoded).into_owned())
    } else {
        None
    }
}
