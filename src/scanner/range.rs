//! IPv4 range expansion.
//!
//! Accepts `A.B.C.X-Y` (last-octet span) or a single IPv4 literal and
//! produces the finite, ascending list of addresses to probe.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors from parsing an IP range expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeParseError {
    /// Not a single IP and not an `A.B.C.X-Y` expression.
    #[error("invalid range format: '{0}', expected A.B.C.X-Y or a single IPv4 address")]
    Format(String),

    /// The base part before the dash is not an IPv4 address.
    #[error("invalid start address: '{0}'")]
    StartAddress(String),

    /// The final octet is not a number in 0..=255.
    #[error("end octet out of range (0-255): '{0}'")]
    EndOctet(String),

    /// The span runs backwards (start octet greater than end octet).
    #[error("descending range: {start} > {end}")]
    Descending { start: u8, end: u8 },
}

/// Expand a range expression into the ascending list of addresses.
///
/// `"10.0.0.5-5"` yields exactly one address; `"10.0.0.1-254"` yields 254.
pub fn parse_ip_range(expr: &str) -> Result<Vec<Ipv4Addr>, RangeParseError> {
    let expr = expr.trim();

    match expr.split_once('-') {
        Some((start, end)) => parse_span(expr, start, end),
        None => {
            let ip: Ipv4Addr = expr
                .parse()
                .map_err(|_| RangeParseError::Format(expr.to_string()))?;
            Ok(vec![ip])
        }
    }
}

fn parse_span(expr: &str, start: &str, end: &str) -> Result<Vec<Ipv4Addr>, RangeParseError> {
    if expr.matches('-').count() != 1 {
        return Err(RangeParseError::Format(expr.to_string()));
    }

    let base: Ipv4Addr = start
        .trim()
        .parse()
        .map_err(|_| RangeParseError::StartAddress(start.to_string()))?;

    let end_octet: u8 = end
        .trim()
        .parse()
        .map_err(|_| RangeParseError::EndOctet(end.to_string()))?;

    let [a, b, c, start_octet] = base.octets();
    if start_octet > end_octet {
        return Err(RangeParseError::Descending {
            start: start_octet,
            end: end_octet,
        });
    }

    Ok((start_octet..=end_octet)
        .map(|d| Ipv4Addr::new(a, b, c, d))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_ip() {
        let ips = parse_ip_range("192.168.1.10").unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(192, 168, 1, 10)]);
    }

    #[test]
    fn test_span_length_and_order() {
        let ips = parse_ip_range("192.168.1.1-254").unwrap();
        assert_eq!(ips.len(), 254);
        assert_eq!(ips[0], Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(ips[253], Ipv4Addr::new(192, 168, 1, 254));
        assert!(ips.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_element_span() {
        let ips = parse_ip_range("10.0.0.5-5").unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(10, 0, 0, 5)]);
    }

    #[test]
    fn test_end_octet_out_of_range() {
        assert_eq!(
            parse_ip_range("10.0.0.300-1"),
            Err(RangeParseError::StartAddress("10.0.0.300".to_string()))
        );
        assert!(matches!(
            parse_ip_range("10.0.0.1-300"),
            Err(RangeParseError::EndOctet(_))
        ));
    }

    #[test]
    fn test_descending_span() {
        assert_eq!(
            parse_ip_range("10.0.0.50-10"),
            Err(RangeParseError::Descending { start: 50, end: 10 })
        );
    }

    #[test]
    fn test_garbage() {
        assert!(parse_ip_range("printers").is_err());
        assert!(parse_ip_range("10.0.0.1-2-3").is_err());
        assert!(parse_ip_range("").is_err());
    }
}
