/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Decoders for the composite encodings SNMP agents hand back: OID argument
 * forms, MAC octets, `DateAndTime` and IPv6 addresses spelled as OID index
 * arcs.
 */

use std::net::Ipv6Addr;

use chrono::NaiveDate;

use crate::{Error, Result};

/**
 * Canonical dotted form of an OID given as a string ("1.3.6", "1,3,6",
 * "1, 3, 6") or as a JSON array of integers or numeric strings.  Any other
 * JSON type is rejected with InvalidOidType.
 */
pub fn normalize_oid(input: &serde_json::Value) -> Result<String> {
    use serde_json::Value as J;

    let arcs = match input {
        J::String(s) => parse_oid_text(s)?,
        J::Array(items) => items
            .iter()
            .map(|item| match item {
                J::Number(n) => n
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| Error::InvalidOid(n.to_string())),
                J::String(s) => s
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidOid(s.clone())),
                other => Err(Error::InvalidOidType(json_kind(other))),
            })
            .collect::<Result<Vec<u32>>>()?,
        other => return Err(Error::InvalidOidType(json_kind(other))),
    };

    if arcs.is_empty() {
        return Err(Error::InvalidOid(input.to_string()));
    }

    Ok(join_arcs(&arcs))
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

pub(crate) fn parse_oid_text(s: &str) -> Result<Vec<u32>> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(Error::InvalidOid(s.to_string()));
    }

    cleaned
        .split('.')
        .map(|arc| {
            arc.parse::<u32>().map_err(|_| Error::InvalidOid(s.to_string()))
        })
        .collect()
}

pub(crate) fn join_arcs(arcs: &[u32]) -> String {
    arcs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(".")
}

/**
 * Lower-case, colon separated hex form of raw hardware address octets.
 * Inputs of any length are rendered octet by octet; empty input yields an
 * empty string.
 */
pub fn octet_to_mac(raw: &[u8]) -> String {
    raw.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}

/**
 * Accept either raw octets or a textual hex rendering ("00:11:22:33:44:55",
 * "00-11-22-...", "001122334455") of a 6 byte MAC address.
 */
pub fn mac_from_octets(raw: &[u8]) -> Option<String> {
    if raw.len() == 6 {
        return Some(octet_to_mac(raw));
    }

    let text = std::str::from_utf8(raw).ok()?;
    let hex: String = text
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.' | ' '))
        .collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let octets = (0..12)
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<std::result::Result<Vec<u8>, _>>()
        .ok()?;
    Some(octet_to_mac(&octets))
}

/**
 * The UTC offset carried by the 11 byte form of DateAndTime, in minutes
 * east of UTC.
 */
pub fn date_and_time_offset(raw: &[u8]) -> Option<i32> {
    if raw.len() != 11 {
        return None;
    }

    let minutes = i32::from(raw[9]) * 60 + i32::from(raw[10]);
    match raw[8] {
        b'+' => Some(minutes),
        b'-' => Some(-minutes),
        _ => None,
    }
}

/**
 * Decode a SNMPv2-TC DateAndTime (8 or 11 octets) into a Unix timestamp.
 *
 * The wall-clock fields are read as if they were UTC.  The optional offset
 * in the 11 octet form is validated but does not move the instant;
 * consumers of the local_time field depend on the device's own clock
 * reading.  Deciseconds are truncated.
 */
pub fn decode_date_and_time(raw: &[u8]) -> Result<i64> {
    if raw.len() != 8 && raw.len() != 11 {
        return Err(Error::decode(
            "DateAndTime",
            format!("expected 8 or 11 octets, got {}", raw.len()),
        ));
    }

    let year = i32::from(u16::from_be_bytes([raw[0], raw[1]]));
    let (month, day) = (u32::from(raw[2]), u32::from(raw[3]));
    let (hour, minute, second) =
        (u32::from(raw[4]), u32::from(raw[5]), u32::from(raw[6]));

    if raw.len() == 11 && date_and_time_offset(raw).is_none() {
        return Err(Error::decode(
            "DateAndTime",
            format!("bad UTC direction byte {:#04x}", raw[8]),
        ));
    }

    let Some(when) = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
    else {
        return Err(Error::decode(
            "DateAndTime",
            format!(
                "{year}-{month}-{day} {hour}:{minute}:{second} is not a valid \
                time"
            ),
        ));
    };

    Ok(when.and_utc().timestamp())
}

/**
 * An IPv6 address written as sixteen dot separated decimal octets, as it
 * appears in the index of the ipNetToPhysical and ipAddress tables.
 */
pub fn ascii_blocks_to_ipv6(dotted: &str) -> Result<Ipv6Addr> {
    let octets = dotted
        .split('.')
        .map(|b| b.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|e| Error::decode("IPv6 index", format!("{dotted:?}: {e}")))?;

    let octets: [u8; 16] = octets.try_into().map_err(|v: Vec<u8>| {
        Error::decode(
            "IPv6 index",
            format!("expected 16 octets, got {}", v.len()),
        )
    })?;

    /*
     * Two hex digits per octet, paired up into the eight groups:
     */
    let hex = octets.iter().map(|b| format!("{b:02x}")).collect::<String>();
    let groups = (0..32)
        .step_by(4)
        .map(|i| &hex[i..i + 4])
        .collect::<Vec<_>>()
        .join(":");

    groups.parse().map_err(|e| Error::decode("IPv6 index", e))
}

/**
 * Seconds of uptime as (days, hours, minutes).
 */
pub fn uptime_tuple(seconds: u64) -> (u64, u64, u64) {
    let days = seconds / 86_400;
    let rest = seconds % 86_400;
    (days, rest / 3600, (rest / 60) % 60)
}

/**
 * Prefix length of a contiguous IPv4 netmask.
 */
pub fn netmask_prefix(mask: std::net::Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return None;
    }
    u8::try_from(ones).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oid_forms() {
        for input in [
            json!("1.3.6.1.2.1.1.5.0"),
            json!("1,3,6,1,2,1,1,5,0"),
            json!("1, 3, 6, 1, 2, 1, 1, 5, 0"),
            json!([1, 3, 6, 1, 2, 1, 1, 5, 0]),
            json!(["1", "3", "6", "1", "2", "1", "1", "5", "0"]),
        ] {
            let once = normalize_oid(&input).unwrap();
            assert_eq!(once, "1.3.6.1.2.1.1.5.0");
            assert_eq!(normalize_oid(&json!(once)).unwrap(), once);
        }
    }

    #[test]
    fn oid_bad_types() {
        for input in [json!({}), json!(true), json!(null), json!(1.5)] {
            assert!(matches!(
                normalize_oid(&input),
                Err(Error::InvalidOidType(_))
            ));
        }
        assert!(matches!(
            normalize_oid(&json!([1, {}])),
            Err(Error::InvalidOidType(_))
        ));
        assert!(matches!(
            normalize_oid(&json!("1.3.six")),
            Err(Error::InvalidOid(_))
        ));
        assert!(matches!(normalize_oid(&json!("")), Err(Error::InvalidOid(_))));
    }

    #[test]
    fn macs() {
        assert_eq!(
            octet_to_mac(&[0x04, 0x0e, 0x3c, 0xca, 0x55, 0x5f]),
            "04:0e:3c:ca:55:5f"
        );
        assert_eq!(octet_to_mac(&[]), "");
        assert_eq!(
            mac_from_octets(b"00:1A:2b:3c:4d:5e").as_deref(),
            Some("00:1a:2b:3c:4d:5e")
        );
        assert_eq!(mac_from_octets(b"nonsense"), None);
    }

    #[test]
    fn date_and_time_short() {
        let raw = [0x07, 0xe5, 6, 15, 10, 30, 0, 0];
        assert_eq!(decode_date_and_time(&raw).unwrap(), 1_623_753_000);
    }

    #[test]
    fn date_and_time_offset_is_not_applied() {
        let raw = [0x07, 0xe5, 6, 15, 10, 30, 0, 7, b'+', 2, 0];
        assert_eq!(decode_date_and_time(&raw).unwrap(), 1_623_753_000);
        assert_eq!(date_and_time_offset(&raw), Some(120));

        let raw = [0x07, 0xe5, 6, 15, 10, 30, 0, 7, b'-', 5, 30];
        assert_eq!(date_and_time_offset(&raw), Some(-330));
    }

    #[test]
    fn date_and_time_bad() {
        assert!(decode_date_and_time(&[0x07, 0xe5, 6]).is_err());
        let bad_month = [0x07, 0xe5, 13, 1, 0, 0, 0, 0];
        assert!(decode_date_and_time(&bad_month).is_err());
        let bad_direction = [0x07, 0xe5, 1, 1, 0, 0, 0, 0, b'x', 0, 0];
        assert!(decode_date_and_time(&bad_direction).is_err());
    }

    #[test]
    fn ipv6_blocks() {
        let a =
            ascii_blocks_to_ipv6("254.128.0.0.0.0.0.0.2.17.34.255.254.51.68.85")
                .unwrap();
        assert_eq!(a.to_string(), "fe80::211:22ff:fe33:4455");
        assert!(ascii_blocks_to_ipv6("1.2.3.4").is_err());
        assert!(ascii_blocks_to_ipv6("1.2.3.999").is_err());
    }

    #[test]
    fn uptime_parts() {
        assert_eq!(uptime_tuple(0), (0, 0, 0));
        assert_eq!(uptime_tuple(90_061), (1, 1, 1));
    }

    #[test]
    fn prefixes() {
        let prefix = |mask: &str| netmask_prefix(mask.parse().unwrap());
        assert_eq!(prefix("255.255.255.0"), Some(24));
        assert_eq!(prefix("0.0.0.0"), Some(0));
        assert_eq!(prefix("255.255.255.255"), Some(32));
        assert_eq!(prefix("255.0.255.0"), None);
    }
}
