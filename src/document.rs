/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * The normalised output of one device poll.  Every record has a fixed
 * field set; fields a device does not support are omitted from JSON rather
 * than guessed.
 */

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_repr::Deserialize_repr;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDocument {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub general: General,
    pub resources: Resources,
    pub interfaces: Vec<Interface>,
    pub neighbors: Vec<Neighbor>,
}

impl DeviceDocument {
    pub const KIND: &'static str = "DeviceMonitoring";

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct General {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /**
     * Whole seconds since the agent started.
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /**
     * The uptime as (days, hours, minutes).
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_tuple: Option<(u64, u64, u64)>,
    /**
     * The device clock as a Unix timestamp.
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_time: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resources {
    /**
     * 1, 5 and 15 minute load averages.
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u64>,
    pub memory: Memory,
    pub swap: Swap,
}

/**
 * Sizes in bytes.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Memory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffered: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<u64>,
}

/**
 * Sizes in bytes.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Swap {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Ethernet,
    Loopback,
    Wireless,
    Bridge,
    Tunnel,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InterfaceType,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /**
     * Empty when the interface has no hardware address.
     */
    pub mac: String,
    pub up: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub mtu: u64,
    /**
     * Bits per second.
     */
    pub speed: u64,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub family: AddressFamily,
    pub address: IpAddr,
    /**
     * Prefix length, when the agent reported a contiguous netmask.
     */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<u8>,
}

/**
 * ipNetToPhysicalState.  Deserialised from the numeric code, serialised by
 * name.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize_repr)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum NeighborState {
    Reachable = 1,
    Stale = 2,
    Delay = 3,
    Probe = 4,
    Invalid = 5,
    Unknown = 6,
    Incomplete = 7,
}

impl NeighborState {
    /**
     * Codes outside the MIB's range are Unknown.
     */
    pub fn from_code(code: i64) -> NeighborState {
        match code {
            1 => NeighborState::Reachable,
            2 => NeighborState::Stale,
            3 => NeighborState::Delay,
            4 => NeighborState::Probe,
            5 => NeighborState::Invalid,
            7 => NeighborState::Incomplete,
            _ => NeighborState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub mac: String,
    pub state: NeighborState,
    pub interface: String,
    pub ip: IpAddr,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let doc = DeviceDocument {
            kind: DeviceDocument::KIND,
            general: General {
                hostname: Some("ap1".into()),
                uptime: Some(123),
                ..Default::default()
            },
            resources: Resources {
                memory: Memory { total: Some(1024), ..Default::default() },
                ..Default::default()
            },
            interfaces: vec![Interface {
                name: "eth0".into(),
                kind: InterfaceType::Ethernet,
                statistics: Statistics {
                    mac: "00:11:22:33:44:55".into(),
                    up: true,
                    rx_bytes: 1,
                    tx_bytes: 2,
                    mtu: 1500,
                    speed: 1_000_000_000,
                    addresses: vec![Address {
                        family: AddressFamily::Ipv4,
                        address: "192.168.1.1".parse().unwrap(),
                        mask: Some(24),
                    }],
                },
            }],
            neighbors: vec![Neighbor {
                mac: "00:aa:bb:cc:dd:ee".into(),
                state: NeighborState::Stale,
                interface: "eth0".into(),
                ip: "192.168.1.20".parse().unwrap(),
            }],
        };

        let v: serde_json::Value =
            serde_json::from_str(&doc.to_json(false).unwrap()).unwrap();

        assert_eq!(
            v,
            json!({
                "type": "DeviceMonitoring",
                "general": { "hostname": "ap1", "uptime": 123 },
                "resources": {
                    "memory": { "total": 1024 },
                    "swap": {}
                },
                "interfaces": [{
                    "name": "eth0",
                    "type": "ethernet",
                    "statistics": {
                        "mac": "00:11:22:33:44:55",
                        "up": true,
                        "rx_bytes": 1,
                        "tx_bytes": 2,
                        "mtu": 1500,
                        "speed": 1_000_000_000u64,
                        "addresses": [{
                            "family": "ipv4",
                            "address": "192.168.1.1",
                            "mask": 24
                        }]
                    }
                }],
                "neighbors": [{
                    "mac": "00:aa:bb:cc:dd:ee",
                    "state": "STALE",
                    "interface": "eth0",
                    "ip": "192.168.1.20"
                }]
            })
        );
    }

    #[test]
    fn neighbor_state_codes() {
        let s: NeighborState = serde_json::from_str("7").unwrap();
        assert_eq!(s, NeighborState::Incomplete);
        assert!(serde_json::from_str::<NeighborState>("9").is_err());
    }
}
