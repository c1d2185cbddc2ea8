/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Device-wide facts: clocks, the manufacturer, resource usage and the
 * neighbour cache.
 */

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Deserializer};

use crate::decode::{
    ascii_blocks_to_ipv6, decode_date_and_time, join_arcs, mac_from_octets,
};
use crate::document::{Memory, Neighbor, NeighborState, Resources, Swap};
use crate::manufacturer::ManufacturerLookup;
use crate::mib::{cisco, mib_2, ucd};
use crate::{Error, Oid, Result, Transport, TransportExt};

/**
 * sysUpTime in whole seconds.  TimeTicks are hundredths of a second and the
 * remainder is discarded.
 */
pub async fn uptime(transport: &dyn Transport) -> Result<u64> {
    Ok(transport.get_u64(Oid::known(mib_2::SYS_UPTIME)).await? / 100)
}

/**
 * The device clock, from a DateAndTime object.
 */
pub async fn local_time(transport: &dyn Transport, oid: Oid) -> Result<i64> {
    decode_date_and_time(&transport.get_bytes(oid).await?)
}

/**
 * The organisation owning the MAC of the second reported interface.  The
 * first is usually the loopback or the primary bridge.
 */
pub fn manufacturer(
    macs: &[String],
    lookup: &dyn ManufacturerLookup,
) -> Option<String> {
    let mac = macs.get(1).filter(|m| !m.is_empty())?;
    lookup.lookup(mac).map(str::to_string)
}

/**
 * Where a vendor keeps its memory counters.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemorySource {
    /**
     * UCD-SNMP-MIB memory group, in kB.
     */
    Ucd,
    /**
     * CISCO-MEMORY-POOL-MIB pools plus processorRam, in bytes.
     */
    CiscoPools,
}

/**
 * Where a vendor keeps its load averages.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /**
     * laLoad.1-3 as decimal text.
     */
    UcdText,
    /**
     * cpmCPULoadAvg 1/5/15 minutes, in hundredths.
     */
    CiscoHundredths,
}

impl LoadSource {
    fn oids(self) -> [&'static [u32]; 3] {
        match self {
            LoadSource::UcdText => {
                [ucd::LA_LOAD_1, ucd::LA_LOAD_5, ucd::LA_LOAD_15]
            }
            LoadSource::CiscoHundredths => [
                cisco::CPM_CPU_LOAD_AVG_1MIN,
                cisco::CPM_CPU_LOAD_AVG_5MIN,
                cisco::CPM_CPU_LOAD_AVG_15MIN,
            ],
        }
    }

    /**
     * Divisor turning a raw reading into a load average.
     */
    fn scale(self) -> f64 {
        match self {
            LoadSource::UcdText => 1.0,
            LoadSource::CiscoHundredths => 100.0,
        }
    }
}

/**
 * Collect resource usage field by field.  A counter the device lacks is
 * left out; a transport failure still aborts the read.
 */
pub async fn resources(
    transport: &dyn Transport,
    memory: MemorySource,
    load: LoadSource,
    cpu_table: Oid,
) -> Result<Resources> {
    let (memory, swap) = match memory {
        MemorySource::Ucd => ucd_memory(transport).await?,
        MemorySource::CiscoPools => {
            (cisco_memory(transport).await?, Swap::default())
        }
    };

    let load = load_triplet(transport, load.oids(), load.scale()).await?;

    let rows = transport.next(cpu_table).await?.len();
    let cpus = (rows > 0).then_some(rows as u64);

    Ok(Resources { load, cpus, memory, swap })
}

async fn optional_u64(
    transport: &dyn Transport,
    oid: &[u32],
) -> Result<Option<u64>> {
    let oid = Oid::known(oid);
    Ok(transport.get_optional(oid).await?.and_then(|v| {
        let n = v.as_u64();
        if n.is_none() {
            tracing::debug!(%oid, value = ?v, "not a counter");
        }
        n
    }))
}

async fn ucd_memory(transport: &dyn Transport) -> Result<(Memory, Swap)> {
    let kb = |n: Option<u64>| n.and_then(|n| n.checked_mul(1024));

    let memory = Memory {
        total: kb(optional_u64(transport, ucd::MEM_TOTAL_REAL).await?),
        free: kb(optional_u64(transport, ucd::MEM_AVAIL_REAL).await?),
        buffered: kb(optional_u64(transport, ucd::MEM_BUFFER).await?),
        cached: kb(optional_u64(transport, ucd::MEM_CACHED).await?),
        shared: kb(optional_u64(transport, ucd::MEM_SHARED).await?),
    };
    let swap = Swap {
        total: kb(optional_u64(transport, ucd::MEM_TOTAL_SWAP).await?),
        free: kb(optional_u64(transport, ucd::MEM_AVAIL_SWAP).await?),
    };

    Ok((memory, swap))
}

/*
 * IOS has no single total: the I/O pool's used and free plus the processor
 * RAM.  Any part missing, or a sum that overflows, leaves the total out.
 */
async fn cisco_memory(transport: &dyn Transport) -> Result<Memory> {
    let used = optional_u64(transport, cisco::MEMORY_POOL_USED).await?;
    let free = optional_u64(transport, cisco::MEMORY_POOL_FREE).await?;
    let ram = optional_u64(transport, cisco::PROCESSOR_RAM).await?;

    let total = match (used, free, ram) {
        (Some(u), Some(f), Some(r)) => {
            u.checked_add(f).and_then(|t| t.checked_add(r))
        }
        _ => None,
    };

    Ok(Memory { total, free, ..Default::default() })
}

async fn load_triplet(
    transport: &dyn Transport,
    oids: [&[u32]; 3],
    scale: f64,
) -> Result<Option<[f64; 3]>> {
    let mut load = [0.0; 3];
    for (slot, oid) in load.iter_mut().zip(oids) {
        let oid = Oid::known(oid);
        let Some(v) = transport.get_optional(oid).await? else {
            return Ok(None);
        };
        let Some(f) = v.as_f64() else {
            tracing::debug!(%oid, value = ?v, "not a load average");
            return Ok(None);
        };
        *slot = f / scale;
    }
    Ok(Some(load))
}

/**
 * The raw octets of a string cell.
 */
struct Octets(Vec<u8>);

impl<'de> Deserialize<'de> for Octets {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OctetsVisitor;

        impl<'de> serde::de::Visitor<'de> for OctetsVisitor {
            type Value = Octets;

            fn expecting(
                &self,
                formatter: &mut std::fmt::Formatter,
            ) -> std::fmt::Result {
                formatter.write_str("an octet string")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Octets, E>
            where
                E: serde::de::Error,
            {
                Ok(Octets(v.to_vec()))
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Octets, E>
            where
                E: serde::de::Error,
            {
                Ok(Octets(v.as_bytes().to_vec()))
            }
        }

        deserializer.deserialize_bytes(OctetsVisitor)
    }
}

#[derive(Deserialize)]
struct NeighborRow {
    mac: Octets,
    #[serde(deserialize_with = "state_code")]
    state: NeighborState,
}

fn state_code<'de, D>(d: D) -> std::result::Result<NeighborState, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(d).map(NeighborState::from_code)
}

/*
 * InetAddressType values in the ipNetToPhysical index.
 */
const INET_IPV4: u32 = 1;
const INET_IPV6: u32 = 2;

/**
 * The address in an ipNetToPhysical index: ifIndex, address type, address
 * length, then one arc per address octet.
 */
fn neighbor_ip(index: &[u32]) -> Result<(u32, IpAddr)> {
    let [if_index, family, len, addr @ ..] = index else {
        return Err(Error::decode(
            "neighbour index",
            format!("{index:?} is too short"),
        ));
    };
    if *len as usize != addr.len() {
        return Err(Error::decode(
            "neighbour index",
            format!("length {len} but {} address arcs", addr.len()),
        ));
    }

    let ip = match (*family, addr) {
        (INET_IPV4, &[a, b, c, d]) => {
            let octet = |n: u32| {
                u8::try_from(n).map_err(|_| {
                    Error::decode("neighbour index", format!("octet {n}"))
                })
            };
            let (a, b, c, d) = (octet(a)?, octet(b)?, octet(c)?, octet(d)?);
            IpAddr::V4(Ipv4Addr::new(a, b, c, d))
        }
        (INET_IPV6, _) => IpAddr::V6(ascii_blocks_to_ipv6(&join_arcs(addr))?),
        _ => {
            return Err(Error::decode(
                "neighbour index",
                format!("address type {family} with {} octets", addr.len()),
            ));
        }
    };

    Ok((*if_index, ip))
}

/**
 * The ARP / neighbour discovery cache.  Entries whose index, MAC or state
 * do not decode, or whose interface has no name, are skipped.
 */
pub async fn neighbors(transport: &dyn Transport) -> Result<Vec<Neighbor>> {
    let rows: BTreeMap<Vec<u32>, NeighborRow> = transport
        .table(
            Oid::known(mib_2::IP_NET_TO_PHYSICAL_ENTRY),
            &[
                (mib_2::IP_NET_TO_PHYSICAL_PHYS_ADDRESS, "mac"),
                (mib_2::IP_NET_TO_PHYSICAL_STATE, "state"),
            ],
        )
        .await?;

    let descr = Oid::known(mib_2::IF_DESCR);
    let mut names: HashMap<u32, Option<String>> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());

    for (index, row) in rows {
        let (if_index, ip) = match neighbor_ip(&index) {
            Ok(x) => x,
            Err(e) => {
                tracing::debug!(?index, error = %e, "skipping neighbour");
                continue;
            }
        };

        let Some(mac) = mac_from_octets(&row.mac.0) else {
            tracing::debug!(?index, "skipping neighbour with bad MAC");
            continue;
        };

        let interface = match names.get(&if_index) {
            Some(name) => name.clone(),
            None => {
                let name = transport
                    .get_optional(descr.child(if_index)?)
                    .await?
                    .map(|v| v.as_text());
                names.insert(if_index, name.clone());
                name
            }
        };
        let Some(interface) = interface else {
            tracing::debug!(
                ?index,
                if_index,
                "skipping neighbour on unknown interface"
            );
            continue;
        };

        out.push(Neighbor { mac, state: row.state, interface, ip });
    }

    Ok(out)
}
