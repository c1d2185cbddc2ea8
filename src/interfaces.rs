/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Per-column `ifTable` readers and the correlator that zips them into
 * interface records.
 *
 * Every reader takes the resolved index list and returns a vector of the
 * same length, in the same order.  A row the agent does not have becomes a
 * placeholder (empty string, zero, false) so later positions keep their
 * meaning; only a transport failure ends a read early.
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;

use crate::decode::{netmask_prefix, octet_to_mac};
use crate::document::{
    Address, AddressFamily, Interface, InterfaceType, Statistics,
};
use crate::mib::mib_2;
use crate::{Error, Oid, Result, Transport, TransportExt, Value};

/**
 * Read "column.index" for every index, in order.  Absent rows and values
 * "decode" rejects yield "placeholder".
 */
pub async fn read_column<T, F>(
    transport: &dyn Transport,
    column: Oid,
    indices: &[u32],
    placeholder: T,
    decode: F,
) -> Result<Vec<T>>
where
    T: Clone,
    F: Fn(&Value) -> Option<T>,
{
    let mut out = Vec::with_capacity(indices.len());

    for &index in indices {
        let oid = column.child(index)?;
        let cell = match transport.get(oid).await {
            Ok(v) => decode(&v).unwrap_or_else(|| {
                tracing::debug!(%oid, value = ?v, "undecodable cell");
                placeholder.clone()
            }),
            Err(Error::NoSuchOid(_)) => placeholder.clone(),
            Err(e) => return Err(e),
        };
        out.push(cell);
    }

    Ok(out)
}

pub async fn read_names(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<String>> {
    read_column(
        transport,
        Oid::known(mib_2::IF_DESCR),
        indices,
        String::new(),
        |v| Some(v.as_text()),
    )
    .await
}

pub async fn read_macs(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<String>> {
    read_column(
        transport,
        Oid::known(mib_2::IF_PHYS_ADDRESS),
        indices,
        String::new(),
        |v| v.as_bytes().map(octet_to_mac),
    )
    .await
}

pub async fn read_mtus(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<u64>> {
    read_column(transport, Oid::known(mib_2::IF_MTU), indices, 0, Value::as_u64)
        .await
}

/**
 * ifSpeed, in bits per second.
 */
pub async fn read_speeds(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<u64>> {
    read_column(
        transport,
        Oid::known(mib_2::IF_SPEED),
        indices,
        0,
        Value::as_u64,
    )
    .await
}

/**
 * ifOperStatus; only up(1) counts as up.
 */
pub async fn read_up(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<bool>> {
    read_column(
        transport,
        Oid::known(mib_2::IF_OPER_STATUS),
        indices,
        false,
        |v| Some(v.as_u64() == Some(1)),
    )
    .await
}

/**
 * (rx, tx) octet counters.
 */
pub async fn read_traffic(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<Vec<(u64, u64)>> {
    let rx = read_column(
        transport,
        Oid::known(mib_2::IF_IN_OCTETS),
        indices,
        0,
        Value::as_u64,
    )
    .await?;
    let tx = read_column(
        transport,
        Oid::known(mib_2::IF_OUT_OCTETS),
        indices,
        0,
        Value::as_u64,
    )
    .await?;

    Ok(rx.into_iter().zip(tx).collect())
}

/**
 * ifType mapped through a vendor's code table; codes the table does not
 * list are Unknown.
 */
pub async fn read_types(
    transport: &dyn Transport,
    indices: &[u32],
    codes: &[(i64, InterfaceType)],
) -> Result<Vec<InterfaceType>> {
    read_column(
        transport,
        Oid::known(mib_2::IF_TYPE),
        indices,
        InterfaceType::Unknown,
        |v| {
            let code = i64::try_from(v.as_u64()?).ok()?;
            Some(
                codes
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, t)| *t)
                    .unwrap_or(InterfaceType::Unknown),
            )
        },
    )
    .await
}

#[derive(Deserialize, Debug)]
struct AddrRow {
    address: Ipv4Addr,
    if_index: u32,
    mask: Option<Ipv4Addr>,
}

/**
 * IPv4 addresses from ipAddrTable, grouped by ifIndex.  The table is indexed
 * by address, so each row is joined to an interface through its
 * ipAdEntIfIndex.  Rows for interfaces outside "indices" are dropped.
 */
pub async fn read_addresses(
    transport: &dyn Transport,
    indices: &[u32],
) -> Result<HashMap<u32, Vec<Address>>> {
    let rows: BTreeMap<Vec<u32>, AddrRow> = transport
        .table(
            Oid::known(mib_2::IP_ADDR_ENTRY),
            &[
                (mib_2::IP_AD_ENT_ADDR, "address"),
                (mib_2::IP_AD_ENT_IF_INDEX, "if_index"),
                (mib_2::IP_AD_ENT_NET_MASK, "mask"),
            ],
        )
        .await?;

    let known: HashSet<u32> = indices.iter().copied().collect();
    let mut out: HashMap<u32, Vec<Address>> = HashMap::new();
    for row in rows.into_values() {
        if !known.contains(&row.if_index) {
            tracing::trace!(
                address = %row.address,
                if_index = row.if_index,
                "address on unreported interface"
            );
            continue;
        }

        out.entry(row.if_index).or_default().push(Address {
            family: AddressFamily::Ipv4,
            address: IpAddr::V4(row.address),
            mask: row.mask.and_then(netmask_prefix),
        });
    }

    Ok(out)
}

/**
 * The ifIndex of every interface in "indices" that appears as a row under
 * "root", a radio table indexed by ifIndex.
 */
pub async fn read_radios(
    transport: &dyn Transport,
    root: Option<Oid>,
    indices: &[u32],
) -> Result<HashSet<u32>> {
    let Some(root) = root else {
        return Ok(HashSet::new());
    };

    Ok(transport
        .next(root)
        .await?
        .iter()
        .filter_map(|(oid, _)| oid.suffix(root)?.first().copied())
        .filter(|index| indices.contains(index))
        .collect())
}

/**
 * The reader outputs for one poll, all aligned with "indices".
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub indices: Vec<u32>,
    pub names: Vec<String>,
    pub macs: Vec<String>,
    pub mtus: Vec<u64>,
    pub speeds: Vec<u64>,
    pub up: Vec<bool>,
    pub traffic: Vec<(u64, u64)>,
    pub types: Vec<InterfaceType>,
}

impl Columns {
    fn check_aligned(&self) -> Result<()> {
        let n = self.indices.len();
        for (what, len) in [
            ("names", self.names.len()),
            ("macs", self.macs.len()),
            ("mtus", self.mtus.len()),
            ("speeds", self.speeds.len()),
            ("up", self.up.len()),
            ("traffic", self.traffic.len()),
            ("types", self.types.len()),
        ] {
            if len != n {
                return Err(Error::decode(
                    "interface columns",
                    format!("{what} has {len} rows for {n} indices"),
                ));
            }
        }
        Ok(())
    }
}

/**
 * Zip the columns position by position into interface records.  Misaligned
 * columns are an error rather than a document with mismatched fields.
 * Addresses and radios are matched by ifIndex, never by name, since names
 * may be missing or repeated.  An interface listed in "radios" is Wireless
 * whatever its ifType says.
 */
pub fn assemble(
    columns: Columns,
    mut addresses: HashMap<u32, Vec<Address>>,
    radios: &HashSet<u32>,
) -> Result<Vec<Interface>> {
    columns.check_aligned()?;

    let Columns { indices, names, macs, mtus, speeds, up, traffic, types } =
        columns;

    Ok(indices
        .into_iter()
        .zip(names)
        .zip(macs)
        .zip(mtus)
        .zip(speeds)
        .zip(up)
        .zip(traffic)
        .zip(types)
        .map(|(((((((index, name), mac), mtu), speed), up), traffic), kind)| {
            let kind = if radios.contains(&index) {
                InterfaceType::Wireless
            } else {
                kind
            };
            let addresses = addresses.remove(&index).unwrap_or_default();
            let (rx_bytes, tx_bytes) = traffic;

            Interface {
                name,
                kind,
                statistics: Statistics {
                    mac,
                    up,
                    rx_bytes,
                    tx_bytes,
                    mtu,
                    speed,
                    addresses,
                },
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Snapshot;

    fn col(c: &[u32], i: u32) -> Oid {
        Oid::known(c).child(i).unwrap()
    }

    fn snap() -> Snapshot {
        let mut s = Snapshot::default();
        s.insert(col(mib_2::IF_DESCR, 1), Value::string("lo"));
        s.insert(col(mib_2::IF_DESCR, 2), Value::string("eth0"));
        s.insert(col(mib_2::IF_DESCR, 3), Value::string("wlan0"));
        s.insert(
            col(mib_2::IF_PHYS_ADDRESS, 2),
            Value::string(vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
        );
        s.insert(col(mib_2::IF_MTU, 1), Value::integer(65536));
        s.insert(col(mib_2::IF_MTU, 2), Value::integer(1500));
        s.insert(col(mib_2::IF_MTU, 3), Value::string("garbage"));
        s.insert(col(mib_2::IF_OPER_STATUS, 1), Value::integer(2));
        s.insert(col(mib_2::IF_OPER_STATUS, 2), Value::integer(1));
        s.insert(col(mib_2::IF_TYPE, 1), Value::integer(24));
        s.insert(col(mib_2::IF_TYPE, 2), Value::integer(6));
        s.insert(col(mib_2::IF_TYPE, 3), Value::integer(6));
        s.insert(col(mib_2::IF_IN_OCTETS, 2), Value::counter32(100));
        s.insert(col(mib_2::IF_OUT_OCTETS, 2), Value::counter32(200));
        s
    }

    fn add_address(
        s: &mut Snapshot,
        ip: Ipv4Addr,
        if_index: i32,
        mask: Ipv4Addr,
    ) {
        let entry = Oid::known(mib_2::IP_ADDR_ENTRY);
        let row: Vec<u32> = ip.octets().iter().map(|&b| b.into()).collect();
        let cell = |c: u32| entry.child(c).unwrap().extend(&row).unwrap();

        s.insert(cell(1), Value::ip_address(ip));
        s.insert(cell(2), Value::integer(if_index));
        s.insert(cell(3), Value::ip_address(mask));
    }

    const CODES: &[(i64, InterfaceType)] = &[
        (6, InterfaceType::Ethernet),
        (24, InterfaceType::Loopback),
    ];

    #[tokio::test]
    async fn placeholders_keep_alignment() {
        let s = snap();
        let idx = [2, 9, 1];

        assert_eq!(read_names(&s, &idx).await.unwrap(), vec!["eth0", "", "lo"]);
        assert_eq!(
            read_macs(&s, &idx).await.unwrap(),
            vec!["00:11:22:33:44:55", "", ""]
        );
        assert_eq!(read_mtus(&s, &idx).await.unwrap(), vec![1500, 0, 65536]);
        assert_eq!(read_speeds(&s, &idx).await.unwrap(), vec![0, 0, 0]);
        assert_eq!(read_up(&s, &idx).await.unwrap(), vec![true, false, false]);
        assert_eq!(
            read_traffic(&s, &idx).await.unwrap(),
            vec![(100, 200), (0, 0), (0, 0)]
        );
        assert_eq!(
            read_types(&s, &idx, CODES).await.unwrap(),
            vec![
                InterfaceType::Ethernet,
                InterfaceType::Unknown,
                InterfaceType::Loopback
            ]
        );

        /*
         * An undecodable cell is a placeholder too:
         */
        assert_eq!(read_mtus(&s, &[3]).await.unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn addresses_join_by_if_index() {
        let mut s = snap();
        for (addr, ifi, mask) in [
            ([192, 168, 1, 1], 2, [255, 255, 255, 0]),
            ([10, 0, 0, 1], 2, [255, 0, 0, 0]),
            ([127, 0, 0, 1], 1, [255, 0, 0, 0]),
            ([172, 16, 0, 1], 44, [255, 255, 0, 0]),
        ] {
            let (ip, mask) = (Ipv4Addr::from(addr), Ipv4Addr::from(mask));
            add_address(&mut s, ip, ifi, mask);
        }

        let by_index = read_addresses(&s, &[1, 2]).await.unwrap();

        assert_eq!(by_index.len(), 2);
        let eth0 = &by_index[&2];
        assert_eq!(eth0.len(), 2);
        assert_eq!(eth0[0].address.to_string(), "10.0.0.1");
        assert_eq!(eth0[0].mask, Some(8));
        assert_eq!(eth0[1].address.to_string(), "192.168.1.1");
        assert_eq!(eth0[1].mask, Some(24));
        assert_eq!(by_index[&1][0].family, AddressFamily::Ipv4);
    }

    #[tokio::test]
    async fn radios_by_if_index() {
        let mut s = snap();
        let root: Oid = "1.2.840.10036.1.1.1.1".parse().unwrap();
        s.insert(root.child(3).unwrap(), Value::string("x"));
        s.insert(root.child(8).unwrap(), Value::string("y"));

        let radios = read_radios(&s, Some(root), &[2, 3]).await.unwrap();
        assert_eq!(radios, HashSet::from([3]));
        assert!(read_radios(&s, None, &[2, 3]).await.unwrap().is_empty());
    }

    #[test]
    fn assemble_checks_alignment() {
        let columns = Columns {
            indices: vec![2, 3],
            names: vec!["eth0".into(), "wlan0".into()],
            macs: vec!["00:11:22:33:44:55".into(), String::new()],
            mtus: vec![1500, 1500],
            speeds: vec![100, 0],
            up: vec![true, false],
            traffic: vec![(1, 2), (0, 0)],
            types: vec![InterfaceType::Ethernet, InterfaceType::Ethernet],
        };

        let radios = HashSet::from([3]);
        let ifs = assemble(columns.clone(), HashMap::new(), &radios).unwrap();
        assert_eq!(ifs.len(), 2);
        assert_eq!(ifs[0].kind, InterfaceType::Ethernet);
        assert_eq!(ifs[0].statistics.rx_bytes, 1);
        assert_eq!(ifs[1].kind, InterfaceType::Wireless);
        assert!(ifs[1].statistics.addresses.is_empty());

        let mut short = columns;
        short.mtus.pop();
        assert!(matches!(
            assemble(short, HashMap::new(), &radios),
            Err(Error::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn unnamed_interfaces_keep_their_own_addresses() {
        let mut s = Snapshot::default();
        for i in 1..=3 {
            s.insert(col(mib_2::IF_INDEX, i), Value::integer(i as i32));
            s.insert(col(mib_2::IF_TYPE, i), Value::integer(6));
        }
        s.insert(col(mib_2::IF_DESCR, 1), Value::string("eth0"));

        let mask = Ipv4Addr::new(255, 255, 255, 0);
        add_address(&mut s, Ipv4Addr::new(10, 0, 0, 2), 2, mask);
        add_address(&mut s, Ipv4Addr::new(10, 0, 0, 3), 3, mask);

        let root: Oid = "1.2.840.10036.1.1.1.1".parse().unwrap();
        s.insert(root.child(3).unwrap(), Value::string("radio"));

        let idx = [1, 2, 3];
        let columns = Columns {
            indices: idx.to_vec(),
            names: read_names(&s, &idx).await.unwrap(),
            macs: read_macs(&s, &idx).await.unwrap(),
            mtus: read_mtus(&s, &idx).await.unwrap(),
            speeds: read_speeds(&s, &idx).await.unwrap(),
            up: read_up(&s, &idx).await.unwrap(),
            traffic: read_traffic(&s, &idx).await.unwrap(),
            types: read_types(&s, &idx, CODES).await.unwrap(),
        };
        let addresses = read_addresses(&s, &idx).await.unwrap();
        let radios = read_radios(&s, Some(root), &idx).await.unwrap();

        let ifs = assemble(columns, addresses, &radios).unwrap();
        let addrs = |i: usize| -> Vec<String> {
            ifs[i]
                .statistics
                .addresses
                .iter()
                .map(|a| a.address.to_string())
                .collect()
        };

        assert_eq!(ifs[1].name, "");
        assert_eq!(ifs[2].name, "");
        assert!(addrs(0).is_empty());
        assert_eq!(addrs(1), vec!["10.0.0.2"]);
        assert_eq!(addrs(2), vec!["10.0.0.3"]);

        assert_eq!(ifs[1].kind, InterfaceType::Ethernet);
        assert_eq!(ifs[2].kind, InterfaceType::Wireless);
    }
}
