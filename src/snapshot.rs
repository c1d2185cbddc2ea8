/*
 * Copyright 2024 Oxide Computer Company
 */

use std::{
    collections::BTreeMap,
    net::Ipv4Addr,
    ops::Bound,
    path::Path,
};

use async_trait::async_trait;
use csnmp::ObjectValue;
use serde::{Deserialize, Serialize};

use crate::{Binding, Error, Oid, Result, Transport, Value};

/**
 * A frozen OID to value map standing in for a device.  Reads against it are
 * deterministic and free of side effects, so a poll over a snapshot and a
 * poll over the live agent it was walked from decode to the same document.
 */
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Snapshot {
    pub(crate) values: BTreeMap<Oid, Value>,
}

impl FromIterator<(Oid, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Oid, Value)>>(iter: I) -> Self {
        Snapshot { values: iter.into_iter().collect() }
    }
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn insert(&mut self, oid: Oid, value: Value) -> Option<Value> {
        self.values.insert(oid, value)
    }

    /**
     * Insert by dotted OID, for unit test fixtures.
     */
    #[cfg(test)]
    pub(crate) fn insert_str(
        &mut self,
        oid: &str,
        value: Value,
    ) -> Option<Value> {
        let oid = oid.parse().expect("fixture OID");
        self.values.insert(oid, value)
    }

    pub fn value(&self, oid: &Oid) -> Option<&Value> {
        self.values.get(oid)
    }

    pub fn merge(&mut self, other: Snapshot) {
        self.values.extend(other.values);
    }

    /**
     * Every entry strictly beneath "root".
     */
    pub fn subtree(&self, root: Oid) -> impl Iterator<Item = (&Oid, &Value)> {
        self.values
            .range(range_for_oid(root))
            .filter(move |(oid, _)| oid.is_under(root))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &Value)> {
        self.values.iter()
    }

    pub fn from_json(json: &str) -> Result<Snapshot> {
        let dump: BTreeMap<String, DumpedValue> = serde_json::from_str(json)?;

        let values = dump
            .into_iter()
            .map(|(oid, dv)| Ok((oid.parse()?, dv.into_value(&oid)?)))
            .collect::<Result<BTreeMap<Oid, Value>>>()?;

        Ok(Snapshot { values })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Snapshot> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Snapshot::from_json(&content).map_err(|e| {
            Error::Config(format!("snapshot {}: {e}", path.display()))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let dump = self
            .values
            .iter()
            .map(|(oid, v)| (oid.to_string(), DumpedValue::from(v)))
            .collect::<BTreeMap<_, _>>();

        Ok(serde_json::to_string_pretty(&dump)?)
    }
}

#[async_trait]
impl Transport for Snapshot {
    async fn get(&self, oid: Oid) -> Result<Value> {
        self.values.get(&oid).cloned().ok_or(Error::NoSuchOid(oid))
    }

    async fn next(&self, oid: Oid) -> Result<Vec<Binding>> {
        Ok(self.subtree(oid).map(|(k, v)| (*k, v.clone())).collect())
    }

    async fn walk(&self, root: Oid) -> Result<Snapshot> {
        Ok(self.subtree(root).map(|(k, v)| (*k, v.clone())).collect())
    }
}

/**
 * On-disk form of one value.  Octet strings that are not UTF-8 (MAC
 * addresses, DateAndTime) are stored as hex.
 */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum DumpedValue {
    Integer(i32),
    String(String),
    Hex(String),
    Oid(String),
    IpAddress(Ipv4Addr),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    Opaque(String),
}

impl From<&Value> for DumpedValue {
    fn from(v: &Value) -> Self {
        match &v.0 {
            ObjectValue::Integer(i) => DumpedValue::Integer(*i),
            ObjectValue::String(buf) => match std::str::from_utf8(buf) {
                Ok(s) if !s.contains('\0') => DumpedValue::String(s.into()),
                _ => DumpedValue::Hex(to_hex(buf)),
            },
            ObjectValue::ObjectId(oid) => DumpedValue::Oid(oid.to_string()),
            ObjectValue::IpAddress(ip) => DumpedValue::IpAddress(*ip),
            ObjectValue::Counter32(u) => DumpedValue::Counter32(*u),
            ObjectValue::Unsigned32(u) => DumpedValue::Unsigned32(*u),
            ObjectValue::TimeTicks(u) => DumpedValue::Timeticks(*u),
            ObjectValue::Counter64(u) => DumpedValue::Counter64(*u),
            ObjectValue::Opaque(buf) => DumpedValue::Opaque(to_hex(buf)),
        }
    }
}

impl DumpedValue {
    fn into_value(self, at: &str) -> Result<Value> {
        Ok(match self {
            DumpedValue::Integer(i) => Value::integer(i),
            DumpedValue::String(s) => Value::string(s),
            DumpedValue::Hex(h) => Value::string(from_hex(at, &h)?),
            DumpedValue::Oid(o) => Value::object_id(o.parse()?),
            DumpedValue::IpAddress(ip) => Value::ip_address(ip),
            DumpedValue::Counter32(u) => Value::counter32(u),
            DumpedValue::Unsigned32(u) => Value::unsigned32(u),
            DumpedValue::Timeticks(u) => Value::timeticks(u),
            DumpedValue::Counter64(u) => Value::counter64(u),
            DumpedValue::Opaque(h) => Value::opaque(from_hex(at, &h)?),
        })
    }
}

fn to_hex(buf: &[u8]) -> String {
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(at: &str, hex: &str) -> Result<Vec<u8>> {
    let hex: String = hex.chars().filter(|c| !matches!(c, ':' | ' ')).collect();
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(Error::decode(at, format!("malformed hex {hex:?}")));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::decode(at, format!("hex {hex:?}: {e}")))
        })
        .collect()
}

/**
 * Generate a range that includes the provided oid, and all of its children, for
 * use with the BTreeMap range() walker.
 */
fn range_for_oid(oid: Oid) -> (Bound<Oid>, Bound<Oid>) {
    let arcs = oid.as_slice();
    let (last, parent) = arcs.split_last().expect("OIDs are never empty");

    /*
     * The first OID past the subtree is the next sibling of the root.  If
     * there is no such sibling (the root ends in u32::MAX or is a single
     * arc at the top of the tree), leave the range open at the top.
     */
    let upper = last
        .checked_add(1)
        .and_then(|next| {
            let mut sibling = parent.to_vec();
            sibling.push(next);
            Oid::from_slice(&sibling).ok()
        })
        .map(Bound::Excluded)
        .unwrap_or(Bound::Unbounded);

    (Bound::Included(oid), upper)
}
