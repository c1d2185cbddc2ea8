/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * The seam between the engine and whatever answers SNMP requests: a live
 * Client, a frozen Snapshot, or a test double.
 */

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::de::{value::MapDeserializer, DeserializeOwned};

use crate::{Error, Oid, Result, Snapshot, Value};

/**
 * An (OID, value) pair from a GETNEXT traversal.
 */
pub type Binding = (Oid, Value);

#[async_trait]
pub trait Transport: Send + Sync {
    /**
     * Fetch exactly one value.  An absent object is Error::NoSuchOid, which
     * callers must be able to tell apart from Error::Transport.
     */
    async fn get(&self, oid: Oid) -> Result<Value>;

    /**
     * Every binding strictly beneath "oid", in lexicographic OID order.  An
     * empty subtree is an empty list, not an error.
     */
    async fn next(&self, oid: Oid) -> Result<Vec<Binding>>;

    /**
     * Bulk walk of a subtree, producing a snapshot the rest of a poll can
     * read from instead of the network.
     */
    async fn walk(&self, root: Oid) -> Result<Snapshot>;
}

/**
 * Accessors layered over the raw transport.
 */
#[async_trait]
pub trait TransportExt: Transport {
    /**
     * The text form of the value at "oid".
     */
    async fn get_value(&self, oid: Oid) -> Result<String> {
        self.get(oid).await.map(|v| v.as_text())
    }

    /**
     * Like get(), but an absent OID is None.  Transport failures are still
     * errors.
     */
    async fn get_optional(&self, oid: Oid) -> Result<Option<Value>> {
        match self.get(oid).await {
            Ok(v) => Ok(Some(v)),
            Err(Error::NoSuchOid(_)) => {
                tracing::debug!(%oid, "absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_u64(&self, oid: Oid) -> Result<u64> {
        let v = self.get(oid).await?;
        v.as_u64().ok_or_else(|| {
            Error::decode(
                oid.to_string(),
                format!("{v:?} is not an unsigned integer"),
            )
        })
    }

    async fn get_bytes(&self, oid: Oid) -> Result<Vec<u8>> {
        let v = self.get(oid).await?;
        v.as_bytes().map(<[u8]>::to_vec).ok_or_else(|| {
            Error::decode(
                oid.to_string(),
                format!("{v:?} is not an octet string"),
            )
        })
    }

    /**
     * Read several columns of a conceptual table and deserialise each row
     * into a "T", keyed by the row's index arcs.  "columns" pairs a column
     * number under "entry" with the field name it fills.  Rows missing a
     * required column, or whose values do not decode, are dropped.
     */
    async fn table<T>(
        &self,
        entry: Oid,
        columns: &[(u32, &'static str)],
    ) -> Result<BTreeMap<Vec<u32>, T>>
    where
        T: DeserializeOwned + Send,
    {
        let mut cells: BTreeMap<Vec<u32>, HashMap<&'static str, Value>> =
            BTreeMap::new();

        for &(column, name) in columns {
            let root = entry.child(column)?;
            for (oid, val) in self.next(root).await? {
                let Some(index) = oid.suffix(root) else {
                    continue;
                };
                cells.entry(index.to_vec()).or_default().insert(name, val);
            }
        }

        let mut out = BTreeMap::new();
        for (index, row) in cells {
            let de = MapDeserializer::<_, serde::de::value::Error>::new(
                row.iter().map(|(k, v)| (*k, v)),
            );
            match T::deserialize(de) {
                Ok(t) => {
                    out.insert(index, t);
                }
                Err(e) => {
                    tracing::debug!(%entry, ?index, error = %e, "skipping row");
                }
            }
        }

        Ok(out)
    }
}

impl<T: Transport + ?Sized> TransportExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Row {
        name: String,
        mtu: u32,
    }

    fn snap() -> Snapshot {
        let mut s = Snapshot::default();
        s.insert_str("1.3.6.1.2.1.2.2.1.2.1", Value::string("lo"));
        s.insert_str("1.3.6.1.2.1.2.2.1.2.2", Value::string("eth0"));
        s.insert_str("1.3.6.1.2.1.2.2.1.4.1", Value::integer(65536));
        s.insert_str("1.3.6.1.2.1.2.2.1.4.2", Value::integer(1500));
        s.insert_str("1.3.6.1.2.1.2.2.1.4.3", Value::integer(9000));
        s
    }

    #[tokio::test]
    async fn accessors() {
        let s = snap();
        let descr: Oid = "1.3.6.1.2.1.2.2.1.2".parse().unwrap();

        assert_eq!(s.get_value(descr.child(2).unwrap()).await.unwrap(), "eth0");
        let absent = s.get_optional(descr.child(9).unwrap()).await.unwrap();
        assert!(absent.is_none());
        assert!(s.get_u64(descr.child(2).unwrap()).await.is_err());
        assert!(matches!(
            s.get_value(descr.child(9).unwrap()).await,
            Err(Error::NoSuchOid(_))
        ));
    }

    #[tokio::test]
    async fn table_rows() {
        let s = snap();
        let entry: Oid = "1.3.6.1.2.1.2.2.1".parse().unwrap();

        let rows: BTreeMap<Vec<u32>, Row> =
            s.table(entry, &[(2, "name"), (4, "mtu")]).await.unwrap();

        /*
         * Row 3 has no name column and is dropped.
         */
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[&vec![2]], Row { name: "eth0".into(), mtu: 1500 });
    }
}
