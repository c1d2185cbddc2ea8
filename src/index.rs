/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Which `ifTable` rows a poll reports on.  The resolved list is the
 * alignment key for every interface reader: reader output position `i`
 * always belongs to index `i` of this list.
 */

use crate::{Error, Oid, Result, Transport};

#[derive(Clone, Debug, PartialEq)]
pub enum IndexStrategy {
    /**
     * One subtree walk of an index column (ifIndex, ifDescr, ...).  The
     * index is the last arc of each binding, kept in the order the agent
     * returned them.  A profile that never declared the column fails with
     * MisconfiguredBackend.
     */
    Table { root: Option<Oid> },

    /**
     * GET column.1, column.2, ... until more than "max_misses" consecutive
     * rows are absent or empty, or "limit" is reached.  For agents whose
     * index table cannot be trusted.
     */
    Probe { column: Oid, max_misses: u32, limit: u32 },
}

impl IndexStrategy {
    pub async fn resolve(&self, transport: &dyn Transport) -> Result<Vec<u32>> {
        match self {
            IndexStrategy::Table { root } => {
                let Some(root) = *root else {
                    return Err(Error::MisconfiguredBackend(
                        "no interface index table configured".into(),
                    ));
                };

                Ok(transport
                    .next(root)
                    .await?
                    .iter()
                    .filter_map(|(oid, _)| oid.suffix(root)?.last().copied())
                    .collect())
            }
            IndexStrategy::Probe { column, max_misses, limit } => {
                probe(transport, *column, *max_misses, *limit).await
            }
        }
    }
}

async fn probe(
    transport: &dyn Transport,
    column: Oid,
    max_misses: u32,
    limit: u32,
) -> Result<Vec<u32>> {
    let mut found = Vec::new();
    let mut misses = 0;

    for i in 1..=limit {
        let present = match transport.get(column.child(i)?).await {
            Ok(v) => !v.as_text().is_empty(),
            Err(Error::NoSuchOid(_)) => false,
            Err(e) => return Err(e),
        };

        if present {
            found.push(i);
            misses = 0;
        } else {
            misses += 1;
            if misses > max_misses {
                break;
            }
        }
    }

    tracing::trace!(%column, found = found.len(), "probed interface indices");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Binding, Snapshot, Value};
    use async_trait::async_trait;

    /*
     * Answers next() in a fixed, non-lexicographic order.
     */
    struct Shuffled(Vec<Binding>);

    #[async_trait]
    impl Transport for Shuffled {
        async fn get(&self, oid: Oid) -> Result<Value> {
            Err(Error::NoSuchOid(oid))
        }

        async fn next(&self, _oid: Oid) -> Result<Vec<Binding>> {
            Ok(self.0.clone())
        }

        async fn walk(&self, _root: Oid) -> Result<Snapshot> {
            Ok(self.0.iter().cloned().collect())
        }
    }

    fn descr() -> Oid {
        "1.3.6.1.2.1.2.2.1.2".parse().unwrap()
    }

    #[tokio::test]
    async fn table_keeps_returned_order() {
        let t = Shuffled(
            [7, 2, 12]
                .into_iter()
                .map(|i| (descr().child(i).unwrap(), Value::string("x")))
                .collect(),
        );

        let idx = IndexStrategy::Table { root: Some(descr()) }
            .resolve(&t)
            .await
            .unwrap();
        assert_eq!(idx, vec![7, 2, 12]);
    }

    #[tokio::test]
    async fn table_empty_and_unconfigured() {
        let s = Snapshot::default();

        let idx = IndexStrategy::Table { root: Some(descr()) }
            .resolve(&s)
            .await
            .unwrap();
        assert!(idx.is_empty());

        let r = IndexStrategy::Table { root: None }.resolve(&s).await;
        assert!(matches!(r, Err(Error::MisconfiguredBackend(_))));
    }

    #[tokio::test]
    async fn probe_soft_eof() {
        let mut s = Snapshot::default();
        let rows = [(1, "lo"), (2, "eth0"), (4, ""), (5, "ath0"), (9, "br0")];
        for (i, name) in rows {
            s.insert(descr().child(i).unwrap(), Value::string(name));
        }

        let strategy =
            IndexStrategy::Probe { column: descr(), max_misses: 2, limit: 32 };
        assert_eq!(strategy.resolve(&s).await.unwrap(), vec![1, 2, 5]);

        let strategy =
            IndexStrategy::Probe { column: descr(), max_misses: 3, limit: 32 };
        assert_eq!(strategy.resolve(&s).await.unwrap(), vec![1, 2, 5, 9]);

        let strategy =
            IndexStrategy::Probe { column: descr(), max_misses: 8, limit: 2 };
        assert_eq!(strategy.resolve(&s).await.unwrap(), vec![1, 2]);
    }
}
