/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Normalised device information from SNMP agents.
 *
 * A single SNMP walk (or a frozen Snapshot of one) is turned
 * into a DeviceDocument: identity, uptime, resources,
 * per-interface records correlated across the `ifTable` columns, and the
 * neighbour cache.  Vendor differences live in vendor as data.
 */

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    ops::Deref,
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
/*
 * Re-export the csnmp module we're using:
 */
pub use csnmp;
use csnmp::ObjectIdentifier;
use serde::{de::Visitor, Deserialize, Deserializer};
use tokio::sync::Mutex;

pub mod config;
pub mod decode;
pub mod device;
pub mod document;
pub mod error;
pub mod index;
pub mod interfaces;
pub mod logging;
pub mod manufacturer;
pub mod mib;
pub mod poller;
pub mod probe;
pub mod snapshot;
pub mod transport;
pub mod value;
pub mod vendor;

pub use document::DeviceDocument;
pub use error::{Error, Result};
pub use snapshot::Snapshot;
pub use transport::{Binding, Transport, TransportExt};
pub use value::Value;
pub use vendor::{backend_for, DeviceProber, Vendor};

#[derive(Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Oid(ObjectIdentifier);

impl std::fmt::Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_args!("Oid({})", self).fmt(f)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OidVisitor)
    }
}

struct OidVisitor;

impl<'de> Visitor<'de> for OidVisitor {
    type Value = Oid;

    fn expecting(
        &self,
        formatter: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        formatter.write_str("an OID (a dotted string or a sequence of u32)")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(|e| E::custom(format!("{e}")))
    }

    fn visit_seq<A>(
        self,
        mut seq: A,
    ) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut nums: Vec<u32> =
            Vec::with_capacity(seq.size_hint().unwrap_or(16));

        while let Some(val) = seq.next_element()? {
            nums.push(val);
        }

        Oid::from_slice(&nums).map_err(serde::de::Error::custom)
    }
}

impl Deref for Oid {
    type Target = ObjectIdentifier;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Oid::from_slice(&decode::parse_oid_text(s)?)
    }
}

impl From<ObjectIdentifier> for Oid {
    fn from(oid: ObjectIdentifier) -> Self {
        Oid(oid)
    }
}

impl Oid {
    pub fn from_slice(arcs: &[u32]) -> Result<Oid> {
        if arcs.is_empty() {
            return Err(Error::InvalidOid(String::new()));
        }

        ObjectIdentifier::try_from(arcs)
            .map(Oid)
            .map_err(|e| Error::InvalidOid(format!("{arcs:?}: {e}")))
    }

    /**
     * For the OID constants in the mib module, which are short and
     * well-formed by construction.
     */
    pub(crate) fn known(arcs: &[u32]) -> Oid {
        Oid::from_slice(arcs).expect("static OID")
    }

    pub fn child(&self, arc: u32) -> Result<Oid> {
        self.extend(&[arc])
    }

    pub fn extend(&self, suffix: &[u32]) -> Result<Oid> {
        let mut arcs = self.as_slice().to_vec();
        arcs.extend_from_slice(suffix);
        Oid::from_slice(&arcs)
    }

    /**
     * The arcs that follow "root", if this OID lies strictly beneath it.
     */
    pub fn suffix(&self, root: Oid) -> Option<&[u32]> {
        let (me, root) = (self.as_slice(), root.as_slice());
        if me.len() > root.len() && me.starts_with(root) {
            Some(&me[root.len()..])
        } else {
            None
        }
    }

    pub fn is_under(&self, root: Oid) -> bool {
        self.suffix(root).is_some()
    }

    pub fn last_arc(&self) -> Option<u32> {
        self.as_slice().last().copied()
    }
}

/**
 * A live SNMPv2c agent.  csnmp matches replies to requests on a single
 * socket one exchange at a time, so requests made through one Client are
 * serialised; concurrent readers queue on the lock.
 */
pub struct Client {
    snmp: Mutex<csnmp::Snmp2cClient>,
    target: SocketAddr,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder {
            bind_address: None,
            target_port: 161,
            community: b"public".to_vec(),
            timeout: Duration::from_secs(5),
            retries: 0,
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl Transport for Client {
    async fn get(&self, oid: Oid) -> Result<Value> {
        self.snmp
            .lock()
            .await
            .get(oid.0)
            .await
            .map(Value)
            .map_err(|e| Error::from_snmp(oid, e))
    }

    async fn next(&self, oid: Oid) -> Result<Vec<Binding>> {
        let res = self.snmp.lock().await.walk(oid.0).await;
        match res {
            Ok(res) => Ok(res
                .into_iter()
                .map(|(k, v)| (Oid(k), Value(v)))
                .filter(|(k, _)| k.is_under(oid))
                .collect()),
            /*
             * An empty subtree is not a failure; the caller sees no rows.
             */
            Err(e) => match Error::from_snmp(oid, e) {
                Error::NoSuchOid(_) => Ok(Vec::new()),
                e => Err(e),
            },
        }
    }

    async fn walk(&self, root: Oid) -> Result<Snapshot> {
        let res = self.snmp.lock().await.walk_bulk(root.0, 63).await;
        let res = match res {
            Ok(res) => res,
            Err(e) => match Error::from_snmp(root, e) {
                Error::NoSuchOid(_) => Default::default(),
                e => return Err(e),
            },
        };

        tracing::debug!(
            target = %self.target,
            %root,
            values = res.len(),
            "walked"
        );

        Ok(res.into_iter().map(|(k, v)| (Oid(k), Value(v))).collect())
    }
}

pub struct ClientBuilder {
    bind_address: Option<SocketAddr>,
    target_port: u16,
    community: Vec<u8>,
    timeout: Duration,
    retries: usize,
}

impl ClientBuilder {
    pub fn port(&mut self, port: u16) -> &mut Self {
        self.target_port = port;
        self
    }

    pub fn community<C: AsRef<[u8]>>(&mut self, community: C) -> &mut Self {
        self.community = community.as_ref().to_vec();
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(&mut self, retries: usize) -> &mut Self {
        self.retries = retries;
        self
    }

    pub fn bind_address(&mut self, bind: SocketAddr) -> &mut Self {
        self.bind_address = Some(bind);
        self
    }

    pub async fn build(&self, target_ip: IpAddr) -> Result<Client> {
        /*
         * Generate the socket address for the target:
         */
        let target = SocketAddr::new(target_ip, self.target_port);

        /*
         * Pick a local bind address based on the address family if one was not
         * provided:
         */
        let bind = if let Some(ba) = self.bind_address {
            ba
        } else {
            SocketAddr::new(
                match target {
                    SocketAddr::V4(_) => Ipv4Addr::UNSPECIFIED.into(),
                    SocketAddr::V6(_) => Ipv6Addr::UNSPECIFIED.into(),
                },
                0,
            )
        };

        let snmp = csnmp::Snmp2cClient::new(
            target,
            self.community.clone(),
            Some(bind),
            Some(self.timeout),
            self.retries,
        )
        .await
        .map_err(Error::Transport)?;

        Ok(Client { snmp: Mutex::new(snmp), target })
    }
}
