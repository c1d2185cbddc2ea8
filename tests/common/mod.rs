/*
 * Copyright 2024 Oxide Computer Company
 */

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use devscope::csnmp::message::{
    BindingValue, ErrorStatus, InnerPdu, Snmp2cMessage, Snmp2cPdu,
    VariableBinding,
};
use devscope::csnmp::{ObjectValue, SnmpClientError};
use tokio::net::UdpSocket;
use devscope::{Binding, Error, Oid, Result, Snapshot, Transport, Value};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{name}.json"))
}

pub fn fixture(name: &str) -> Snapshot {
    Snapshot::load(fixture_path(name)).unwrap()
}

/**
 * A fake agent over a snapshot that counts the requests it serves.  It can
 * also be made unreachable, or to answer next() in reverse order.
 */
pub struct Counting {
    inner: Snapshot,
    unreachable: bool,
    reversed: bool,
    pub gets: AtomicUsize,
    pub nexts: AtomicUsize,
    pub walks: AtomicUsize,
}

impl Counting {
    pub fn new(inner: Snapshot) -> Counting {
        Counting {
            inner,
            unreachable: false,
            reversed: false,
            gets: AtomicUsize::new(0),
            nexts: AtomicUsize::new(0),
            walks: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Counting {
        Counting { unreachable: true, ..Counting::new(Snapshot::default()) }
    }

    pub fn reversed(inner: Snapshot) -> Counting {
        Counting { reversed: true, ..Counting::new(inner) }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn nexts(&self) -> usize {
        self.nexts.load(Ordering::SeqCst)
    }

    pub fn walks(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.unreachable {
            Err(Error::Transport(SnmpClientError::TimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for Counting {
    async fn get(&self, oid: Oid) -> Result<Value> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get(oid).await
    }

    async fn next(&self, oid: Oid) -> Result<Vec<Binding>> {
        self.nexts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut rows = self.inner.next(oid).await?;
        if self.reversed {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn walk(&self, root: Oid) -> Result<Snapshot> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.walk(root).await
    }
}

/**
 * A loopback SNMPv2c agent that answers GET and GETNEXT from a snapshot.
 * It serves until the test's runtime shuts down.
 */
pub async fn spawn_agent(snapshot: Snapshot) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 65536];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(request) = Snmp2cMessage::try_from_bytes(&buf[..len])
            else {
                continue;
            };
            let Some(response) = answer(&snapshot, request) else {
                continue;
            };
            let bytes = response.to_bytes().unwrap();
            socket.send_to(&bytes, peer).await.unwrap();
        }
    });

    addr
}

fn answer(
    snapshot: &Snapshot,
    request: Snmp2cMessage,
) -> Option<Snmp2cMessage> {
    let Snmp2cMessage { version, community, pdu } = request;
    let (pdu, next) = match pdu {
        Snmp2cPdu::GetRequest(pdu) => (pdu, false),
        Snmp2cPdu::GetNextRequest(pdu) => (pdu, true),
        _ => return None,
    };

    let variable_bindings = pdu
        .variable_bindings
        .iter()
        .map(|b| {
            let found = if next {
                snapshot
                    .iter()
                    .find(|(oid, _)| ***oid > b.name)
                    .map(|(oid, v)| (**oid, ObjectValue::clone(v)))
            } else {
                snapshot
                    .value(&Oid::from(b.name))
                    .map(|v| (b.name, ObjectValue::clone(v)))
            };

            match found {
                Some((name, v)) => {
                    VariableBinding { name, value: BindingValue::Value(v) }
                }
                None if next => VariableBinding {
                    name: b.name,
                    value: BindingValue::EndOfMibView,
                },
                None => VariableBinding {
                    name: b.name,
                    value: BindingValue::NoSuchInstance,
                },
            }
        })
        .collect();

    Some(Snmp2cMessage {
        version,
        community,
        pdu: Snmp2cPdu::Response(InnerPdu {
            request_id: pdu.request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            variable_bindings,
        }),
    })
}
