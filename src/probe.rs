/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * One poll of one device.  A Probe resolves the interface index list
 * once, then lets each column reader run at most once; later requests for
 * the same column are served from the probe.  It is built per poll and
 * dropped with it, so nothing is shared between polls.
 */

use tokio::sync::OnceCell;

use crate::device;
use crate::document::{
    DeviceDocument, General, Interface, InterfaceType, Resources,
};
use crate::interfaces::{self, Columns};
use crate::manufacturer::ManufacturerLookup;
use crate::vendor::{Identity, Profile};
use crate::{decode, Error, Result, Transport};

pub struct Probe<'a> {
    transport: &'a dyn Transport,
    profile: &'a Profile,
    indices: OnceCell<Vec<u32>>,
    names: OnceCell<Vec<String>>,
    macs: OnceCell<Vec<String>>,
    mtus: OnceCell<Vec<u64>>,
    speeds: OnceCell<Vec<u64>>,
    up: OnceCell<Vec<bool>>,
    traffic: OnceCell<Vec<(u64, u64)>>,
    types: OnceCell<Vec<InterfaceType>>,
}

/**
 * Fold the "field not available" outcomes into None.  Only transport and
 * configuration failures remain errors.
 */
pub(crate) fn optional<T>(what: &str, res: Result<T>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e @ (Error::NoSuchOid(_) | Error::Decode { .. })) => {
            tracing::debug!(field = what, reason = %e, "field unavailable");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl<'a> Probe<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        profile: &'a Profile,
    ) -> Probe<'a> {
        Probe {
            transport,
            profile,
            indices: OnceCell::new(),
            names: OnceCell::new(),
            macs: OnceCell::new(),
            mtus: OnceCell::new(),
            speeds: OnceCell::new(),
            up: OnceCell::new(),
            traffic: OnceCell::new(),
            types: OnceCell::new(),
        }
    }

    pub async fn indices(&self) -> Result<&[u32]> {
        self.indices
            .get_or_try_init(|| self.profile.index.resolve(self.transport))
            .await
            .map(Vec::as_slice)
    }

    pub async fn names(&self) -> Result<&[String]> {
        let idx = self.indices().await?;
        self.names
            .get_or_try_init(|| interfaces::read_names(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn macs(&self) -> Result<&[String]> {
        let idx = self.indices().await?;
        self.macs
            .get_or_try_init(|| interfaces::read_macs(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn mtus(&self) -> Result<&[u64]> {
        let idx = self.indices().await?;
        self.mtus
            .get_or_try_init(|| interfaces::read_mtus(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn speeds(&self) -> Result<&[u64]> {
        let idx = self.indices().await?;
        self.speeds
            .get_or_try_init(|| interfaces::read_speeds(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn up(&self) -> Result<&[bool]> {
        let idx = self.indices().await?;
        self.up
            .get_or_try_init(|| interfaces::read_up(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn traffic(&self) -> Result<&[(u64, u64)]> {
        let idx = self.indices().await?;
        self.traffic
            .get_or_try_init(|| interfaces::read_traffic(self.transport, idx))
            .await
            .map(Vec::as_slice)
    }

    pub async fn types(&self) -> Result<&[InterfaceType]> {
        let idx = self.indices().await?;
        self.types
            .get_or_try_init(|| {
                let codes = self.profile.if_types;
                interfaces::read_types(self.transport, idx, codes)
            })
            .await
            .map(Vec::as_slice)
    }

    /**
     * All seven columns.  The index list is frozen first; the readers then
     * run concurrently since each covers its own subtree.
     */
    pub async fn columns(&self) -> Result<Columns> {
        let indices = self.indices().await?;

        let (names, macs, mtus, speeds, up, traffic, types) = tokio::try_join!(
            self.names(),
            self.macs(),
            self.mtus(),
            self.speeds(),
            self.up(),
            self.traffic(),
            self.types()
        )?;

        Ok(Columns {
            indices: indices.to_vec(),
            names: names.to_vec(),
            macs: macs.to_vec(),
            mtus: mtus.to_vec(),
            speeds: speeds.to_vec(),
            up: up.to_vec(),
            traffic: traffic.to_vec(),
            types: types.to_vec(),
        })
    }

    pub async fn interfaces(&self) -> Result<Vec<Interface>> {
        let columns = self.columns().await?;
        let indices = &columns.indices;
        let radio_table = self.profile.radios;

        let (addresses, radios) = tokio::try_join!(
            interfaces::read_addresses(self.transport, indices),
            interfaces::read_radios(self.transport, radio_table, indices)
        )?;

        interfaces::assemble(columns, addresses, &radios)
    }

    pub async fn uptime(&self) -> Result<Option<u64>> {
        optional("uptime", device::uptime(self.transport).await)
    }

    pub async fn local_time(&self) -> Result<Option<i64>> {
        let Some(oid) = self.profile.local_time else {
            return Ok(None);
        };
        optional("local_time", device::local_time(self.transport, oid).await)
    }

    pub async fn manufacturer(
        &self,
        lookup: Option<&dyn ManufacturerLookup>,
    ) -> Result<Option<String>> {
        let Some(lookup) = lookup else {
            return Ok(None);
        };
        Ok(device::manufacturer(self.macs().await?, lookup))
    }

    pub async fn general(
        &self,
        identity: Identity,
        lookup: Option<&dyn ManufacturerLookup>,
    ) -> Result<General> {
        let (uptime, local_time, manufacturer) = tokio::try_join!(
            self.uptime(),
            self.local_time(),
            self.manufacturer(lookup)
        )?;

        Ok(General {
            hostname: identity.hostname,
            os: identity.os,
            os_version: identity.os_version,
            model: identity.model,
            manufacturer,
            uptime,
            uptime_tuple: uptime.map(decode::uptime_tuple),
            local_time,
        })
    }

    pub async fn resources(&self) -> Result<Resources> {
        let p = self.profile;
        device::resources(self.transport, p.memory, p.load, p.cpu_table).await
    }

    pub async fn document(
        &self,
        identity: Identity,
        lookup: Option<&dyn ManufacturerLookup>,
    ) -> Result<DeviceDocument> {
        let (general, resources, interfaces, neighbors) = tokio::try_join!(
            self.general(identity, lookup),
            self.resources(),
            self.interfaces(),
            device::neighbors(self.transport)
        )?;

        Ok(DeviceDocument {
            kind: DeviceDocument::KIND,
            general,
            resources,
            interfaces,
            neighbors,
        })
    }
}
