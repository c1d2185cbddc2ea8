/*
 * Copyright 2024 Oxide Computer Company
 */

/*
 * Polling many devices at once.  Each device poll is independent; a
 * device that fails is reported in its own outcome and never aborts the
 * others.
 */

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::{DeviceConfig, PollerConfig};
use crate::document::DeviceDocument;
use crate::manufacturer::{ManufacturerLookup, OuiRegistry};
use crate::vendor::backend_for;
use crate::{Client, Snapshot};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollResult {
    Document(DeviceDocument),
    /**
     * The error chain, outermost first.
     */
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct PollOutcome {
    pub device: String,
    #[serde(flatten)]
    pub result: PollResult,
}

impl PollOutcome {
    pub fn document(&self) -> Option<&DeviceDocument> {
        match &self.result {
            PollResult::Document(d) => Some(d),
            PollResult::Error(_) => None,
        }
    }
}

/**
 * Load the OUI registry named by the configuration, if any.
 */
pub fn load_registry(
    config: &PollerConfig,
) -> crate::Result<Option<OuiRegistry>> {
    config.manufacturers.as_ref().map(OuiRegistry::load).transpose()
}

/**
 * Poll every configured device, at most "max_concurrency" at a time.  The
 * outcomes are in configuration order.
 */
pub async fn poll_all(
    config: &PollerConfig,
    registry: Option<Arc<OuiRegistry>>,
) -> Vec<PollOutcome> {
    let limit = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    let mut outcomes: Vec<PollOutcome> = config
        .devices
        .iter()
        .map(|d| PollOutcome {
            device: d.name.clone(),
            result: PollResult::Error("poll did not complete".into()),
        })
        .collect();

    for (pos, device) in config.devices.iter().cloned().enumerate() {
        let limit = Arc::clone(&limit);
        let registry = registry.clone();
        let span = tracing::info_span!(
            "poll",
            device = %device.name,
            host = %device.host,
            vendor = %device.vendor
        );

        tasks.spawn(
            async move {
                let res = match limit.acquire_owned().await {
                    Ok(_permit) => {
                        poll_device(&device, registry.as_deref()).await
                    }
                    Err(e) => Err(anyhow!(e)),
                };
                (pos, res)
            }
            .instrument(span),
        );
    }

    while let Some(joined) = tasks.join_next().await {
        let (pos, res) = match joined {
            Ok(x) => x,
            Err(e) => {
                tracing::error!(error = %e, "poll task failed");
                continue;
            }
        };

        outcomes[pos].result = match res {
            Ok(doc) => PollResult::Document(doc),
            Err(e) => {
                let error = format!("{e:#}");
                tracing::warn!(
                    device = %outcomes[pos].device,
                    %error,
                    "poll failed"
                );
                PollResult::Error(error)
            }
        };
    }

    outcomes
}

/**
 * Poll one device, from its snapshot file if it has one, else over SNMP.
 */
pub async fn poll_device(
    device: &DeviceConfig,
    registry: Option<&OuiRegistry>,
) -> anyhow::Result<DeviceDocument> {
    let backend = backend_for(device.vendor);
    let lookup = registry.map(|r| r as &dyn ManufacturerLookup);

    if let Some(path) = &device.snapshot {
        let snapshot = Snapshot::load(path)?;
        tracing::debug!(
            path = %path.display(),
            values = snapshot.len(),
            "replaying"
        );
        return backend
            .to_document(&snapshot, lookup, false)
            .await
            .context("decoding snapshot");
    }

    let ip = resolve(device).await?;
    let client = Client::builder()
        .port(device.port)
        .community(&device.community)
        .timeout(device.timeout())
        .retries(device.retries)
        .build(ip)
        .await
        .context("creating SNMP client")?;

    let doc = backend
        .to_document(&client, lookup, device.autowalk)
        .await
        .with_context(|| format!("polling {}", client.target()))?;

    tracing::info!(
        interfaces = doc.interfaces.len(),
        neighbors = doc.neighbors.len(),
        "polled"
    );
    Ok(doc)
}

async fn resolve(device: &DeviceConfig) -> anyhow::Result<IpAddr> {
    if let Ok(ip) = device.host.parse() {
        return Ok(ip);
    }

    tokio::net::lookup_host((device.host.as_str(), device.port))
        .await
        .with_context(|| format!("resolving {}", device.host))?
        .next()
        .map(|sa| sa.ip())
        .ok_or_else(|| anyhow!("{} has no addresses", device.host))
}
