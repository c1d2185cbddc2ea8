/*
 * Copyright 2024 Oxide Computer Company
 */

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::{Error, Result};

/**
 * Resolves the organisation that owns a MAC address.
 */
pub trait ManufacturerLookup: Send + Sync {
    fn lookup(&self, mac: &str) -> Option<&str>;
}

/**
 * An immutable table from OUI (the first three octets of a MAC, as six
 * upper-case hex digits) to organisation name.  Load it once and share it
 * by reference.
 */
#[derive(Debug, Clone, Default)]
pub struct OuiRegistry {
    entries: HashMap<String, String>,
}

impl OuiRegistry {
    pub fn from_pairs<I, K, V>(pairs: I) -> OuiRegistry
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .filter_map(|(k, v)| Some((oui(k.as_ref())?, v.into())))
            .collect();

        OuiRegistry { entries }
    }

    /**
     * Parse a JSON object of OUI to organisation name.  Keys may be written
     * in any of the forms lookup() accepts.
     */
    pub fn from_json(json: &str) -> Result<OuiRegistry> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let reg =
            OuiRegistry::from_pairs(raw.iter().map(|(k, v)| (k, v.as_str())));
        if reg.len() != raw.len() {
            tracing::debug!(
                dropped = raw.len() - reg.len(),
                "ignoring malformed OUI keys"
            );
        }
        Ok(reg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<OuiRegistry> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let reg = OuiRegistry::from_json(&content).map_err(|e| {
            Error::Config(format!("manufacturers {}: {e}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            entries = reg.len(),
            "loaded OUI registry"
        );
        Ok(reg)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ManufacturerLookup for OuiRegistry {
    fn lookup(&self, mac: &str) -> Option<&str> {
        self.entries.get(&oui(mac)?).map(String::as_str)
    }
}

/**
 * The OUI of a MAC address in any common notation: colon, dash or dot
 * separated, or bare hex, in either case.
 */
fn oui(mac: &str) -> Option<String> {
    let hex: String = mac
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.' | ' '))
        .take(6)
        .collect();

    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hex.to_ascii_uppercase())
    } else {
        None
    }
}
