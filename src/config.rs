/*
 * Copyright 2024 Oxide Computer Company
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::vendor::Vendor;
use crate::{Error, Result};

/**
 * Log output format.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /**
     * A tracing filter directive; RUST_LOG takes precedence.
     */
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/**
 * One SNMP agent to poll.  If "snapshot" names a JSON snapshot file, the
 * device is replayed from it and never contacted.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_community")]
    pub community: String,
    pub vendor: Vendor,
    #[serde(default = "default_true")]
    pub autowalk: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

fn default_port() -> u16 {
    161
}

fn default_community() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_retries() -> usize {
    1
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /**
     * Upper bound on devices polled at once.
     */
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /**
     * A JSON object mapping OUI prefixes to organisation names.
     */
    #[serde(default)]
    pub manufacturers: Option<PathBuf>,

    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

fn default_max_concurrency() -> usize {
    8
}

/**
 * Load a configuration file in JSON5 format.
 */
pub fn load_config<T: for<'de> Deserialize<'de>>(
    path: impl AsRef<Path>,
) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("reading {}: {e}", path.display()))
    })?;

    json5::from_str(&content)
        .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
}

pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("parsing: {e}")))
}
