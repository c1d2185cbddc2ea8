/*
 * Copyright 2024 Oxide Computer Company
 */

use csnmp::SnmpClientError;
use thiserror::Error;

use crate::Oid;

/**
 * Errors produced while addressing, fetching and decoding device data.
 */
#[derive(Debug, Error)]
pub enum Error {
    /**
     * An OID argument was of a shape that can never name an OID (a map, a
     * boolean, a bare number, ...).
     */
    #[error(
        "invalid OID argument: expected a dotted string or a sequence, got {0}"
    )]
    InvalidOidType(&'static str),

    /**
     * An OID argument had the right shape but a malformed component.
     */
    #[error("invalid OID {0:?}")]
    InvalidOid(String),

    /**
     * The transport worked, but the device has no value at this OID.
     */
    #[error("no such OID {0}")]
    NoSuchOid(Oid),

    #[error("misconfigured backend: {0}")]
    MisconfiguredBackend(String),

    /**
     * Network, timeout or authentication failure talking to the agent.
     */
    #[error("SNMP transport error: {0}")]
    Transport(#[source] SnmpClientError),

    #[error("cannot decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /**
     * Classify a csnmp client failure for a request about "oid".  A failed
     * binding means the agent answered with noSuchObject, noSuchInstance or
     * endOfMibView; anything else is a transport problem.
     */
    pub(crate) fn from_snmp(oid: Oid, e: SnmpClientError) -> Error {
        match e {
            SnmpClientError::FailedBinding { .. } => Error::NoSuchOid(oid),
            e => Error::Transport(e),
        }
    }

    pub(crate) fn decode(
        what: impl Into<String>,
        reason: impl ToString,
    ) -> Error {
        Error::Decode { what: what.into(), reason: reason.to_string() }
    }

    pub fn is_no_such_oid(&self) -> bool {
        matches!(self, Error::NoSuchOid(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let oid: Oid = "1.3.6.1.2.1.1.5.0".parse().unwrap();

        let e = Error::from_snmp(oid, SnmpClientError::TimedOut);
        assert!(e.is_transport());
        assert!(!e.is_no_such_oid());

        let e = Error::NoSuchOid(oid);
        assert!(e.is_no_such_oid());
        assert_eq!(e.to_string(), "no such OID 1.3.6.1.2.1.1.5.0");
    }
}
