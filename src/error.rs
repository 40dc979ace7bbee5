//! Error types for disktrend.
//!
//! Per-volume probe failures live in [`crate::volume::ProbeError`] and never
//! escape the probe scheduler. Everything here is fatal to the operation that
//! returned it, except `StorePersist` which the capture cycle reports alongside
//! an otherwise successful measurement.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to list volumes: {0}")]
    Enumeration(String),

    #[error("no drives found")]
    NoVolumesMeasured,

    #[error("capture abandoned before all probes settled")]
    CaptureAbandoned,

    #[error("failed to read history file {path:?}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {path:?} is malformed: {source}")]
    StoreMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write history file {path:?}: {source}")]
    StorePersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_volumes_message_matches_cli_output() {
        assert_eq!(Error::NoVolumesMeasured.to_string(), "no drives found");
    }

    #[test]
    fn persist_failure_names_the_file() {
        let err = Error::StorePersist {
            path: PathBuf::from("/tmp/history.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "failed to write history file \"/tmp/history.json\": denied"
        );
    }
}
