//! Volume enumeration and capacity queries.
//!
//! The scheduler only talks to a [`VolumeSource`]. The platform backend lives
//! in `system`; `fake` provides a scripted source for tests.

pub mod fake;
pub mod system;

use std::time::Duration;
use thiserror::Error;

use crate::error::Result;

/// Raw probe answer before validation into a [`crate::snapshot::VolumeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub total: u64,
    pub free: u64,
}

/// Per-volume failure. Absorbed by the scheduler: the volume is dropped from
/// the snapshot for this cycle only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("failed to get disk info for {volume}: {reason}")]
    Unavailable { volume: String, reason: String },

    #[error("timeout getting disk info for {volume} after {timeout:?}")]
    Timeout { volume: String, timeout: Duration },

    #[error("corrupt probe result for {volume}: free {free} exceeds total {total}")]
    Corrupt { volume: String, total: u64, free: u64 },

    #[error("probe task for {volume} aborted: {reason}")]
    Aborted { volume: String, reason: String },
}

impl ProbeError {
    pub fn volume(&self) -> &str {
        match self {
            ProbeError::Unavailable { volume, .. }
            | ProbeError::Timeout { volume, .. }
            | ProbeError::Corrupt { volume, .. }
            | ProbeError::Aborted { volume, .. } => volume,
        }
    }
}

/// Capability interface over the OS volume primitives.
///
/// Implementations are shared across probe threads, so they must be
/// `Send + Sync` and must not rely on per-call mutable state.
pub trait VolumeSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fixed local volumes only: removable, optical and network volumes are
    /// excluded.
    fn list_fixed_volumes(&self) -> Result<Vec<String>>;

    /// May block for an unbounded time; the scheduler enforces the deadline.
    fn probe(&self, volume: &str) -> std::result::Result<Capacity, ProbeError>;
}
