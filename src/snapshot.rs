use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::volume::ProbeError;

/// Capacity of one volume at capture time. Field names are the on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub drive: String,
    pub total_space: u64,
    pub free_space: u64,
    pub used_space: u64,
}

impl VolumeInfo {
    /// Builds a volume entry, rejecting probe results where free exceeds total.
    pub fn new(drive: impl Into<String>, total: u64, free: u64) -> Result<Self, ProbeError> {
        let drive = drive.into();
        if free > total {
            return Err(ProbeError::Corrupt { volume: drive, total, free });
        }

        Ok(VolumeInfo {
            drive,
            total_space: total,
            free_space: free,
            used_space: total - free,
        })
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_space == 0 {
            return 0.0;
        }
        self.used_space as f64 / self.total_space as f64 * 100.0
    }

    pub fn free_gb(&self) -> f64 {
        self.free_space as f64 / 1024.0 / 1024.0 / 1024.0
    }
}

/// All successfully probed volumes at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<FixedOffset>,
    pub disks: Vec<VolumeInfo>,
}

impl Snapshot {
    pub fn volume(&self, drive: &str) -> Option<&VolumeInfo> {
        self.disks.iter().find(|d| d.drive == drive)
    }
}

/// Append-only capture log. Storage order is capture order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

impl History {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}
