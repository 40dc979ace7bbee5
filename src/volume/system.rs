//! Volume source backed by `sysinfo`.
//!
//! Enumeration lists every mounted disk through `sysinfo` and keeps the fixed
//! local ones. A probe queries only its own mount point, so a hung removable
//! or network mount cannot stall the probes of other volumes.

use std::path::Path;

use sysinfo::Disks;
use tracing::debug;

use super::{Capacity, ProbeError, VolumeSource};
use crate::error::Result;
use crate::platform;

pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn name(&self) -> &'static str {
        "sysinfo"
    }

    fn list_fixed_volumes(&self) -> Result<Vec<String>> {
        let disks = Disks::new_with_refreshed_list();
        let mut volumes: Vec<String> = Vec::new();

        for disk in disks.list() {
            let fs = disk.file_system().to_string_lossy();
            let mount = disk.mount_point().to_string_lossy().to_string();

            if !platform::is_fixed_volume(&fs, disk.is_removable()) {
                debug!(volume = %mount, filesystem = %fs, "skipping non-fixed volume");
                continue;
            }

            if !volumes.contains(&mount) {
                volumes.push(mount);
            }
        }

        Ok(volumes)
    }

    fn probe(&self, volume: &str) -> std::result::Result<Capacity, ProbeError> {
        let stats = fs2::statvfs(Path::new(volume)).map_err(|e| ProbeError::Unavailable {
            volume: volume.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Capacity {
            total: stats.total_space(),
            free: stats.available_space(),
        })
    }
}
