//! Snapshot comparison.
//!
//! Compares free space between two snapshots, matching volumes by drive:
//! - Grew / Shrank when free space changed on a volume present in both
//! - New / Gone when a volume appears in only one snapshot
//! - Net change summed over volumes present in both

use chrono::{DateTime, FixedOffset};

use crate::snapshot::{Snapshot, VolumeInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    Grew,
    Shrank,
    New,
    Gone,
}

#[derive(Debug, Clone)]
pub struct DiffEntry {
    pub drive: String,
    pub old_free: u64,
    pub new_free: u64,
    pub delta: i64,
    pub diff_type: DiffType,
}

#[derive(Debug)]
pub struct SnapshotDiff {
    pub entries: Vec<DiffEntry>,
    /// Change in free space across volumes measured in both snapshots.
    pub net_change: i64,
    pub from_timestamp: DateTime<FixedOffset>,
}

fn signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// Entries follow the order of `to`, then volumes gone since `from`.
pub fn compare_snapshots(from: &Snapshot, to: &Snapshot) -> SnapshotDiff {
    let mut entries = Vec::new();
    let mut net_change: i64 = 0;

    for new in &to.disks {
        match from.volume(&new.drive) {
            Some(old) => {
                let delta = signed(new.free_space).saturating_sub(signed(old.free_space));
                if delta == 0 {
                    continue;
                }
                let diff_type = if delta > 0 { DiffType::Grew } else { DiffType::Shrank };
                entries.push(entry(new, old.free_space, new.free_space, delta, diff_type));
                net_change = net_change.saturating_add(delta);
            }
            None => {
                entries.push(entry(new, 0, new.free_space, signed(new.free_space), DiffType::New));
            }
        }
    }

    for old in &from.disks {
        if to.volume(&old.drive).is_none() {
            entries.push(entry(old, old.free_space, 0, -signed(old.free_space), DiffType::Gone));
        }
    }

    SnapshotDiff {
        entries,
        net_change,
        from_timestamp: from.timestamp,
    }
}

fn entry(
    volume: &VolumeInfo,
    old_free: u64,
    new_free: u64,
    delta: i64,
    diff_type: DiffType,
) -> DiffEntry {
    DiffEntry {
        drive: volume.drive.clone(),
        old_free,
        new_free,
        delta,
        diff_type,
    }
}
