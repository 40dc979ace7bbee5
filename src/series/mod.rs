//! Per-volume series extraction.
//!
//! Projects the snapshot history onto one volume: free space in GB per
//! snapshot that contains it, a sparse label track for the time axis, and
//! summary statistics. Points follow storage order, not timestamp order, so
//! out-of-order or duplicate timestamps show up as recorded.

use chrono::{DateTime, Duration, FixedOffset};

use crate::snapshot::History;
use crate::util;

/// Fewer snapshots than this cannot show a trend.
pub const MIN_SNAPSHOTS: usize = 2;

/// A point gets a label when it is more than this far past the last label.
pub fn label_gap() -> Duration {
    Duration::hours(12)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub free_gb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub range: f64,
    /// Last value minus first value.
    pub delta: f64,
}

impl Stats {
    pub fn from_values(values: &[f64]) -> Option<Stats> {
        let (&first, &last) = (values.first()?, values.last()?);

        let mut min = first;
        let mut max = first;
        let mut sum = 0.0;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }

        Some(Stats {
            min,
            max,
            average: sum / values.len() as f64,
            range: max - min,
            delta: last - first,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSeries {
    pub volume: String,
    pub points: Vec<SeriesPoint>,
    /// Index-aligned with `points`; blank entries carry no label.
    pub labels: Vec<String>,
    pub stats: Stats,
}

impl VolumeSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.free_gb).collect()
    }

    /// Most recent value in storage order.
    pub fn current(&self) -> f64 {
        self.points.last().map(|p| p.free_gb).unwrap_or_default()
    }
}

/// Why no series could be built. A normal outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsufficientData {
    TooFewSnapshots(usize),
    VolumeAbsent(String),
}

impl InsufficientData {
    pub fn message(&self) -> String {
        match self {
            InsufficientData::TooFewSnapshots(_) => {
                "Not enough data for a graph yet. Run the program a few times to build history."
                    .to_string()
            }
            InsufficientData::VolumeAbsent(volume) => {
                format!("No recorded measurements for {volume}.")
            }
        }
    }
}

pub fn extract(history: &History, volume: &str) -> Result<VolumeSeries, InsufficientData> {
    if history.len() < MIN_SNAPSHOTS {
        return Err(InsufficientData::TooFewSnapshots(history.len()));
    }

    let points: Vec<SeriesPoint> = history
        .snapshots
        .iter()
        .filter_map(|snapshot| {
            snapshot.volume(volume).map(|disk| SeriesPoint {
                timestamp: snapshot.timestamp,
                free_gb: disk.free_gb(),
            })
        })
        .collect();

    let values: Vec<f64> = points.iter().map(|p| p.free_gb).collect();
    let stats = Stats::from_values(&values)
        .ok_or_else(|| InsufficientData::VolumeAbsent(volume.to_string()))?;

    Ok(VolumeSeries {
        volume: volume.to_string(),
        labels: label_track(&points),
        points,
        stats,
    })
}

/// Labels the first and last points plus any point more than the label gap
/// after the previously labeled one.
pub fn label_track(points: &[SeriesPoint]) -> Vec<String> {
    let gap = label_gap();
    let last_index = points.len().saturating_sub(1);
    let mut last_labeled: Option<DateTime<FixedOffset>> = None;

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let due = match last_labeled {
                None => true,
                Some(prev) => i == last_index || point.timestamp - prev > gap,
            };
            if due {
                last_labeled = Some(point.timestamp);
                util::format_label(&point.timestamp)
            } else {
                String::new()
            }
        })
        .collect()
}

/// Every drive seen anywhere in the history, sorted for a stable legend.
pub fn volume_ids(history: &History) -> Vec<String> {
    let mut ids: Vec<String> = history
        .snapshots
        .iter()
        .flat_map(|s| s.disks.iter().map(|d| d.drive.clone()))
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Snapshot, VolumeInfo};

    const GB: u64 = 1024 * 1024 * 1024;

    fn at(hours: i64) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-10T08:00:00+01:00").unwrap() + Duration::hours(hours)
    }

    fn snap(hours: i64, disks: &[(&str, u64)]) -> Snapshot {
        Snapshot {
            timestamp: at(hours),
            disks: disks
                .iter()
                .map(|(drive, free_gb)| VolumeInfo::new(*drive, 2000 * GB, free_gb * GB).unwrap())
                .collect(),
        }
    }

    fn history(snapshots: Vec<Snapshot>) -> History {
        History { snapshots }
    }

    #[test]
    fn fewer_than_two_snapshots_is_insufficient() {
        assert_eq!(
            extract(&History::default(), "C:\\"),
            Err(InsufficientData::TooFewSnapshots(0))
        );
        let one = history(vec![snap(0, &[("C:\\", 100)])]);
        assert_eq!(extract(&one, "C:\\"), Err(InsufficientData::TooFewSnapshots(1)));
        assert_eq!(extract(&one, "nope"), Err(InsufficientData::TooFewSnapshots(1)));
    }

    #[test]
    fn absent_volume_is_insufficient() {
        let h = history(vec![snap(0, &[("C:\\", 100)]), snap(1, &[("C:\\", 90)])]);
        assert_eq!(
            extract(&h, "D:\\"),
            Err(InsufficientData::VolumeAbsent("D:\\".to_string()))
        );
    }

    #[test]
    fn converts_to_binary_gigabytes() {
        let h = history(vec![snap(0, &[("C:\\", 100)]), snap(1, &[("C:\\", 90)])]);
        let series = extract(&h, "C:\\").unwrap();
        assert_eq!(series.values(), vec![100.0, 90.0]);
        assert_eq!(series.current(), 90.0);
    }

    #[test]
    fn snapshots_missing_the_volume_are_skipped() {
        let h = history(vec![
            snap(0, &[("C:\\", 100), ("D:\\", 5)]),
            snap(1, &[("D:\\", 6)]),
            snap(2, &[("C:\\", 95), ("D:\\", 7)]),
        ]);
        let series = extract(&h, "C:\\").unwrap();
        assert_eq!(series.values(), vec![100.0, 95.0]);
        assert_eq!(series.labels.len(), 2);
    }

    #[test]
    fn last_point_labeled_when_volume_missing_from_latest_snapshot() {
        let h = history(vec![
            snap(0, &[("C:\\", 100), ("D:\\", 5)]),
            snap(1, &[("C:\\", 99), ("D:\\", 6)]),
            snap(2, &[("C:\\", 98), ("D:\\", 7)]),
            snap(3, &[("D:\\", 8)]),
        ]);
        let series = extract(&h, "C:\\").unwrap();
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.labels, vec!["10.03 08:00", "", "10.03 10:00"]);
        assert_eq!(series.current(), 98.0);
    }

    #[test]
    fn labels_first_last_and_after_long_gaps() {
        let h = history(vec![
            snap(0, &[("C:\\", 10)]),
            snap(1, &[("C:\\", 10)]),
            snap(13, &[("C:\\", 10)]),
            snap(14, &[("C:\\", 10)]),
        ]);
        let series = extract(&h, "C:\\").unwrap();
        let labeled: Vec<bool> = series.labels.iter().map(|l| !l.is_empty()).collect();
        assert_eq!(labeled, vec![true, false, true, true]);
        assert_eq!(series.labels[0], "10.03 08:00");
        assert_eq!(series.labels[2], "10.03 21:00");
    }

    #[test]
    fn gap_of_exactly_twelve_hours_is_not_labeled() {
        let h = history(vec![
            snap(0, &[("C:\\", 10)]),
            snap(12, &[("C:\\", 10)]),
            snap(13, &[("C:\\", 10)]),
        ]);
        let labeled: Vec<bool> = extract(&h, "C:\\")
            .unwrap()
            .labels
            .iter()
            .map(|l| !l.is_empty())
            .collect();
        assert_eq!(labeled, vec![true, false, true]);
    }

    #[test]
    fn stats_over_series() {
        let stats = Stats::from_values(&[100.0, 80.0, 90.0]).unwrap();
        assert_eq!(stats.min, 80.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.average, 90.0);
        assert_eq!(stats.range, 20.0);
        assert_eq!(stats.delta, -10.0);
        assert!(Stats::from_values(&[]).is_none());
    }

    #[test]
    fn out_of_order_timestamps_keep_storage_order() {
        let h = history(vec![
            snap(10, &[("C:\\", 50)]),
            snap(0, &[("C:\\", 60)]),
            snap(10, &[("C:\\", 40)]),
        ]);
        let series = extract(&h, "C:\\").unwrap();
        assert_eq!(series.values(), vec![50.0, 60.0, 40.0]);
        assert_eq!(series.points[1].timestamp, at(0));
        assert_eq!(series.stats.delta, -10.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let h = history(vec![snap(0, &[("C:\\", 10)]), snap(20, &[("C:\\", 12)])]);
        assert_eq!(extract(&h, "C:\\"), extract(&h, "C:\\"));
    }

    #[test]
    fn volume_ids_sorted_and_unique() {
        let h = history(vec![
            snap(0, &[("D:\\", 1), ("C:\\", 1)]),
            snap(1, &[("C:\\", 1), ("E:\\", 1)]),
        ]);
        assert_eq!(volume_ids(&h), vec!["C:\\", "D:\\", "E:\\"]);
    }
}
