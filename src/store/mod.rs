//! JSON history storage.
//!
//! The whole history lives in one file that is read in full on every capture
//! and rewritten in full on every append:
//! - absent file: empty history, start fresh
//! - unreadable or unparsable file: surfaced, never silently replaced
//! - writes go to a temp file in the same directory, then rename over the target

pub mod diff;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::snapshot::{History, Snapshot};

/// File name used in the home directory, shared with earlier releases.
pub const HISTORY_FILE_NAME: &str = "disk_monitor_history.json";

/// Handle to the history file. Callers must run load, append and persist from
/// a single flow; the store does not lock against concurrent writers.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<History> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history yet, starting fresh");
                return Ok(History::default());
            }
            Err(source) => {
                return Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let history: History =
            serde_json::from_slice(&data).map_err(|source| Error::StoreMalformed {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), snapshots = history.len(), "history loaded");
        Ok(history)
    }

    /// Adds `snapshot` after every existing entry. Existing entries are never
    /// reordered or deduplicated.
    pub fn append(mut history: History, snapshot: Snapshot) -> History {
        history.snapshots.push(snapshot);
        history
    }

    pub fn persist(&self, history: &History) -> Result<()> {
        let data = serde_json::to_vec_pretty(history)?;
        self.write_atomic(&data).map_err(|source| Error::StorePersist {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), snapshots = history.len(), "history persisted");
        Ok(())
    }

    fn write_atomic(&self, data: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(data)?;
        tmp.as_file().set_permissions(self.target_permissions(&tmp)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Keeps the mode of an existing history file. A new file gets 0644
    /// rather than the 0600 temp file default.
    fn target_permissions(&self, tmp: &NamedTempFile) -> std::io::Result<fs::Permissions> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                #[allow(unused_mut)]
                let mut perms = tmp.as_file().metadata()?.permissions();
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    perms.set_mode(0o644);
                }
                Ok(perms)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VolumeInfo;
    use chrono::DateTime;
    use tempfile::TempDir;

    fn snapshot(ts: &str, free: u64) -> Snapshot {
        Snapshot {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            disks: vec![VolumeInfo::new("C:\\", 512_110_190_592, free).unwrap()],
        }
    }

    #[test]
    fn absent_file_loads_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_distinct_from_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{\"snapshots\": [oops").unwrap();

        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::StoreMalformed { .. }));
    }

    #[test]
    fn append_keeps_existing_order() {
        let history = History {
            snapshots: vec![
                snapshot("2024-01-02T00:00:00Z", 3),
                snapshot("2024-01-01T00:00:00Z", 2),
            ],
        };
        let history = HistoryStore::append(history, snapshot("2024-01-01T00:00:00Z", 2));

        let frees: Vec<u64> = history.snapshots.iter().map(|s| s.disks[0].free_space).collect();
        assert_eq!(frees, vec![3, 2, 2]);
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join("history.json"));

        let history = store.load().unwrap();
        let history = HistoryStore::append(
            history,
            snapshot("2024-05-01T10:00:00.123456789+02:00", 118_237_011_968),
        );
        store.persist(&history).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, history);
        assert_eq!(
            reloaded.snapshots[0].timestamp.to_rfc3339(),
            "2024-05-01T10:00:00.123456789+02:00"
        );
        assert_eq!(reloaded.snapshots[0].disks[0].free_space, 118_237_011_968);
    }

    #[test]
    fn persist_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store
            .persist(&HistoryStore::append(History::default(), snapshot("2024-01-01T00:00:00Z", 1)))
            .unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["history.json"]);
    }

    #[test]
    fn reads_files_written_by_earlier_releases() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(HISTORY_FILE_NAME);
        fs::write(
            &path,
            r#"{
  "snapshots": [
    {
      "timestamp": "2024-02-11T09:15:42.5012345+01:00",
      "disks": [
        {
          "drive": "C:\\",
          "total_space": 254356226048,
          "free_space": 61440000000,
          "used_space": 192916226048
        }
      ]
    }
  ]
}"#,
        )
        .unwrap();

        let history = HistoryStore::new(&path).load().unwrap();
        assert_eq!(history.len(), 1);
        let disk = &history.snapshots[0].disks[0];
        assert_eq!(disk.drive, "C:\\");
        assert_eq!(disk.used_space, 192_916_226_048);
    }

    #[test]
    fn persisted_field_names_are_stable() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store
            .persist(&HistoryStore::append(History::default(), snapshot("2024-01-01T00:00:00Z", 1)))
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        let disk = &value["snapshots"][0]["disks"][0];
        for field in ["drive", "total_space", "free_space", "used_space"] {
            assert!(disk.get(field).is_some(), "missing {field}");
        }
        assert!(value["snapshots"][0]["timestamp"].is_string());
    }

    #[cfg(unix)]
    #[test]
    fn persist_keeps_readable_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        let history = HistoryStore::append(History::default(), snapshot("2024-01-01T00:00:00Z", 1));

        store.persist(&history).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o640)).unwrap();
        store.persist(&history).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
