//! One capture cycle: enumerate, probe, load, append, persist.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::probe::ProbeScheduler;
use crate::snapshot::{History, Snapshot};
use crate::store::HistoryStore;
use crate::volume::{ProbeError, VolumeSource};

#[derive(Debug)]
pub struct Capture {
    pub snapshot: Snapshot,
    /// Volumes dropped from the snapshot this cycle.
    pub failures: Vec<ProbeError>,
    /// Most recent snapshot before this one, if any.
    pub previous: Option<Snapshot>,
    pub history: History,
    /// Set when the measurement could not be saved. The snapshot is still
    /// valid and should be shown.
    pub persist_error: Option<Error>,
}

pub fn run(
    source: &Arc<dyn VolumeSource>,
    store: &HistoryStore,
    scheduler: &ProbeScheduler,
) -> Result<Capture> {
    let volumes = source.list_fixed_volumes()?;
    info!(source = source.name(), volumes = volumes.len(), "probing volumes");

    let report = scheduler.probe_all(source, &volumes)?;

    let history = store.load()?;
    let previous = history.latest().cloned();
    let history = HistoryStore::append(history, report.snapshot.clone());

    let persist_error = match store.persist(&history) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "measurement captured but not saved");
            Some(e)
        }
    };

    Ok(Capture {
        snapshot: report.snapshot,
        failures: report.failures,
        previous,
        history,
        persist_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::fake::{FakeVolume, FakeVolumeSource};
    use std::fs;
    use tempfile::TempDir;

    fn source() -> Arc<dyn VolumeSource> {
        Arc::new(
            FakeVolumeSource::new()
                .with_volume("C:\\", FakeVolume::ok(1000, 400))
                .with_volume("D:\\", FakeVolume::failing("not ready")),
        )
    }

    #[test]
    fn capture_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));

        let first = run(&source(), &store, &ProbeScheduler::default()).unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.failures.len(), 1);
        assert!(first.persist_error.is_none());

        let second = run(&source(), &store, &ProbeScheduler::default()).unwrap();
        assert_eq!(second.previous.as_ref(), Some(&first.snapshot));
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn enumeration_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        let source: Arc<dyn VolumeSource> =
            Arc::new(FakeVolumeSource::new().with_enumeration_error("denied"));

        let err = run(&source, &store, &ProbeScheduler::default()).unwrap_err();
        assert!(matches!(err, Error::Enumeration(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn malformed_history_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        let store = HistoryStore::new(&path);

        let err = run(&source(), &store, &ProbeScheduler::default()).unwrap_err();
        assert!(matches!(err, Error::StoreMalformed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
