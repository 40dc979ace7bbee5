//! Dashboard session state.
//!
//! Holds everything the renderer reads: the latest snapshot, the selectable
//! volumes, the view mode, a coarse status, and the series for the selected
//! volume. Captures are started by the caller and handed back through
//! [`Dashboard::finish_refresh`]; the history is only ever written from here,
//! so a session has a single writer.

use tracing::{info, warn};

use crate::error::Result;
use crate::probe::ProbeReport;
use crate::series::{self, InsufficientData, VolumeSeries};
use crate::snapshot::{History, Snapshot};
use crate::store::HistoryStore;
use crate::volume::ProbeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Current,
    Chart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready,
    Error(String),
}

pub struct Dashboard {
    store: HistoryStore,
    history: History,
    /// Off when the history file could not be loaded, so the session never
    /// replaces a file it failed to read.
    can_persist: bool,
    failures: Vec<ProbeError>,
    volumes: Vec<String>,
    selected: usize,
    view: View,
    loading: bool,
    error: Option<String>,
    series: std::result::Result<VolumeSeries, InsufficientData>,
}

impl Dashboard {
    pub fn open(store: HistoryStore) -> Self {
        let (history, can_persist, error) = match store.load() {
            Ok(history) => (history, true, None),
            Err(e) => {
                warn!(error = %e, "history unavailable, captures will not be saved");
                (History::default(), false, Some(e.to_string()))
            }
        };

        let mut dashboard = Dashboard {
            store,
            history,
            can_persist,
            failures: Vec::new(),
            volumes: Vec::new(),
            selected: 0,
            view: View::Current,
            loading: false,
            error,
            series: Err(InsufficientData::TooFewSnapshots(0)),
        };
        dashboard.refresh_volumes();
        dashboard
    }

    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if let Some(e) = &self.error {
            Status::Error(e.clone())
        } else {
            Status::Ready
        }
    }

    /// Marks a capture as in flight. Returns false if one already is.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_refresh(&mut self, result: Result<ProbeReport>) {
        self.loading = false;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "capture failed");
                self.error = Some(e.to_string());
                return;
            }
        };

        let history = std::mem::take(&mut self.history);
        self.history = HistoryStore::append(history, report.snapshot);
        self.failures = report.failures;

        if self.can_persist {
            self.error = match self.store.persist(&self.history) {
                Ok(()) => None,
                Err(e) => {
                    warn!(error = %e, "measurement captured but not saved");
                    Some(e.to_string())
                }
            };
        }

        info!(snapshots = self.history.len(), "dashboard refreshed");
        self.refresh_volumes();
    }

    pub fn toggle_view(&mut self) {
        if self.loading {
            return;
        }
        self.view = match self.view {
            View::Current => View::Chart,
            View::Chart => View::Current,
        };
    }

    pub fn select_previous(&mut self) {
        if self.loading || self.selected == 0 {
            return;
        }
        self.selected -= 1;
        self.rebuild_series();
    }

    pub fn select_next(&mut self) {
        if self.loading || self.selected + 1 >= self.volumes.len() {
            return;
        }
        self.selected += 1;
        self.rebuild_series();
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.latest()
    }

    /// Probe failures from the most recent capture.
    pub fn failures(&self) -> &[ProbeError] {
        &self.failures
    }

    pub fn volumes(&self) -> &[String] {
        &self.volumes
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_volume(&self) -> Option<&str> {
        self.volumes.get(self.selected).map(String::as_str)
    }

    pub fn series(&self) -> &std::result::Result<VolumeSeries, InsufficientData> {
        &self.series
    }

    /// Recomputes the volume list, keeping the selected drive when it is
    /// still present.
    fn refresh_volumes(&mut self) {
        let previous = self.selected_volume().map(str::to_string);
        self.volumes = series::volume_ids(&self.history);
        self.selected = previous
            .and_then(|id| self.volumes.iter().position(|v| *v == id))
            .unwrap_or(0);
        self.rebuild_series();
    }

    fn rebuild_series(&mut self) {
        let volume = self.selected_volume().unwrap_or_default().to_string();
        self.series = series::extract(&self.history, &volume);
    }
}
