//! Probe scheduler.
//!
//! Fans a [`VolumeSource`] out over every volume on its own thread. All tasks
//! start together and share one deadline, so a cycle takes about one timeout
//! no matter how many volumes hang. Each task owns a channel and a result slot
//! indexed by its input position; nothing mutable is shared between tasks.
//!
//! Failed or timed-out volumes are dropped from the snapshot and returned as
//! diagnostics. Threads that outlive the deadline are detached and their late
//! results are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::snapshot::{Snapshot, VolumeInfo};
use crate::volume::{Capacity, ProbeError, VolumeSource};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// How often a cancellable wait wakes up to check the flag.
const CANCEL_POLL: Duration = Duration::from_millis(50);

type ProbeOutcome = std::result::Result<VolumeInfo, ProbeError>;

#[derive(Debug)]
pub struct ProbeReport {
    pub snapshot: Snapshot,
    pub failures: Vec<ProbeError>,
}

pub struct ProbeScheduler {
    timeout: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for ProbeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl ProbeScheduler {
    pub fn new(timeout: Duration) -> Self {
        ProbeScheduler { timeout, cancel: None }
    }

    /// Stop waiting once `flag` is set. Probe threads already running are left
    /// to finish on their own.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Probes every volume in parallel and assembles a snapshot from the ones
    /// that answered in time.
    ///
    /// Returns `NoVolumesMeasured` when nothing usable was measured, whether
    /// the input was empty or every probe failed.
    pub fn probe_all(
        &self,
        source: &Arc<dyn VolumeSource>,
        volumes: &[String],
    ) -> Result<ProbeReport> {
        let volumes = unique(volumes);
        let deadline = Instant::now() + self.timeout;

        let mut slots: Vec<Option<ProbeOutcome>> = (0..volumes.len()).map(|_| None).collect();
        let mut receivers: Vec<Option<Receiver<std::result::Result<Capacity, ProbeError>>>> =
            Vec::with_capacity(volumes.len());

        for (index, volume) in volumes.iter().enumerate() {
            let (tx, rx) = mpsc::channel();
            let task_source = Arc::clone(source);
            let id = volume.clone();

            let spawned = thread::Builder::new()
                .name(format!("probe-{index}"))
                .spawn(move || {
                    // receiver is gone once the deadline passed or the cycle was abandoned
                    let _ = tx.send(task_source.probe(&id));
                });

            match spawned {
                Ok(_) => receivers.push(Some(rx)),
                Err(e) => {
                    slots[index] = Some(Err(ProbeError::Aborted {
                        volume: volume.clone(),
                        reason: format!("failed to spawn probe thread: {e}"),
                    }));
                    receivers.push(None);
                }
            }
        }

        for (index, rx) in receivers.into_iter().enumerate() {
            if let Some(rx) = rx {
                slots[index] = Some(self.wait_slot(&volumes[index], &rx, deadline)?);
            }
        }

        let timestamp: DateTime<FixedOffset> = Local::now().into();
        let mut disks = Vec::new();
        let mut failures = Vec::new();

        for outcome in slots.into_iter().flatten() {
            match outcome {
                Ok(info) => disks.push(info),
                Err(e) => {
                    warn!(volume = %e.volume(), error = %e, "volume dropped from snapshot");
                    failures.push(e);
                }
            }
        }

        debug!(
            source = source.name(),
            measured = disks.len(),
            failed = failures.len(),
            "probe cycle settled"
        );

        if disks.is_empty() {
            return Err(Error::NoVolumesMeasured);
        }

        Ok(ProbeReport {
            snapshot: Snapshot { timestamp, disks },
            failures,
        })
    }

    fn wait_slot(
        &self,
        volume: &str,
        rx: &Receiver<std::result::Result<Capacity, ProbeError>>,
        deadline: Instant,
    ) -> Result<ProbeOutcome> {
        loop {
            if self.cancelled() {
                return Err(Error::CaptureAbandoned);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(match rx.try_recv() {
                    Ok(answer) => settle(volume, answer),
                    Err(TryRecvError::Empty) => Err(ProbeError::Timeout {
                        volume: volume.to_string(),
                        timeout: self.timeout,
                    }),
                    Err(TryRecvError::Disconnected) => Err(aborted(volume)),
                });
            }

            let wait = match self.cancel {
                Some(_) => remaining.min(CANCEL_POLL),
                None => remaining,
            };

            match rx.recv_timeout(wait) {
                Ok(answer) => return Ok(settle(volume, answer)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(Err(aborted(volume))),
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

fn settle(volume: &str, answer: std::result::Result<Capacity, ProbeError>) -> ProbeOutcome {
    let capacity = answer?;
    VolumeInfo::new(volume, capacity.total, capacity.free)
}

fn aborted(volume: &str) -> ProbeError {
    ProbeError::Aborted {
        volume: volume.to_string(),
        reason: "probe thread exited without a result".to_string(),
    }
}

/// First occurrence wins so the snapshot stays unique by identifier.
fn unique(volumes: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(volumes.len());
    for volume in volumes {
        if !seen.contains(volume) {
            seen.push(volume.clone());
        }
    }
    seen
}
