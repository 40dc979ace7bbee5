use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{Capacity, ProbeError, VolumeSource};
use crate::error::{Error, Result};

pub struct FakeVolume {
    response: std::result::Result<Capacity, String>,
    delay: Option<Duration>,
}

impl FakeVolume {
    pub fn ok(total: u64, free: u64) -> Self {
        Self {
            response: Ok(Capacity { total, free }),
            delay: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Scripted volume source for tests. Volumes are enumerated in insertion
/// order; probing an unscripted volume reports it as unavailable.
#[derive(Default)]
pub struct FakeVolumeSource {
    order: Vec<String>,
    volumes: HashMap<String, FakeVolume>,
    enumeration_error: Option<String>,
    probed: Mutex<Vec<String>>,
}

impl FakeVolumeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, id: &str, volume: FakeVolume) -> Self {
        if !self.order.iter().any(|v| v == id) {
            self.order.push(id.to_string());
        }
        self.volumes.insert(id.to_string(), volume);
        self
    }

    pub fn with_enumeration_error(mut self, reason: &str) -> Self {
        self.enumeration_error = Some(reason.to_string());
        self
    }

    /// Volumes passed to `probe`, in call order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl VolumeSource for FakeVolumeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn list_fixed_volumes(&self) -> Result<Vec<String>> {
        match &self.enumeration_error {
            Some(reason) => Err(Error::Enumeration(reason.clone())),
            None => Ok(self.order.clone()),
        }
    }

    fn probe(&self, volume: &str) -> std::result::Result<Capacity, ProbeError> {
        if let Ok(mut probed) = self.probed.lock() {
            probed.push(volume.to_string());
        }

        let Some(entry) = self.volumes.get(volume) else {
            return Err(ProbeError::Unavailable {
                volume: volume.to_string(),
                reason: "not scripted".to_string(),
            });
        };

        if let Some(delay) = entry.delay {
            std::thread::sleep(delay);
        }

        entry.response.clone().map_err(|reason| ProbeError::Unavailable {
            volume: volume.to_string(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_in_insertion_order() {
        let source = FakeVolumeSource::new()
            .with_volume("D:\\", FakeVolume::ok(10, 5))
            .with_volume("C:\\", FakeVolume::ok(10, 5));
        assert_eq!(source.list_fixed_volumes().unwrap(), vec!["D:\\", "C:\\"]);
    }

    #[test]
    fn unscripted_volume_is_unavailable() {
        let source = FakeVolumeSource::new();
        let err = source.probe("Z:\\").unwrap_err();
        assert_eq!(err.volume(), "Z:\\");
        assert_eq!(source.probed(), vec!["Z:\\"]);
    }

    #[test]
    fn enumeration_error_is_reported() {
        let source = FakeVolumeSource::new().with_enumeration_error("access denied");
        assert!(matches!(source.list_fixed_volumes(), Err(Error::Enumeration(_))));
    }
}
