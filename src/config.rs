//! Scan configuration.

use std::time::Duration;
use uuid::Uuid;

use crate::ble::uuids::ESP32_SERVICE_UUID;
use crate::error::{Error, Result};

/// Default time the radio listens for advertisements.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);

/// Default bound on connecting to, and querying, a single device.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of devices probed at the same time.
///
/// Many platforms serialize connection attempts on one adapter, so probing is
/// sequential unless asked otherwise.
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 1;

/// Parameters for one discovery-and-filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// How long to scan for advertisements.
    pub scan_duration: Duration,
    /// Upper bound for each connect / service query / disconnect step.
    pub probe_timeout: Duration,
    /// Maximum number of probes in flight.
    pub max_concurrent_probes: usize,
    /// Service a device must expose to count as a match.
    pub service_uuid: Uuid,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_duration: DEFAULT_SCAN_DURATION,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            service_uuid: ESP32_SERVICE_UUID,
        }
    }
}

impl ScanConfig {
    /// Set the scan duration.
    pub fn with_scan_duration(mut self, duration: Duration) -> Self {
        self.scan_duration = duration;
        self
    }

    /// Set the per-step probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set how many devices may be probed concurrently.
    pub fn with_max_concurrent_probes(mut self, limit: usize) -> Self {
        self.max_concurrent_probes = limit;
        self
    }

    /// Look for a different service than the ESP32 firmware one.
    pub fn with_service_uuid(mut self, uuid: Uuid) -> Self {
        self.service_uuid = uuid;
        self
    }

    /// Check that the configuration can drive a scan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero duration, zero timeout,
    /// or a concurrency limit of zero.
    pub fn validate(&self) -> Result<()> {
        if self.scan_duration.is_zero() {
            return Err(invalid("scan_duration", format!("{:?}", self.scan_duration)));
        }
        if self.probe_timeout.is_zero() {
            return Err(invalid("probe_timeout", format!("{:?}", self.probe_timeout)));
        }
        if self.max_concurrent_probes == 0 {
            return Err(invalid("max_concurrent_probes", "0".to_string()));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: String) -> Error {
    Error::InvalidParameter {
        name: name.to_string(),
        value,
    }
}
