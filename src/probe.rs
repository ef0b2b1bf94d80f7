//! Probing a single device for the target GATT service.
//!
//! A probe never fails: every problem on the connect / query path becomes
//! [`ProbeOutcome::Unreachable`]. The boolean [`is_esp32`] folds that into
//! `false`, so through it a device that could not be reached looks exactly
//! like one that is not an ESP32. Use [`probe_device`] when the difference
//! matters.

use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ble::connection::ProbeSession;
use crate::ble::device::BleDevice;
use crate::config::ScanConfig;

/// Result of probing one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProbeOutcome {
    /// Connected, and the service list contains the target service.
    Match,
    /// Connected, but the target service is absent.
    NoMatch,
    /// Connecting or querying services failed.
    Unreachable {
        /// Why the probe could not complete.
        reason: String,
    },
}

impl ProbeOutcome {
    /// Check if the device exposes the target service.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Check if the probe could not complete.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "Match"),
            Self::NoMatch => write!(f, "No match"),
            Self::Unreachable { reason } => write!(f, "Unreachable ({})", reason),
        }
    }
}

/// Connect to `device`, list its services, and look for `service`.
///
/// The connection is released before returning, whatever the outcome.
pub async fn probe_device<D: BleDevice + ?Sized>(
    device: &D,
    service: Uuid,
    timeout: Duration,
) -> ProbeOutcome {
    let session = ProbeSession::new(device, timeout);
    let services = session.services().await;
    session.close().await;

    let outcome = match services {
        Ok(uuids) if uuids.contains(&service) => ProbeOutcome::Match,
        Ok(_) => ProbeOutcome::NoMatch,
        Err(e) => ProbeOutcome::Unreachable {
            reason: e.to_string(),
        },
    };

    debug!("Probed {}: {}", device.identifier(), outcome);

    outcome
}

/// Check whether `device` exposes the ESP32 firmware service.
///
/// Uses the [`ScanConfig::default`] service and timeout. Returns `false` both
/// for devices without the service and for devices that could not be probed
/// at all.
pub async fn is_esp32<D: BleDevice + ?Sized>(device: &D) -> bool {
    is_esp32_with(device, &ScanConfig::default()).await
}

/// Like [`is_esp32`], but with the service and timeout taken from `config`,
/// matching what [`DeviceManager`](crate::DeviceManager) would use.
pub async fn is_esp32_with<D: BleDevice + ?Sized>(device: &D, config: &ScanConfig) -> bool {
    probe_device(device, config.service_uuid, config.probe_timeout)
        .await
        .is_match()
}
