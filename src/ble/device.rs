//! Discovered BLE peripherals.
//!
//! [`BleDevice`] is the seam between the probing logic and the platform BLE
//! stack. [`DiscoveredDevice`] is the btleplug-backed implementation handed
//! out by the scanner.

use async_trait::async_trait;
use btleplug::api::Peripheral as _;
use btleplug::platform::Peripheral;
use std::fmt;
use tracing::trace;
use uuid::Uuid;

use crate::error::Result;

/// A peripheral that can be connected to and asked for its GATT services.
///
/// Handles are only guaranteed to be usable within one connection attempt;
/// callers should not cache them across scans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BleDevice: Send + Sync {
    /// Platform identifier (a MAC address on Linux/Windows, a UUID on macOS).
    fn identifier(&self) -> String;

    /// Advertised local name, if the peripheral sent one.
    fn name(&self) -> Option<String>;

    /// Open a connection to the peripheral.
    async fn connect(&self) -> Result<()>;

    /// Resolve and return the UUIDs of every GATT service the peripheral exposes.
    ///
    /// Requires an open connection.
    async fn service_uuids(&self) -> Result<Vec<Uuid>>;

    /// Tear down the connection.
    async fn disconnect(&self) -> Result<()>;
}

/// A peripheral reported by [`BleScanner`](crate::ble::BleScanner).
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    peripheral: Peripheral,
    name: Option<String>,
    rssi: Option<i16>,
}

impl DiscoveredDevice {
    pub(crate) fn new(peripheral: Peripheral, name: Option<String>, rssi: Option<i16>) -> Self {
        Self {
            peripheral,
            name,
            rssi,
        }
    }

    /// Signal strength at discovery time in dBm.
    pub fn rssi(&self) -> Option<i16> {
        self.rssi
    }

    /// Get the underlying peripheral.
    pub fn peripheral(&self) -> &Peripheral {
        &self.peripheral
    }
}

#[async_trait]
impl BleDevice for DiscoveredDevice {
    fn identifier(&self) -> String {
        self.peripheral.id().to_string()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn connect(&self) -> Result<()> {
        self.peripheral.connect().await?;
        Ok(())
    }

    async fn service_uuids(&self) -> Result<Vec<Uuid>> {
        self.peripheral.discover_services().await?;

        let uuids: Vec<Uuid> = self
            .peripheral
            .services()
            .into_iter()
            .map(|service| service.uuid)
            .collect();

        trace!("{} exposes {} services", self.identifier(), uuids.len());

        Ok(uuids)
    }

    async fn disconnect(&self) -> Result<()> {
        if self.peripheral.is_connected().await.unwrap_or(false) {
            self.peripheral.disconnect().await?;
        }
        Ok(())
    }
}

impl fmt::Display for DiscoveredDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::utils::describe_device(
            &self.identifier(),
            self.name.as_deref(),
        ))
    }
}
