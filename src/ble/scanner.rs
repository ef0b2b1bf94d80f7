//! BLE scanning functionality.
//!
//! Provides the scanner that lists every peripheral in radio range.

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager};
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::ble::device::{BleDevice, DiscoveredDevice};
use crate::error::{Error, Result};

/// Something that can list nearby devices.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Device handle produced by this source.
    type Device: BleDevice;

    /// Scan for `duration` and return every peripheral seen, in the order the
    /// underlying stack reports them.
    async fn discover(&self, duration: Duration) -> Result<Vec<Self::Device>>;
}

/// BLE scanner backed by the first available adapter.
pub struct BleScanner {
    /// The BLE adapter to use for scanning.
    adapter: Adapter,
}

impl BleScanner {
    /// Create a new BLE scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available or no adapter is present.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self { adapter })
    }

    /// Create a new BLE scanner with a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self { adapter }
    }

    /// Get the underlying adapter.
    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }
}

#[async_trait]
impl DeviceSource for BleScanner {
    type Device = DiscoveredDevice;

    async fn discover(&self, duration: Duration) -> Result<Vec<DiscoveredDevice>> {
        info!("Scanning for BLE devices for {:?}", duration);

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(Error::Bluetooth)?;

        tokio::time::sleep(duration).await;

        self.adapter.stop_scan().await.map_err(Error::Bluetooth)?;

        let peripherals = self.adapter.peripherals().await.map_err(Error::Bluetooth)?;

        let mut devices = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            // Properties can be missing for peripherals that only sent a partial advertisement.
            let (name, rssi) = match peripheral.properties().await {
                Ok(Some(props)) => (props.local_name, props.rssi),
                Ok(None) => (None, None),
                Err(e) => {
                    trace!("Failed to read properties of {}: {}", peripheral.id(), e);
                    (None, None)
                }
            };

            trace!("Device discovered: {} ({:?})", peripheral.id(), name);
            devices.push(DiscoveredDevice::new(peripheral, name, rssi));
        }

        debug!("Scan finished, {} devices visible", devices.len());

        Ok(devices)
    }
}
