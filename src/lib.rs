// Allow unusual byte groupings for UUIDs which have standard format
#![allow(clippy::unusual_byte_groupings)]

//! # esp32-ble-scan
//!
//! Finds nearby ESP32 boards over Bluetooth Low Energy.
//!
//! A board counts as a match when it exposes the firmware's GATT service,
//! [`ESP32_SERVICE_UUID`]. Finding them is a two-step pass: scan for every
//! visible peripheral, then connect to each one briefly and look at its
//! service list.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use esp32_ble_scan::{BleDevice, DeviceManager, Result, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let manager = DeviceManager::new(ScanConfig::default()).await?;
//!
//!     for device in manager.scan_for_esp32s().await? {
//!         println!("Found ESP32: {}", device.identifier());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Unreachable devices
//!
//! Connecting to an arbitrary peripheral often fails: it may refuse, require
//! pairing, or walk out of range. [`is_esp32`] and
//! [`DeviceManager::scan_for_esp32s`] treat such devices as non-matches.
//! [`DeviceManager::survey`] and [`probe_device`] keep them apart as
//! [`ProbeOutcome::Unreachable`].
//!
//! ## Platform Notes
//!
//! ### macOS
//! Requires Bluetooth permission. Device identifiers are per-host UUIDs, not MAC addresses.
//!
//! ### Linux
//! Requires BlueZ. User may need to be in the `bluetooth` group.
//!
//! ### Windows
//! Requires Windows 10 or later with Bluetooth LE support.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for [`ProbeOutcome`]

// Public modules
pub mod ble;
pub mod config;
pub mod device_manager;
pub mod error;
pub mod probe;
pub mod utils;

// Re-exports for convenience
pub use ble::connection::ConnectionState;
pub use ble::device::{BleDevice, DiscoveredDevice};
pub use ble::scanner::{BleScanner, DeviceSource};
pub use ble::uuids::{ESP32_CHARACTERISTIC_UUID, ESP32_SERVICE_UUID};
pub use config::ScanConfig;
pub use device_manager::{DeviceManager, SurveyEntry};
pub use error::{Error, Result};
pub use probe::{is_esp32, is_esp32_with, probe_device, ProbeOutcome};
pub use utils::describe_device;
