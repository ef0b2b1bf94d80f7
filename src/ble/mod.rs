//! BLE communication module.
//!
//! This module provides low-level Bluetooth Low Energy functionality
//! for discovering devices and checking which GATT services they expose.

pub mod connection;
pub mod device;
pub mod scanner;
pub mod uuids;

pub use connection::{ConnectionState, ProbeSession};
pub use device::{BleDevice, DiscoveredDevice};
pub use scanner::{BleScanner, DeviceSource};
pub use uuids::*;
