//! BLE Service and Characteristic UUIDs.
//!
//! Contains the UUID constants exposed by the ESP32 firmware.

use uuid::Uuid;

/// GATT service advertised by the ESP32 firmware. Its presence is what
/// qualifies a peripheral as a match.
pub const ESP32_SERVICE_UUID: Uuid = Uuid::from_u128(0xc184fdd9_7a6a_400d_ae35_8158d2efb090);

/// Characteristic inside [`ESP32_SERVICE_UUID`] used by the firmware for data exchange.
pub const ESP32_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x1f20a61f_e506_488d_bf94_393ca4cdcb28);
