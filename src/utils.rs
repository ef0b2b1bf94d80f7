//! Utility functions for the esp32-ble-scan crate.

/// Name shown for devices that did not advertise a local name.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown";

/// Format a device as a single output line.
///
/// # Arguments
///
/// * `identifier` - Platform identifier of the device
/// * `name` - Advertised local name, if any
///
/// # Example
///
/// ```
/// use esp32_ble_scan::describe_device;
///
/// assert_eq!(describe_device("24:0A:C4:12:34:56", Some("esp32-node")), "24:0A:C4:12:34:56: esp32-node");
/// assert_eq!(describe_device("24:0A:C4:12:34:56", None), "24:0A:C4:12:34:56: Unknown");
/// ```
pub fn describe_device(identifier: &str, name: Option<&str>) -> String {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_DEVICE_NAME);
    format!("{}: {}", identifier, name)
}
