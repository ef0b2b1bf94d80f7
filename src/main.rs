//! Scan for nearby ESP32 boards and print the ones exposing the firmware service.
//!
//! Matches go to stdout, one per line. Logs go to stderr and are controlled
//! with `RUST_LOG` (default `esp32_ble_scan=info`).

use esp32_ble_scan::{BleDevice, DeviceManager, Result, ScanConfig};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("esp32_ble_scan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let manager = DeviceManager::new(ScanConfig::default()).await?;
    let survey = manager.survey().await?;

    let mut unreachable = 0;
    for entry in &survey {
        if entry.outcome.is_match() {
            println!("{}", entry.device);
        } else if entry.outcome.is_unreachable() {
            unreachable += 1;
            debug!("{}: {}", entry.device.identifier(), entry.outcome);
        }
    }

    if unreachable > 0 {
        warn!(
            "{} of {} devices could not be probed and were skipped",
            unreachable,
            survey.len()
        );
    }

    Ok(())
}
