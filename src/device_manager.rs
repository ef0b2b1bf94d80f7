//! Device manager for finding ESP32 boards.
//!
//! Runs one discovery pass and probes every device seen, keeping the ones
//! that expose the configured GATT service. Probes are independent, so they
//! run through a bounded pipeline; results always come back in discovery
//! order regardless of the concurrency limit.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::ble::scanner::{BleScanner, DeviceSource};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::probe::{probe_device, ProbeOutcome};

/// A discovered device together with what probing it found.
#[derive(Debug, Clone)]
pub struct SurveyEntry<D> {
    /// The device that was probed.
    pub device: D,
    /// Result of the probe.
    pub outcome: ProbeOutcome,
}

/// Discovers devices and filters them down to matches.
pub struct DeviceManager<S: DeviceSource = BleScanner> {
    /// Where devices come from.
    source: S,
    /// Scan parameters.
    config: ScanConfig,
}

impl DeviceManager<BleScanner> {
    /// Create a manager that scans with the system's first Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or Bluetooth is not available.
    pub async fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let scanner = BleScanner::new().await?;
        Ok(Self {
            source: scanner,
            config,
        })
    }
}

impl<S: DeviceSource> DeviceManager<S> {
    /// Create a manager over an arbitrary device source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_source(source: S, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Get the scan configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan once and return every visible device.
    pub async fn discover(&self) -> Result<Vec<S::Device>> {
        self.source.discover(self.config.scan_duration).await
    }

    /// Probe each device, returning outcomes in the same order as `devices`.
    pub async fn probe_all(&self, devices: &[S::Device]) -> Vec<ProbeOutcome> {
        let service = self.config.service_uuid;
        let timeout = self.config.probe_timeout;

        stream::iter(devices)
            .map(|device| probe_device(device, service, timeout))
            .buffered(self.config.max_concurrent_probes)
            .collect()
            .await
    }

    /// Keep only the devices whose probe matched, preserving order.
    pub async fn filter_matches(&self, devices: Vec<S::Device>) -> Vec<S::Device> {
        self.survey_devices(devices)
            .await
            .into_iter()
            .filter(|entry| entry.outcome.is_match())
            .map(|entry| entry.device)
            .collect()
    }

    /// Discover and probe, returning every device with its outcome.
    ///
    /// # Errors
    ///
    /// Only discovery errors are returned; probe failures show up as
    /// [`ProbeOutcome::Unreachable`].
    pub async fn survey(&self) -> Result<Vec<SurveyEntry<S::Device>>> {
        let devices = self.discover().await?;
        Ok(self.survey_devices(devices).await)
    }

    /// Discover and return only the devices exposing the target service.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub async fn scan_for_esp32s(&self) -> Result<Vec<S::Device>> {
        let devices = self.discover().await?;
        Ok(self.filter_matches(devices).await)
    }

    async fn survey_devices(&self, devices: Vec<S::Device>) -> Vec<SurveyEntry<S::Device>> {
        if devices.is_empty() {
            debug!("No devices discovered, nothing to probe");
            return Vec::new();
        }

        info!(
            "Probing {} devices for service {}",
            devices.len(),
            self.config.service_uuid
        );

        let outcomes = self.probe_all(&devices).await;

        let entries: Vec<_> = devices
            .into_iter()
            .zip(outcomes)
            .map(|(device, outcome)| SurveyEntry { device, outcome })
            .collect();

        info!(
            "{} of {} devices matched",
            entries.iter().filter(|e| e.outcome.is_match()).count(),
            entries.len()
        );

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::device::BleDevice;
    use crate::ble::uuids::ESP32_SERVICE_UUID;
    use crate::error::Error;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Behavior {
        Esp32,
        Other,
        Refuses,
    }

    /// Scripted device that counts how often it is connected.
    #[derive(Debug, Clone)]
    struct FakeDevice {
        id: String,
        behavior: Behavior,
        delay: Duration,
        connects: Arc<AtomicUsize>,
        disconnects: Arc<AtomicUsize>,
    }

    impl FakeDevice {
        fn new(id: &str, behavior: Behavior) -> Self {
            Self {
                id: id.to_string(),
                behavior,
                delay: Duration::ZERO,
                connects: Arc::new(AtomicUsize::new(0)),
                disconnects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Make `connect` take `delay` before answering.
        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl BleDevice for FakeDevice {
        fn identifier(&self) -> String {
            self.id.clone()
        }

        fn name(&self) -> Option<String> {
            None
        }

        async fn connect(&self) -> Result<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.behavior {
                Behavior::Refuses => Err(Error::ConnectionFailed {
                    reason: "refused".to_string(),
                }),
                _ => Ok(()),
            }
        }

        async fn service_uuids(&self) -> Result<Vec<Uuid>> {
            match self.behavior {
                Behavior::Esp32 => Ok(vec![ESP32_SERVICE_UUID]),
                _ => Ok(vec![Uuid::from_u128(0x0000_1800_0000_1000_8000_00805f9b34fb)]),
            }
        }

        async fn disconnect(&self) -> Result<()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeSource {
        devices: Vec<FakeDevice>,
    }

    #[async_trait]
    impl DeviceSource for FakeSource {
        type Device = FakeDevice;

        async fn discover(&self, _duration: Duration) -> Result<Vec<FakeDevice>> {
            Ok(self.devices.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl DeviceSource for BrokenSource {
        type Device = FakeDevice;

        async fn discover(&self, _duration: Duration) -> Result<Vec<FakeDevice>> {
            Err(Error::BluetoothUnavailable)
        }
    }

    fn manager(devices: Vec<FakeDevice>, concurrency: usize) -> DeviceManager<FakeSource> {
        let config = ScanConfig::default().with_max_concurrent_probes(concurrency);
        DeviceManager::with_source(FakeSource { devices }, config).unwrap()
    }

    fn ids(devices: &[FakeDevice]) -> Vec<String> {
        devices.iter().map(|d| d.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_matches_keep_discovery_order() {
        let a = FakeDevice::new("A", Behavior::Esp32);
        let b = FakeDevice::new("B", Behavior::Refuses);
        let c = FakeDevice::new("C", Behavior::Esp32);

        let found = manager(vec![a, b, c], 1).scan_for_esp32s().await.unwrap();
        assert_eq!(ids(&found), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_empty_discovery_makes_no_probes() {
        let found = manager(Vec::new(), 1).scan_for_esp32s().await.unwrap();
        assert!(found.is_empty());

        let survey = manager(Vec::new(), 1).survey().await.unwrap();
        assert!(survey.is_empty());
    }

    #[tokio::test]
    async fn test_every_device_probed_once_and_released() {
        let devices = vec![
            FakeDevice::new("A", Behavior::Esp32),
            FakeDevice::new("B", Behavior::Refuses),
            FakeDevice::new("C", Behavior::Other),
        ];
        let handles = devices.clone();

        manager(devices, 1).scan_for_esp32s().await.unwrap();

        for device in &handles {
            assert_eq!(device.connects.load(Ordering::SeqCst), 1, "{}", device.id);
            assert_eq!(device.disconnects.load(Ordering::SeqCst), 1, "{}", device.id);
        }
    }

    #[tokio::test]
    async fn test_survey_separates_unreachable_from_no_match() {
        let devices = vec![
            FakeDevice::new("A", Behavior::Esp32),
            FakeDevice::new("B", Behavior::Refuses),
            FakeDevice::new("C", Behavior::Other),
        ];

        let survey = manager(devices, 2).survey().await.unwrap();
        let outcomes: Vec<_> = survey
            .iter()
            .map(|e| (e.device.id.as_str(), e.outcome.clone()))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ("A", ProbeOutcome::Match),
                (
                    "B",
                    ProbeOutcome::Unreachable {
                        reason: "Connection failed: refused".to_string()
                    }
                ),
                ("C", ProbeOutcome::NoMatch),
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_results_pair_with_their_devices() {
        // Earlier devices answer slower, so with several in flight they
        // complete in reverse discovery order.
        let devices = vec![
            FakeDevice::new("A", Behavior::Esp32).with_delay(Duration::from_millis(120)),
            FakeDevice::new("B", Behavior::Refuses).with_delay(Duration::from_millis(90)),
            FakeDevice::new("C", Behavior::Other).with_delay(Duration::from_millis(60)),
            FakeDevice::new("D", Behavior::Esp32).with_delay(Duration::from_millis(30)),
            FakeDevice::new("E", Behavior::Other),
        ];

        let device_manager = manager(devices, 4);
        let survey = device_manager.survey().await.unwrap();
        let outcomes: Vec<_> = survey
            .iter()
            .map(|e| (e.device.id.as_str(), e.outcome.clone()))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ("A", ProbeOutcome::Match),
                (
                    "B",
                    ProbeOutcome::Unreachable {
                        reason: "Connection failed: refused".to_string()
                    }
                ),
                ("C", ProbeOutcome::NoMatch),
                ("D", ProbeOutcome::Match),
                ("E", ProbeOutcome::NoMatch),
            ]
        );

        let found = device_manager.scan_for_esp32s().await.unwrap();
        assert_eq!(ids(&found), vec!["A", "D"]);
    }

    #[tokio::test]
    async fn test_discovery_error_propagates() {
        let manager = DeviceManager::with_source(BrokenSource, ScanConfig::default()).unwrap();
        let err = manager.scan_for_esp32s().await.unwrap_err();
        assert!(matches!(err, Error::BluetoothUnavailable));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScanConfig::default().with_max_concurrent_probes(0);
        let result = DeviceManager::with_source(FakeSource { devices: Vec::new() }, config);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    fn behavior() -> impl Strategy<Value = Behavior> {
        prop_oneof![
            Just(Behavior::Esp32),
            Just(Behavior::Other),
            Just(Behavior::Refuses),
        ]
    }

    proptest! {
        #[test]
        fn prop_output_is_ordered_subsequence(
            behaviors in proptest::collection::vec(behavior(), 0..12),
            concurrency in 1usize..5,
        ) {
            let devices: Vec<_> = behaviors
                .iter()
                .enumerate()
                .map(|(i, b)| FakeDevice::new(&format!("dev-{i:02}"), *b))
                .collect();
            let expected: Vec<String> = devices
                .iter()
                .filter(|d| d.behavior == Behavior::Esp32)
                .map(|d| d.id.clone())
                .collect();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let found = runtime
                .block_on(manager(devices, concurrency).scan_for_esp32s())
                .unwrap();

            prop_assert_eq!(ids(&found), expected);
        }
    }
}
