//! Short-lived probe connections.
//!
//! A [`ProbeSession`] opens one connection to a device, runs the GATT service
//! query, and must be closed on every exit path.

use parking_lot::RwLock;
use std::time::Duration;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ble::device::BleDevice;
use crate::error::{Error, Result};

/// Connection state for a probe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Not connected to the device.
    #[default]
    Disconnected,
    /// Currently attempting to connect.
    Connecting,
    /// Connected to the device.
    Connected,
    /// Currently disconnecting.
    Disconnecting,
}

impl ConnectionState {
    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}

/// A single connect / query / disconnect cycle against one device.
pub struct ProbeSession<'a, D: BleDevice + ?Sized> {
    device: &'a D,
    state: RwLock<ConnectionState>,
    timeout: Duration,
}

impl<'a, D: BleDevice + ?Sized> ProbeSession<'a, D> {
    /// Create a session. Each step is bounded by `timeout`.
    pub fn new(device: &'a D, timeout: Duration) -> Self {
        Self {
            device,
            state: RwLock::new(ConnectionState::Disconnected),
            timeout,
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Connect and fetch the device's service UUIDs.
    pub async fn services(&self) -> Result<Vec<Uuid>> {
        self.set_state(ConnectionState::Connecting);

        if let Err(e) = self.bounded(self.device.connect()).await {
            self.set_state(ConnectionState::Disconnected);
            return Err(e);
        }
        self.set_state(ConnectionState::Connected);

        self.bounded(self.device.service_uuids()).await
    }

    /// Release the connection. Failures are logged, never returned.
    ///
    /// Disconnect is attempted even if the connect step failed, since a
    /// timed-out connect can leave a half-open link behind.
    pub async fn close(&self) {
        self.set_state(ConnectionState::Disconnecting);

        match self.bounded(self.device.disconnect()).await {
            Ok(()) => trace!("Disconnected from {}", self.device.identifier()),
            Err(e) => debug!(
                "Failed to disconnect from {}: {}",
                self.device.identifier(),
                e
            ),
        }

        self.set_state(ConnectionState::Disconnected);
    }

    async fn bounded<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::Timeout)?
    }

    fn set_state(&self, new_state: ConnectionState) {
        let old_state = std::mem::replace(&mut *self.state.write(), new_state);

        if old_state != new_state {
            trace!(
                "{}: connection state {} -> {}",
                self.device.identifier(),
                old_state,
                new_state
            );
        }
    }
}
