// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connection state read by the front end.

use parking_lot::RwLock;

use crate::bluetooth::Device;

/// Connection status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Scanning => "Scanning...",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Error => "Error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the coordinator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub status: ConnectionStatus,
    pub devices: Vec<Device>,
    /// Device the open session belongs to. Set exactly when connected.
    pub connected_device: Option<Device>,
}

impl Snapshot {
    pub fn is_connected(&self) -> bool {
        self.connected_device.is_some()
    }
}

/// Readable state. Written only by the coordinator.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: RwLock<Snapshot>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().status
    }

    pub fn connected_device(&self) -> Option<Device> {
        self.inner.read().connected_device.clone()
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) {
        self.inner.write().status = status;
    }

    /// Replace the device list without touching status.
    pub(crate) fn set_devices(&self, devices: Vec<Device>) {
        self.inner.write().devices = devices;
    }

    pub(crate) fn set_scanned(&self, devices: Vec<Device>) {
        let mut inner = self.inner.write();
        inner.devices = devices;
        inner.status = ConnectionStatus::Disconnected;
    }

    pub(crate) fn set_connected(&self, device: Device) {
        let mut inner = self.inner.write();
        inner.connected_device = Some(device);
        inner.status = ConnectionStatus::Connected;
    }

    pub(crate) fn set_disconnected(&self) {
        let mut inner = self.inner.write();
        inner.connected_device = None;
        inner.status = ConnectionStatus::Disconnected;
    }

    /// Session lost: drop the device and flag the error.
    pub(crate) fn set_session_lost(&self) {
        let mut inner = self.inner.write();
        inner.connected_device = None;
        inner.status = ConnectionStatus::Error;
    }
}
