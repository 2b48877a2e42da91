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

//! Transport abstraction over a serial-style Bluetooth link.

use anyhow::Result;
use async_trait::async_trait;

/// Name used when a bonded device does not report one.
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown Device";

/// A bonded device as reported by the OS Bluetooth stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Stable identifier used to connect.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Hardware address, if the stack exposes one.
    pub address: Option<String>,
}

impl Device {
    /// Build a device, defaulting the name when absent or empty.
    pub fn new(id: impl Into<String>, name: Option<String>, address: Option<String>) -> Self {
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());

        Self {
            id: id.into(),
            name,
            address,
        }
    }
}

/// Serial-style Bluetooth transport.
///
/// Implementations attach a category message ("Failed to connect to device"
/// and so on) to every error they return. Callers do not inspect causes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open session returned by [`Transport::connect`].
    type Handle: Send;

    /// Enumerate devices paired at the OS level.
    async fn list_bonded_devices(&self) -> Result<Vec<Device>>;

    /// Open a session to the device with the given ID.
    async fn connect(&self, device_id: &str) -> Result<Self::Handle>;

    /// Write raw bytes to an open session.
    async fn write(&self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<()>;

    /// Close a session. The handle is consumed whether or not this succeeds.
    async fn disconnect(&self, handle: Self::Handle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_defaults() {
        let device = Device::new("00:11:22:33:44:55", None, None);
        assert_eq!(device.name, UNKNOWN_DEVICE_NAME);
    }

    #[test]
    fn test_empty_name_defaults() {
        let device = Device::new("id", Some(String::new()), None);
        assert_eq!(device.name, UNKNOWN_DEVICE_NAME);
    }

    #[test]
    fn test_name_kept() {
        let device = Device::new(
            "id",
            Some("HC-05".to_string()),
            Some("98:D3:31:F5:1A:2B".to_string()),
        );
        assert_eq!(device.name, "HC-05");
        assert_eq!(device.address.as_deref(), Some("98:D3:31:F5:1A:2B"));
    }
}
