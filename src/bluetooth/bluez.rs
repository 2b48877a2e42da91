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

//! BlueZ RFCOMM transport.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr, Stream};
use bluer::{Adapter, Address};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::transport::{Device, Transport};
use crate::config::BluetoothConfig;

/// An open RFCOMM session.
pub struct RfcommSession {
    address: Address,
    stream: Stream,
}

impl std::fmt::Debug for RfcommSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfcommSession")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Transport backed by the BlueZ daemon.
pub struct BluezTransport {
    adapter: Adapter,
    channel: u8,
}

impl BluezTransport {
    /// Open a BlueZ session and select the adapter.
    pub async fn new(config: &BluetoothConfig) -> Result<Self> {
        info!("Initializing Bluetooth transport...");

        let session = bluer::Session::new()
            .await
            .context("Failed to open BlueZ session")?;
        debug!("BlueZ session created");

        let adapter = match config.adapter.as_deref() {
            Some(name) => session
                .adapter(name)
                .with_context(|| format!("Bluetooth adapter '{}' not found", name))?,
            None => session
                .default_adapter()
                .await
                .context("No Bluetooth adapter available")?,
        };
        info!("Using Bluetooth adapter: {}", adapter.name());

        Ok(Self {
            adapter,
            channel: config.rfcomm_channel,
        })
    }

    /// Make sure the adapter is usable before any transport call.
    ///
    /// Failures are logged only. Later operations report their own errors.
    pub async fn prepare(&self) {
        match self.adapter.is_powered().await {
            Ok(true) => debug!("Adapter already powered"),
            Ok(false) => {
                info!("Powering on Bluetooth adapter...");
                if let Err(e) = self.adapter.set_powered(true).await {
                    warn!("Could not power on adapter: {}", e);
                }
            }
            Err(e) => warn!("Could not query adapter power state: {}", e),
        }
    }

    async fn paired_devices(&self) -> bluer::Result<Vec<Device>> {
        let mut devices = Vec::new();

        for addr in self.adapter.device_addresses().await? {
            let device = self.adapter.device(addr)?;
            if device.is_paired().await? {
                let name = device.name().await.unwrap_or(None);
                devices.push(Device::new(addr.to_string(), name, Some(addr.to_string())));
            }
        }

        Ok(devices)
    }
}

#[async_trait]
impl Transport for BluezTransport {
    type Handle = RfcommSession;

    async fn list_bonded_devices(&self) -> Result<Vec<Device>> {
        let devices = self.paired_devices().await.map_err(|e| {
            error!("Error getting bonded devices: {}", e);
            e
        });
        let devices = devices.context("Failed to retrieve paired devices")?;
        info!("Found {} paired device(s)", devices.len());
        Ok(devices)
    }

    async fn connect(&self, device_id: &str) -> Result<RfcommSession> {
        let address = device_id
            .parse::<Address>()
            .with_context(|| format!("Invalid Bluetooth address: {}", device_id))
            .context("Failed to connect to device")?;

        info!("Connecting to {} on RFCOMM channel {}", address, self.channel);
        let stream = Stream::connect(SocketAddr::new(address, self.channel))
            .await
            .map_err(|e| {
                error!("Error connecting to device: {}", e);
                e
            })
            .context("Failed to connect to device")?;

        info!("RFCOMM session open with {}", address);
        Ok(RfcommSession { address, stream })
    }

    async fn write(&self, handle: &mut RfcommSession, bytes: &[u8]) -> Result<()> {
        debug!("Writing {} bytes to {}", bytes.len(), handle.address);
        let result = async {
            handle.stream.write_all(bytes).await?;
            handle.stream.flush().await
        }
        .await;

        result
            .map_err(|e| {
                error!("Error sending message: {}", e);
                e
            })
            .context("Failed to send message")
    }

    async fn disconnect(&self, mut handle: RfcommSession) -> Result<()> {
        info!("Closing RFCOMM session with {}", handle.address);
        handle
            .stream
            .shutdown()
            .await
            .map_err(|e| {
                error!("Error disconnecting: {}", e);
                e
            })
            .context("Failed to disconnect")
    }
}
