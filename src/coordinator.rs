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

//! Connection coordinator.
//!
//! Owns the device list, the open session and the connection status, and is
//! the only thing that mutates them. Operations take an async lock for their
//! whole duration, so two operations never interleave; while one is in
//! flight its intermediate status (`Scanning`, `Connecting`) is visible
//! through [`Coordinator::snapshot`].
//!
//! ```text
//! Disconnected -> Scanning -> Disconnected | Error
//! Disconnected | Error -> Connecting -> Connected | Error
//! Connected -> Disconnected            (disconnect ok)
//! Connected -> Error                   (disconnect failed, session dropped)
//! ```

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::bluetooth::{Device, FramingError, OutboundMessage, Transport};
use crate::notice::{Notice, NoticeSender};
use crate::state::{ConnectionStatus, SharedState, Snapshot};

/// Why a coordinator operation did not complete.
///
/// Causes are logged, never classified: each failing transport call maps to
/// one fixed variant.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Failed to scan for devices")]
    ScanFailed,

    #[error("Failed to connect to device")]
    ConnectFailed,

    #[error("Already connected to {0}, disconnect first")]
    AlreadyConnected(String),

    #[error("No device connected")]
    NotConnected,

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error("Failed to send message")]
    SendFailed,

    #[error("Failed to disconnect")]
    DisconnectFailed,
}

/// Drives scan, connect, send and disconnect against a transport.
pub struct Coordinator<T: Transport> {
    transport: T,
    state: SharedState,
    session: Mutex<Option<T::Handle>>,
    notices: NoticeSender,
}

impl<T: Transport> Coordinator<T> {
    /// Create a coordinator that reports notices on `notices`.
    pub fn new(transport: T, notices: NoticeSender) -> Self {
        Self {
            transport,
            state: SharedState::new(),
            session: Mutex::new(None),
            notices,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    /// Replace the device list with the bonded devices.
    ///
    /// While a session is open the list is refreshed but status stays
    /// `Connected`, so the status never contradicts the held session.
    pub async fn scan(&self) -> Result<Vec<Device>, CoordinatorError> {
        let session = self.session.lock().await;
        let connected = session.is_some();

        if !connected {
            self.state.set_status(ConnectionStatus::Scanning);
        }
        info!("Scanning for paired devices...");

        match self.transport.list_bonded_devices().await {
            Ok(devices) => {
                info!("Scan complete: {} device(s)", devices.len());
                if connected {
                    self.state.set_devices(devices.clone());
                } else {
                    self.state.set_scanned(devices.clone());
                }
                Ok(devices)
            }
            Err(e) => {
                error!("Scan failed: {:#}", e);
                if !connected {
                    self.state.set_status(ConnectionStatus::Error);
                }
                self.notices.emit(Notice::scan_failed());
                Err(CoordinatorError::ScanFailed)
            }
        }
    }

    /// Open a session to `device`.
    ///
    /// Only accepted when no session is open; an existing session must be
    /// disconnected first.
    pub async fn connect_to_device(&self, device: &Device) -> Result<(), CoordinatorError> {
        let mut session = self.session.lock().await;

        if session.is_some() {
            let current = self
                .state
                .connected_device()
                .map(|d| d.name)
                .unwrap_or_default();
            warn!("Connect to {} refused: already connected to {}", device.name, current);
            self.notices.emit(Notice::already_connected());
            return Err(CoordinatorError::AlreadyConnected(current));
        }

        self.state.set_status(ConnectionStatus::Connecting);
        info!("Connecting to {} ({})", device.name, device.id);

        match self.transport.connect(&device.id).await {
            Ok(handle) => {
                *session = Some(handle);
                self.state.set_connected(device.clone());
                info!("Connected to {}", device.name);
                Ok(())
            }
            Err(e) => {
                error!("Connect failed: {:#}", e);
                self.state.set_status(ConnectionStatus::Error);
                self.notices.emit(Notice::connect_failed());
                Err(CoordinatorError::ConnectFailed)
            }
        }
    }

    /// Send `token` and `device_id` to the connected peripheral.
    ///
    /// Never changes status.
    pub async fn send_message(&self, token: &str, device_id: &str) -> Result<(), CoordinatorError> {
        let mut session = self.session.lock().await;

        let Some(handle) = session.as_mut() else {
            warn!("Send requested with no device connected");
            self.notices.emit(Notice::not_connected());
            return Err(CoordinatorError::NotConnected);
        };

        let message = match OutboundMessage::new(token, device_id) {
            Ok(message) => message,
            Err(e) => {
                warn!("Refusing to send: {}", e);
                self.notices.emit(Notice::error("Error", e.to_string()));
                return Err(e.into());
            }
        };

        match self.transport.write(handle, &message.to_bytes()).await {
            Ok(()) => {
                info!("Token and device ID sent");
                self.notices.emit(Notice::sent());
                Ok(())
            }
            Err(e) => {
                error!("Send failed: {:#}", e);
                self.notices.emit(Notice::send_failed());
                Err(CoordinatorError::SendFailed)
            }
        }
    }

    /// Close the open session, if any.
    ///
    /// If the transport fails to close it, the session is dropped anyway
    /// and status becomes `Error`.
    pub async fn disconnect(&self) -> Result<(), CoordinatorError> {
        let mut session = self.session.lock().await;

        let Some(handle) = session.take() else {
            debug!("Disconnect requested with no active session");
            return Ok(());
        };

        match self.transport.disconnect(handle).await {
            Ok(()) => {
                self.state.set_disconnected();
                info!("Disconnected");
                Ok(())
            }
            Err(e) => {
                error!("Disconnect failed, dropping session: {:#}", e);
                self.state.set_session_lost();
                self.notices.emit(Notice::disconnect_failed());
                Err(CoordinatorError::DisconnectFailed)
            }
        }
    }
}
