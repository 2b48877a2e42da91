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

//! User-visible notices raised by the coordinator.

use tokio::sync::mpsc;
use tracing::debug;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short message for the user, shown as an alert by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub fn error(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title,
            message: message.into(),
        }
    }

    pub fn success(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title,
            message: message.into(),
        }
    }

    pub fn scan_failed() -> Self {
        Self::error("Error", "Failed to scan for devices")
    }

    pub fn connect_failed() -> Self {
        Self::error("Connection Error", "Failed to connect to device")
    }

    pub fn already_connected() -> Self {
        Self::error("Connection Error", "Already connected, disconnect first")
    }

    pub fn not_connected() -> Self {
        Self::error("Error", "No device connected")
    }

    pub fn sent() -> Self {
        Self::success("Success", "Token and device ID sent successfully")
    }

    pub fn send_failed() -> Self {
        Self::error("Error", "Failed to send message")
    }

    pub fn disconnect_failed() -> Self {
        Self::error("Error", "Failed to disconnect")
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Create a notice channel.
pub fn channel() -> (NoticeSender, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSender { tx }, rx)
}

/// Sending half handed to the coordinator.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    pub fn emit(&self, notice: Notice) {
        debug!("Notice: {}", notice);
        // Receiver gone means nobody is listening
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_receiver() {
        let (tx, mut rx) = channel();
        tx.emit(Notice::sent());

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(
            notice.to_string(),
            "Success: Token and device ID sent successfully"
        );
    }

    #[test]
    fn test_emit_without_receiver() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit(Notice::scan_failed());
    }
}
