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

//! Outbound message framing.
//!
//! The peripheral reads one line per message and splits it on `|`:
//!
//! ```text
//! <token>|<device_id>\n
//! ```
//!
//! Neither field is escaped, so both are checked for reserved characters
//! before anything is put on the wire.

use thiserror::Error;

/// Separator between token and device ID.
pub const FIELD_DELIMITER: char = '|';

/// Terminator for a single message.
pub const LINE_TERMINATOR: char = '\n';

/// Which field of a message failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Token,
    DeviceId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Token => "token",
            Field::DeviceId => "device ID",
        }
    }
}

/// Errors raised while framing an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("Token must not be empty")]
    EmptyToken,

    #[error("The {} contains a reserved character ('|' or line break)", .field.as_str())]
    ReservedCharacter { field: Field },
}

/// Token and device ID destined for the peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    token: String,
    device_id: String,
}

impl OutboundMessage {
    /// Validate and build a message.
    ///
    /// The token is forwarded verbatim; it is only trimmed to check that it
    /// is not blank.
    pub fn new(
        token: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Result<Self, FramingError> {
        let token = token.into();
        let device_id = device_id.into();

        if token.trim().is_empty() {
            return Err(FramingError::EmptyToken);
        }
        if has_reserved(&token) {
            return Err(FramingError::ReservedCharacter { field: Field::Token });
        }
        if has_reserved(&device_id) {
            return Err(FramingError::ReservedCharacter {
                field: Field::DeviceId,
            });
        }

        Ok(Self { token, device_id })
    }

    /// Serialize to the line sent over the serial link.
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}{}",
            self.token, FIELD_DELIMITER, self.device_id, LINE_TERMINATOR
        )
    }

    /// Serialize to raw bytes for the transport.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_line().into_bytes()
    }
}

fn has_reserved(value: &str) -> bool {
    value
        .chars()
        .any(|c| c == FIELD_DELIMITER || c == LINE_TERMINATOR || c == '\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_payload() {
        let msg = OutboundMessage::new("abc123", "device-xyz").unwrap();
        assert_eq!(msg.to_line(), "abc123|device-xyz\n");
        assert_eq!(msg.to_bytes(), b"abc123|device-xyz\n".to_vec());
    }

    #[test]
    fn test_token_is_not_trimmed() {
        let msg = OutboundMessage::new(" abc ", "id").unwrap();
        assert_eq!(msg.to_line(), " abc |id\n");
    }

    #[test]
    fn test_empty_token_rejected() {
        assert_eq!(OutboundMessage::new("", "id"), Err(FramingError::EmptyToken));
        assert_eq!(
            OutboundMessage::new("   \t", "id"),
            Err(FramingError::EmptyToken)
        );
    }

    #[test]
    fn test_delimiter_in_token_rejected() {
        assert_eq!(
            OutboundMessage::new("a|b", "id"),
            Err(FramingError::ReservedCharacter { field: Field::Token })
        );
    }

    #[test]
    fn test_line_break_in_device_id_rejected() {
        assert_eq!(
            OutboundMessage::new("token", "id\n"),
            Err(FramingError::ReservedCharacter {
                field: Field::DeviceId
            })
        );
        assert_eq!(
            OutboundMessage::new("token", "id\r"),
            Err(FramingError::ReservedCharacter {
                field: Field::DeviceId
            })
        );
    }

    #[test]
    fn test_error_message_names_field() {
        let err = OutboundMessage::new("token", "a|b").unwrap_err();
        assert!(err.to_string().contains("device ID"));
    }
}
