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

//! Console input parsing.
//!
//! Maps lines typed at the prompt to coordinator actions.

use std::future::Future;

use crate::bluetooth::Device;

/// Help shown by the `help` command.
pub const HELP: &str = "\
Commands:
  scan                      list paired devices
  list                      show the last scan results
  connect <number|address>  connect to a device
  send <token>              send the token and this install's ID
  disconnect                close the connection
  status                    show the connection status
  id                        show this install's ID
  help                      show this help
  quit                      exit";

/// Which device a `connect` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// 1-based position in the last scan results.
    Index(usize),
    /// Device ID or address.
    Id(String),
}

impl DeviceSelector {
    fn parse(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(n) => Self::Index(n),
            Err(_) => Self::Id(s.to_string()),
        }
    }

    /// Find the selected device in a scan result.
    pub fn resolve<'a>(&self, devices: &'a [Device]) -> Option<&'a Device> {
        match self {
            Self::Index(n) => n.checked_sub(1).and_then(|i| devices.get(i)),
            Self::Id(id) => devices.iter().find(|d| {
                d.id.eq_ignore_ascii_case(id)
                    || d.address
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(id))
            }),
        }
    }
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Scan,
    List,
    Connect(DeviceSelector),
    /// Token exactly as typed after the command word.
    Send(String),
    Disconnect,
    Status,
    ShowId,
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    MissingArgument(&'static str),
    Unknown(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Nothing entered"),
            ParseError::MissingArgument(usage) => write!(f, "Usage: {}", usage),
            ParseError::Unknown(cmd) => write!(f, "Unknown command '{}', try 'help'", cmd),
        }
    }
}

impl ConsoleCommand {
    /// Parse a single input line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();

        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (trimmed, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "scan" => Ok(Self::Scan),
            "list" | "ls" => Ok(Self::List),
            "connect" => match rest.trim() {
                "" => Err(ParseError::MissingArgument("connect <number|address>")),
                target => Ok(Self::Connect(DeviceSelector::parse(target))),
            },
            "send" => {
                if rest.trim().is_empty() {
                    Err(ParseError::MissingArgument("send <token>"))
                } else {
                    Ok(Self::Send(rest.to_string()))
                }
            }
            "disconnect" => Ok(Self::Disconnect),
            "status" => Ok(Self::Status),
            "id" => Ok(Self::ShowId),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

/// Run `op` unless `interrupt` resolves first.
///
/// `interrupt` is polled first and by reference, so one long-lived signal
/// future can be shared across calls. A signal that fired while nothing was
/// running is seen by the next call.
pub async fn until_interrupted<F, I>(op: F, interrupt: &mut I) -> Option<F::Output>
where
    F: Future,
    I: Future + Unpin,
{
    tokio::select! {
        biased;
        _ = interrupt => None,
        output = op => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ConsoleCommand::parse("scan"), Ok(ConsoleCommand::Scan));
        assert_eq!(ConsoleCommand::parse("  SCAN \n"), Ok(ConsoleCommand::Scan));
        assert_eq!(ConsoleCommand::parse("disconnect"), Ok(ConsoleCommand::Disconnect));
        assert_eq!(ConsoleCommand::parse("exit"), Ok(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse(""), Err(ParseError::Empty));
        assert_eq!(
            ConsoleCommand::parse("pair"),
            Err(ParseError::Unknown("pair".to_string()))
        );
    }

    #[test]
    fn test_parse_connect() {
        assert_eq!(
            ConsoleCommand::parse("connect 2"),
            Ok(ConsoleCommand::Connect(DeviceSelector::Index(2)))
        );
        assert_eq!(
            ConsoleCommand::parse("connect 98:D3:31:F5:1A:2B"),
            Ok(ConsoleCommand::Connect(DeviceSelector::Id(
                "98:D3:31:F5:1A:2B".to_string()
            )))
        );
        assert!(matches!(
            ConsoleCommand::parse("connect"),
            Err(ParseError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_parse_send_keeps_token() {
        assert_eq!(
            ConsoleCommand::parse("send abc123\n"),
            Ok(ConsoleCommand::Send("abc123".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("send  two words "),
            Ok(ConsoleCommand::Send("two words ".to_string()))
        );
        assert!(matches!(
            ConsoleCommand::parse("send    "),
            Err(ParseError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_resolve_selector() {
        let devices = vec![
            Device::new(
                "AA:BB:CC:DD:EE:01",
                Some("Door".to_string()),
                Some("AA:BB:CC:DD:EE:01".to_string()),
            ),
            Device::new(
                "AA:BB:CC:DD:EE:02",
                None,
                Some("AA:BB:CC:DD:EE:02".to_string()),
            ),
        ];

        assert_eq!(DeviceSelector::Index(1).resolve(&devices), Some(&devices[0]));
        assert_eq!(DeviceSelector::Index(0).resolve(&devices), None);
        assert_eq!(DeviceSelector::Index(3).resolve(&devices), None);
        assert_eq!(
            DeviceSelector::Id("aa:bb:cc:dd:ee:02".to_string()).resolve(&devices),
            Some(&devices[1])
        );
        assert_eq!(DeviceSelector::Id("nope".to_string()).resolve(&devices), None);
    }

    #[tokio::test]
    async fn test_interrupt_stops_running_operation() {
        let (tx, rx) = oneshot::channel::<()>();
        let mut interrupt = rx;

        let op = async {
            tx.send(()).unwrap();
            // Never completes, like a hung connect
            std::future::pending::<()>().await
        };

        assert_eq!(until_interrupted(op, &mut interrupt).await, None);
    }

    #[tokio::test]
    async fn test_earlier_interrupt_not_lost() {
        let (tx, mut interrupt) = oneshot::channel::<()>();
        tx.send(()).unwrap();

        // Fired between commands: the next command sees it
        assert_eq!(until_interrupted(async { 1 }, &mut interrupt).await, None);
    }

    #[tokio::test]
    async fn test_operation_completes_without_interrupt() {
        let (_tx, mut interrupt) = oneshot::channel::<()>();

        assert_eq!(until_interrupted(async { 7 }, &mut interrupt).await, Some(7));
        assert_eq!(until_interrupted(async { 8 }, &mut interrupt).await, Some(8));
    }
}
