/// Shared types and message definitions for Pico Timer
use log::debug;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Text commands understood by the remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Timeout,
}

impl Command {
    /// Literal text sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status report pushed by the remote device, e.g. `{"running": true}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub running: Option<bool>,
}

impl StatusMessage {
    /// Parse an inbound frame. Only invalid JSON is an error; any other
    /// shape than `{"running": bool}` yields an empty message.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            debug!("ignoring non-object status {}", text);
            return Ok(Self::default());
        }

        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            debug!("ignoring unrecognised status {}: {}", text, e);
            Self::default()
        }))
    }
}

/// Connection lifecycle stage shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,       // Connect attempt failed - cleared by the next connect
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Error => "Connection error",
        }
    }
}

/// Events sent from a connection task back to the GUI
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkEvent {
    pub connection_id: Uuid,
    pub kind: NetworkEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEventKind {
    /// Handshake completed
    Opened,
    /// Well-formed status report from the device
    Status(StatusMessage),
    /// Socket closed, by either side
    Closed,
    /// Transport error; the connection is gone
    Failed(String),
}

/// Transport errors inside a connection task
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to create async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_lowercase_literals() {
        assert_eq!(Command::Start.as_str(), "start");
        assert_eq!(Command::Stop.as_str(), "stop");
        assert_eq!(Command::Timeout.to_string(), "timeout");
    }

    #[test]
    fn status_message_reads_running_flag() {
        let msg = StatusMessage::parse(r#"{"running": false}"#).unwrap();
        assert_eq!(msg.running, Some(false));

        let msg = StatusMessage::parse(r#"{"running": true, "remaining": 12.5}"#).unwrap();
        assert_eq!(msg.running, Some(true));
    }

    #[test]
    fn status_message_without_running_is_accepted() {
        let msg = StatusMessage::parse(r#"{"battery": 87}"#).unwrap();
        assert_eq!(msg.running, None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(StatusMessage::parse("not json").is_err());
        assert!(StatusMessage::parse(r#"{"running": "#).is_err());
    }

    #[test]
    fn other_json_shapes_are_accepted_as_empty() {
        for text in ["5", "[]", "[true]", "null", r#""running""#, r#"{"running": "yes"}"#] {
            assert_eq!(StatusMessage::parse(text).unwrap(), StatusMessage::default(), "{}", text);
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert_eq!(ConnectionStatus::Error.label(), "Connection error");
    }
}
