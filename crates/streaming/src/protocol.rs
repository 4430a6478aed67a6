//! Wire protocol between location clients and the relay.
//!
//! Every frame is a JSON text message carrying one named event:
//! `{"event": "<name>", "data": <payload>}`. Event names match the
//! Socket.IO events the map page was originally written against.
//!
//! - `send-location` (client → relay): a raw position sample
//! - `connected` (relay → client): the connection id assigned to this socket
//! - `receive-location` (relay → every client): a position tagged with its sender
//! - `user-disconnected` (relay → every client): a sender went away

use foundation::{ConnectionId, Position};
use serde::{Deserialize, Serialize};

/// Message from client to relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    SendLocation(Position),
}

/// Message from relay to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, to the new socket only.
    Connected(ConnectionId),

    ReceiveLocation(LocatedUpdate),

    UserDisconnected(ConnectionId),
}

/// A position rebroadcast by the relay, tagged with the connection that sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedUpdate {
    pub id: ConnectionId,
    #[serde(flatten)]
    pub position: Position,
}

impl LocatedUpdate {
    pub fn new(id: impl Into<ConnectionId>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Encode(e) => write!(f, "failed to encode frame: {e}"),
            ProtocolError::Decode(e) => write!(f, "malformed frame: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Encode(e) | ProtocolError::Decode(e) => Some(e),
        }
    }
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn send_location_wire_shape() {
        let msg = ClientMessage::SendLocation(Position::new(10.5, -3.25));
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"event":"send-location","data":{"latitude":10.5,"longitude":-3.25}}"#
        );
    }

    #[test]
    fn parses_receive_location() {
        let text = r#"{"event":"receive-location","data":{"id":"A","latitude":10,"longitude":20}}"#;
        assert_eq!(
            ServerMessage::from_json(text).unwrap(),
            ServerMessage::ReceiveLocation(LocatedUpdate::new("A", Position::new(10.0, 20.0)))
        );
    }

    #[test]
    fn user_disconnected_carries_bare_id() {
        let msg = ServerMessage::UserDisconnected(ConnectionId::new("B"));
        let text = msg.to_json().unwrap();
        assert_eq!(text, r#"{"event":"user-disconnected","data":"B"}"#);
        assert_eq!(ServerMessage::from_json(&text).unwrap(), msg);
    }

    #[test]
    fn rejects_unknown_event() {
        let err = ServerMessage::from_json(r#"{"event":"chat","data":"hi"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn rejects_missing_coordinate() {
        let text = r#"{"event":"send-location","data":{"latitude":1.0}}"#;
        assert!(ClientMessage::from_json(text).is_err());
    }
}
