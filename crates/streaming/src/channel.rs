use crate::protocol::{ClientMessage, ProtocolError};

/// Outbound half of the realtime connection to the relay.
///
/// Inbound frames are pushed by the host transport as events; this trait only
/// covers what the client initiates.
pub trait RealtimeChannel {
    fn send(&mut self, message: &ClientMessage) -> Result<(), ChannelError>;
}

#[derive(Debug)]
pub enum ChannelError {
    /// The socket is still connecting or already closed.
    NotOpen,
    Protocol(ProtocolError),
    Transport(String),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::NotOpen => write!(f, "channel is not open"),
            ChannelError::Protocol(e) => write!(f, "{e}"),
            ChannelError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<ProtocolError> for ChannelError {
    fn from(e: ProtocolError) -> Self {
        ChannelError::Protocol(e)
    }
}

/// In-memory channel that records every message sent through it.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    pub sent: Vec<ClientMessage>,
    pub closed: bool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RealtimeChannel for RecordingChannel {
    fn send(&mut self, message: &ClientMessage) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::NotOpen);
        }
        self.sent.push(message.clone());
        Ok(())
    }
}
