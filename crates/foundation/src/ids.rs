use serde::{Deserialize, Serialize};

/// Opaque identifier of one live relay connection.
///
/// Assigned by the relay when a socket connects and valid until that socket
/// disconnects. Clients only ever compare and hash it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        ConnectionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        ConnectionId::new(s)
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        ConnectionId(s)
    }
}
