use foundation::Position;
use serde::{Deserialize, Serialize};

/// Options passed to the host when registering a position watch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    /// Per-fix acquisition timeout.
    pub timeout_ms: u32,
    /// Maximum age of a cached fix the host may hand back; 0 disables caching.
    pub maximum_age_ms: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 5000,
            maximum_age_ms: 0,
        }
    }
}

/// Why a single watch cycle produced no fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(String),
}

impl LocationError {
    /// Maps a W3C `GeolocationPositionError.code`.
    pub fn from_code(code: u16, message: &str) -> Self {
        match code {
            1 => LocationError::PermissionDenied,
            2 => LocationError::PositionUnavailable,
            3 => LocationError::Timeout,
            _ => LocationError::Other(message.to_string()),
        }
    }
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "location permission denied"),
            LocationError::PositionUnavailable => write!(f, "position unavailable"),
            LocationError::Timeout => write!(f, "timed out waiting for a position fix"),
            LocationError::Other(msg) => write!(f, "location error: {msg}"),
        }
    }
}

impl std::error::Error for LocationError {}

pub type Fix = Result<Position, LocationError>;

/// Callback the host invokes once per watch cycle.
pub type FixSink = Box<dyn FnMut(Fix)>;

/// Host handle for a registered watch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WatchId(pub i32);

/// Push-based source of device positions.
pub trait LocationSource {
    /// Capability check; false when the host has no location API at all.
    fn is_available(&self) -> bool;

    /// Registers a persistent watch. The sink keeps receiving fixes and
    /// errors until the host tears the watch down.
    fn watch(&mut self, options: &WatchOptions, sink: FixSink) -> Result<WatchId, LocationError>;
}
