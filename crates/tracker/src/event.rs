use streaming::Fix;

/// Everything the host feeds into a tracker session.
///
/// Location events and channel events come from two independent host
/// subscriptions and meet in one queue.
#[derive(Debug)]
pub enum TrackerEvent {
    Location(Fix),
    /// Raw text frame from the relay.
    Frame(String),
    ChannelOpened,
    ChannelClosed,
}
