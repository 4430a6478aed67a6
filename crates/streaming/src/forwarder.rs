use std::collections::VecDeque;

use foundation::Position;
use tracing::{debug, warn};

use crate::channel::{ChannelError, RealtimeChannel};
use crate::location::{Fix, FixSink, LocationSource, WatchId, WatchOptions};
use crate::protocol::ClientMessage;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Sent,
    /// The channel is not open yet; the message waits for [`LocationForwarder::flush`].
    Queued,
    /// The fix was good but the channel refused it. Not retried.
    SendFailed,
    /// The watch cycle failed; nothing was sent.
    FixFailed,
}

/// Forwards every position fix to the relay as a `send-location` message.
///
/// No batching, throttling or deduplication. A failed cycle is logged and
/// skipped; the watch stays registered however many cycles fail in a row.
/// Messages produced while the channel is still connecting are held, oldest
/// first, until the channel opens.
#[derive(Debug)]
pub struct LocationForwarder {
    options: WatchOptions,
    watch: Option<WatchId>,
    pending: VecDeque<ClientMessage>,
    max_pending: usize,
}

pub const DEFAULT_MAX_PENDING: usize = 64;

impl Default for LocationForwarder {
    fn default() -> Self {
        Self::new(WatchOptions::default())
    }
}

impl LocationForwarder {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            watch: None,
            pending: VecDeque::new(),
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    /// Caps how many messages wait for the channel; beyond it the oldest go.
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    /// Registers the watch if the host supports it. Returns whether the
    /// forwarder is active. An unavailable source is not an error.
    pub fn start<S: LocationSource + ?Sized>(&mut self, source: &mut S, sink: FixSink) -> bool {
        if self.watch.is_some() {
            return true;
        }
        if !source.is_available() {
            debug!("location source unavailable; forwarder inactive");
            return false;
        }
        match source.watch(&self.options, sink) {
            Ok(id) => {
                debug!(watch = id.0, "registered location watch");
                self.watch = Some(id);
                true
            }
            Err(e) => {
                warn!("failed to register location watch: {e}");
                false
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.watch.is_some()
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Sends held messages in order until the channel refuses again.
    /// Returns how many went out.
    pub fn flush<C>(&mut self, channel: &mut C) -> usize
    where
        C: RealtimeChannel + ?Sized,
    {
        let mut sent = 0;
        while let Some(message) = self.pending.front() {
            match channel.send(message) {
                Ok(()) => sent += 1,
                Err(ChannelError::NotOpen) => break,
                Err(e) => warn!("dropping held location fix: {e}"),
            }
            self.pending.pop_front();
        }
        if sent > 0 {
            debug!(sent, "flushed held location fixes");
        }
        sent
    }

    pub fn on_fix<C>(&mut self, fix: Fix, channel: &mut C) -> ForwardOutcome
    where
        C: RealtimeChannel + ?Sized,
    {
        match fix {
            Ok(position) => self.forward(position, channel),
            Err(e) => {
                warn!("location fix failed: {e}");
                ForwardOutcome::FixFailed
            }
        }
    }

    fn forward<C>(&mut self, position: Position, channel: &mut C) -> ForwardOutcome
    where
        C: RealtimeChannel + ?Sized,
    {
        let message = ClientMessage::SendLocation(position);
        if !self.pending.is_empty() {
            self.flush(channel);
            if !self.pending.is_empty() {
                self.hold(message);
                return ForwardOutcome::Queued;
            }
        }
        match channel.send(&message) {
            Ok(()) => ForwardOutcome::Sent,
            Err(ChannelError::NotOpen) => {
                self.hold(message);
                ForwardOutcome::Queued
            }
            Err(e) => {
                warn!("dropping location fix: {e}");
                ForwardOutcome::SendFailed
            }
        }
    }

    fn hold(&mut self, message: ClientMessage) {
        if self.pending.len() >= self.max_pending {
            self.pending.pop_front();
            warn!(max = self.max_pending, "channel not open; dropped oldest held fix");
        }
        self.pending.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::RecordingChannel;
    use crate::location::LocationError;
    use pretty_assertions::assert_eq;

    struct FakeSource {
        available: bool,
        registered: Vec<WatchOptions>,
        sink: Option<FixSink>,
    }

    impl FakeSource {
        fn new(available: bool) -> Self {
            Self {
                available,
                registered: Vec::new(),
                sink: None,
            }
        }
    }

    impl LocationSource for FakeSource {
        fn is_available(&self) -> bool {
            self.available
        }

        fn watch(
            &mut self,
            options: &WatchOptions,
            sink: FixSink,
        ) -> Result<WatchId, LocationError> {
            self.registered.push(*options);
            self.sink = Some(sink);
            Ok(WatchId(self.registered.len() as i32))
        }
    }

    fn send(lat: f64, lon: f64) -> ClientMessage {
        ClientMessage::SendLocation(Position::new(lat, lon))
    }

    #[test]
    fn registers_one_persistent_high_accuracy_watch() {
        let mut source = FakeSource::new(true);
        let mut fwd = LocationForwarder::default();
        assert!(fwd.start(&mut source, Box::new(|_| {})));
        assert!(fwd.start(&mut source, Box::new(|_| {})));
        assert_eq!(
            source.registered,
            vec![WatchOptions {
                enable_high_accuracy: true,
                timeout_ms: 5000,
                maximum_age_ms: 0,
            }]
        );
        assert!(fwd.is_active());
    }

    #[test]
    fn unavailable_source_stays_inactive() {
        let mut source = FakeSource::new(false);
        let mut fwd = LocationForwarder::default();
        assert!(!fwd.start(&mut source, Box::new(|_| {})));
        assert!(source.registered.is_empty());
        assert!(source.sink.is_none());
        assert!(!fwd.is_active());
    }

    #[test]
    fn forwards_every_fix_verbatim() {
        let mut fwd = LocationForwarder::default();
        let mut channel = RecordingChannel::new();
        fwd.on_fix(Ok(Position::new(1.0, 2.0)), &mut channel);
        fwd.on_fix(Ok(Position::new(1.0, 2.0)), &mut channel);
        assert_eq!(channel.sent, vec![send(1.0, 2.0), send(1.0, 2.0)]);
    }

    #[test]
    fn failed_cycle_sends_nothing_and_later_cycles_still_send() {
        let mut fwd = LocationForwarder::default();
        let mut channel = RecordingChannel::new();
        assert_eq!(
            fwd.on_fix(Err(LocationError::Timeout), &mut channel),
            ForwardOutcome::FixFailed
        );
        assert!(channel.sent.is_empty());
        for _ in 0..5 {
            fwd.on_fix(Err(LocationError::PermissionDenied), &mut channel);
        }
        assert_eq!(
            fwd.on_fix(Ok(Position::new(3.0, 4.0)), &mut channel),
            ForwardOutcome::Sent
        );
        assert_eq!(channel.sent, vec![send(3.0, 4.0)]);
    }

    #[test]
    fn fix_before_open_is_held_then_flushed_in_order() {
        let mut fwd = LocationForwarder::default();
        let mut channel = RecordingChannel::new();
        channel.closed = true;
        assert_eq!(
            fwd.on_fix(Ok(Position::new(1.0, 1.0)), &mut channel),
            ForwardOutcome::Queued
        );
        assert_eq!(
            fwd.on_fix(Ok(Position::new(2.0, 2.0)), &mut channel),
            ForwardOutcome::Queued
        );
        assert_eq!(fwd.flush(&mut channel), 0);
        assert_eq!(fwd.pending(), 2);

        channel.closed = false;
        assert_eq!(fwd.flush(&mut channel), 2);
        assert_eq!(fwd.pending(), 0);
        assert_eq!(channel.sent, vec![send(1.0, 1.0), send(2.0, 2.0)]);
    }

    #[test]
    fn new_fix_goes_out_behind_held_ones() {
        let mut fwd = LocationForwarder::default();
        let mut channel = RecordingChannel::new();
        channel.closed = true;
        fwd.on_fix(Ok(Position::new(1.0, 1.0)), &mut channel);
        channel.closed = false;
        assert_eq!(
            fwd.on_fix(Ok(Position::new(2.0, 2.0)), &mut channel),
            ForwardOutcome::Sent
        );
        assert_eq!(channel.sent, vec![send(1.0, 1.0), send(2.0, 2.0)]);
    }

    #[test]
    fn held_fixes_are_capped_dropping_oldest() {
        let mut fwd = LocationForwarder::default().with_max_pending(2);
        let mut channel = RecordingChannel::new();
        channel.closed = true;
        for i in 0..3 {
            fwd.on_fix(Ok(Position::new(i as f64, 0.0)), &mut channel);
        }
        channel.closed = false;
        fwd.flush(&mut channel);
        assert_eq!(channel.sent, vec![send(1.0, 0.0), send(2.0, 0.0)]);
    }

    #[test]
    fn maps_geolocation_error_codes() {
        assert_eq!(LocationError::from_code(1, ""), LocationError::PermissionDenied);
        assert_eq!(LocationError::from_code(3, ""), LocationError::Timeout);
        assert_eq!(
            LocationError::from_code(9, "odd"),
            LocationError::Other("odd".to_string())
        );
    }
}
