use layers::{MapRenderer, MapView, UpdateOutcome};
use runtime::{EventBus, Metrics};
use streaming::{
    FixSink, ForwardOutcome, LocationForwarder, LocationSource, RealtimeChannel, ServerMessage,
};
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::event::TrackerEvent;

pub const FIXES_SENT: &str = "fixes_sent";
pub const FIXES_QUEUED: &str = "fixes_queued";
pub const FIXES_FAILED: &str = "fixes_failed";
pub const SENDS_FAILED: &str = "sends_failed";
pub const UPDATES_RECEIVED: &str = "updates_received";
pub const DISCONNECTS_RECEIVED: &str = "disconnects_received";
pub const FRAMES_DROPPED: &str = "frames_dropped";
pub const MARKERS: &str = "markers";

/// One client: forwards local fixes out, renders everyone's fixes in.
///
/// All state is owned here and mutated only by [`TrackerSession::handle`],
/// which the host calls from its single event loop.
pub struct TrackerSession<C, V: MapView> {
    channel: C,
    forwarder: LocationForwarder,
    renderer: MapRenderer<V>,
    metrics: Metrics,
}

impl<C: RealtimeChannel, V: MapView> TrackerSession<C, V> {
    pub fn new(channel: C, view: V, config: &TrackerConfig) -> Self {
        Self {
            channel,
            forwarder: LocationForwarder::new(config.watch),
            renderer: MapRenderer::new(view, &config.map),
            metrics: Metrics::new(),
        }
    }

    /// Registers the location watch. The sink should push
    /// [`TrackerEvent::Location`] into the host's event bus.
    pub fn start_location<S>(&mut self, source: &mut S, sink: FixSink) -> bool
    where
        S: LocationSource + ?Sized,
    {
        self.forwarder.start(source, sink)
    }

    pub fn handle(&mut self, event: TrackerEvent) {
        match event {
            TrackerEvent::Location(fix) => {
                let counter = match self.forwarder.on_fix(fix, &mut self.channel) {
                    ForwardOutcome::Sent => FIXES_SENT,
                    ForwardOutcome::Queued => FIXES_QUEUED,
                    ForwardOutcome::SendFailed => SENDS_FAILED,
                    ForwardOutcome::FixFailed => FIXES_FAILED,
                };
                self.metrics.inc(counter);
            }
            TrackerEvent::Frame(text) => match ServerMessage::from_json(&text) {
                Ok(msg) => self.handle_message(msg),
                Err(e) => {
                    warn!("dropping relay frame: {e}");
                    self.metrics.inc(FRAMES_DROPPED);
                }
            },
            TrackerEvent::ChannelOpened => {
                info!("relay channel open");
                let flushed = self.forwarder.flush(&mut self.channel);
                self.metrics.inc_by(FIXES_SENT, flushed as u64);
            }
            TrackerEvent::ChannelClosed => info!("relay channel closed"),
        }
    }

    fn handle_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Connected(id) => {
                debug!(%id, "relay assigned connection id");
                self.renderer.set_own_id(id);
            }
            ServerMessage::ReceiveLocation(update) => {
                self.metrics.inc(UPDATES_RECEIVED);
                if self.renderer.handle_located_update(&update.id, update.position)
                    == UpdateOutcome::Created
                {
                    self.sync_marker_gauge();
                }
            }
            ServerMessage::UserDisconnected(id) => {
                self.metrics.inc(DISCONNECTS_RECEIVED);
                if self.renderer.handle_disconnect(&id) {
                    self.sync_marker_gauge();
                }
            }
        }
    }

    fn sync_marker_gauge(&mut self) {
        self.metrics
            .set_gauge(MARKERS, self.renderer.markers().len() as i64);
    }

    /// Runs every queued event to completion, in order. Returns how many ran.
    pub fn dispatch(&mut self, bus: &mut EventBus<TrackerEvent>) -> usize {
        let mut handled = 0;
        while let Some(next) = bus.pop() {
            self.handle(next.event);
            handled += 1;
        }
        handled
    }

    pub fn renderer(&self) -> &MapRenderer<V> {
        &self.renderer
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Fixes waiting for the channel to open.
    pub fn pending_fixes(&self) -> usize {
        self.forwarder.pending()
    }

    pub fn is_forwarding(&self) -> bool {
        self.forwarder.is_active()
    }
}
