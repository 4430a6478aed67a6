//! Browser client: shares this device's position with the relay and shows
//! every connected user on a Leaflet map.
//!
//! Host callbacks (geolocation, WebSocket) never touch the session directly.
//! They push a [`TrackerEvent`] onto the shared bus and pump it; the session
//! drains the bus and runs each event to completion.

use std::cell::RefCell;
use std::sync::OnceLock;

use console_error_panic_hook::set_once;
use runtime::EventBus;
use streaming::FixSink;
use tracker::{TrackerConfig, TrackerEvent, TrackerSession};
use wasm_bindgen::prelude::*;

mod console_log;
mod geolocation;
mod leaflet;
mod socket;

use geolocation::BrowserLocation;
use leaflet::LeafletMapView;
use socket::{WsChannel, relay_url};

type Session = TrackerSession<WsChannel, LeafletMapView>;

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    static BUS: RefCell<EventBus<TrackerEvent>> = RefCell::new(EventBus::new());
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn emit(event: TrackerEvent) {
    if let TrackerEvent::Frame(text) = &event {
        web_sys::console::debug_1(&JsValue::from_str(text));
    }
    BUS.with(|bus| bus.borrow_mut().emit(event));
    pump();
}

/// Drains queued events into the session, if one is running.
fn pump() {
    SESSION.with(|session| {
        // A busy session is mid-dispatch; it will see the event on its next pump.
        let Ok(mut session) = session.try_borrow_mut() else {
            return;
        };
        let Some(session) = session.as_mut() else {
            return;
        };
        BUS.with(|bus| {
            if let Ok(mut bus) = bus.try_borrow_mut() {
                session.dispatch(&mut bus);
            }
        });
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    PANIC_HOOK_SET.get_or_init(set_once);
    console_log::init();
    Ok(())
}

/// Creates the map in `container_id`, connects to the relay and, when the
/// browser supports it, starts sharing this device's position.
///
/// `config_json` is an optional partial [`TrackerConfig`].
#[wasm_bindgen]
pub fn start_tracking(container_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let already_running = SESSION.with(|s| s.borrow().is_some());
    if already_running {
        return Ok(());
    }

    let config = TrackerConfig::from_json(config_json.as_deref())
        .map_err(|e| JsValue::from_str(&format!("invalid tracker config: {e}")))?;

    let view = LeafletMapView::new(container_id)?;
    let channel = WsChannel::connect(&relay_url(&config.channel_path)?, emit)?;
    let mut session = TrackerSession::new(channel, view, &config);

    let mut location = BrowserLocation::new();
    let sink: FixSink = Box::new(|fix| emit(TrackerEvent::Location(fix)));
    if session.start_location(&mut location, sink) {
        log("location: watching position");
    } else {
        log("location: unavailable, map is view-only");
    }

    SESSION.with(|s| *s.borrow_mut() = Some(session));
    pump();
    Ok(())
}

/// Number of users currently shown on the map.
#[wasm_bindgen]
pub fn tracked_count() -> usize {
    SESSION.with(|s| {
        s.borrow()
            .as_ref()
            .map(|session| session.renderer().markers().len())
            .unwrap_or(0)
    })
}

/// Session counters and gauges as a JSON string, for the page console.
#[wasm_bindgen]
pub fn metrics_json() -> String {
    SESSION.with(|s| {
        let Some(snap) = s.borrow().as_ref().map(|session| session.metrics().snapshot()) else {
            return "{}".to_string();
        };
        let mut out = serde_json::Map::new();
        for (name, value) in snap.counters {
            out.insert(name.to_string(), value.into());
        }
        for (name, value) in snap.gauges {
            out.insert(name.to_string(), value.into());
        }
        serde_json::Value::Object(out).to_string()
    })
}
