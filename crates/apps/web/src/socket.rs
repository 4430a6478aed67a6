use streaming::{ChannelError, ClientMessage, RealtimeChannel};
use tracker::TrackerEvent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

/// Builds `ws(s)://<page host><path>` from the current page location.
pub fn relay_url(path: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let location = window.location();
    let scheme = if location.protocol()? == "https:" {
        "wss"
    } else {
        "ws"
    };
    Ok(format!("{scheme}://{}{path}", location.host()?))
}

/// [`RealtimeChannel`] over a browser WebSocket.
///
/// Inbound traffic is not read here: the socket callbacks push
/// [`TrackerEvent`]s through `emit`, and the session picks them up on the
/// next dispatch.
pub struct WsChannel {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl WsChannel {
    pub fn connect(url: &str, emit: fn(TrackerEvent)) -> Result<Self, JsValue> {
        let socket = WebSocket::new(url)?;

        let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            emit(TrackerEvent::ChannelOpened);
        });
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            match ev.data().as_string() {
                Some(text) => emit(TrackerEvent::Frame(text)),
                None => web_sys::console::log_1(&JsValue::from_str(
                    "relay: ignoring non-text frame",
                )),
            }
        });
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
            web_sys::console::log_1(&JsValue::from_str(&format!(
                "relay: closed (code {})",
                ev.code()
            )));
            emit(TrackerEvent::ChannelClosed);
        });
        let on_error = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            web_sys::console::error_1(&ev);
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        })
    }
}

impl RealtimeChannel for WsChannel {
    fn send(&mut self, message: &ClientMessage) -> Result<(), ChannelError> {
        if self.socket.ready_state() != WebSocket::OPEN {
            return Err(ChannelError::NotOpen);
        }
        let text = message.to_json()?;
        self.socket
            .send_with_str(&text)
            .map_err(|e| ChannelError::Transport(format!("{e:?}")))
    }
}
