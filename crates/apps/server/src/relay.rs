//! Location relay.
//!
//! Every socket gets a fresh connection id. Each `send-location` it sends is
//! rebroadcast to all sockets (sender included) as `receive-location` tagged
//! with that id; when the socket goes away the remaining sockets get
//! `user-disconnected`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use dashmap::DashMap;
use foundation::{ConnectionId, PositionError};
use futures_util::{SinkExt, StreamExt};
use streaming::{ClientMessage, LocatedUpdate, ProtocolError, ServerMessage};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub connected_at: Instant,
}

#[derive(Debug)]
pub enum RelayError {
    Protocol(ProtocolError),
    InvalidPosition(PositionError),
    UnknownConnection,
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Protocol(e) => write!(f, "{e}"),
            RelayError::InvalidPosition(e) => write!(f, "invalid position: {e}"),
            RelayError::UnknownConnection => write!(f, "frame from unregistered connection"),
        }
    }
}

impl std::error::Error for RelayError {}

/// Shared fan-out state: live connections plus one broadcast channel.
pub struct Relay {
    connections: DashMap<ConnectionId, ConnectionInfo>,
    tx: broadcast::Sender<ServerMessage>,
}

impl Relay {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            connections: DashMap::new(),
            tx,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Registers a connection and subscribes it to the broadcast. The
    /// subscription exists before the caller sends anything, so no
    /// broadcast after this point is missed.
    pub fn join(&self, id: ConnectionId) -> broadcast::Receiver<ServerMessage> {
        let rx = self.tx.subscribe();
        self.connections.insert(
            id,
            ConnectionInfo {
                connected_at: Instant::now(),
            },
        );
        rx
    }

    /// Unregisters a connection and tells everyone else. A second call for
    /// the same id does nothing.
    pub fn leave(&self, id: &ConnectionId) {
        if let Some((id, info)) = self.connections.remove(id) {
            debug!(%id, secs = info.connected_at.elapsed().as_secs(), "connection left");
            self.broadcast(ServerMessage::UserDisconnected(id));
        }
    }

    pub fn on_frame(&self, id: &ConnectionId, text: &str) -> Result<(), RelayError> {
        let ClientMessage::SendLocation(position) =
            ClientMessage::from_json(text).map_err(RelayError::Protocol)?;
        let position = position.validated().map_err(RelayError::InvalidPosition)?;

        if !self.connections.contains_key(id) {
            return Err(RelayError::UnknownConnection);
        }
        self.broadcast(ServerMessage::ReceiveLocation(LocatedUpdate::new(
            id.clone(),
            position,
        )));
        Ok(())
    }

    fn broadcast(&self, msg: ServerMessage) {
        // Err only means nobody is subscribed right now.
        let _ = self.tx.send(msg);
    }
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.relay))
}

pub async fn handle_socket(socket: WebSocket, relay: Arc<Relay>) {
    let id = ConnectionId::new(Uuid::new_v4().to_string());
    let mut rx = relay.join(id.clone());
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!(%id, "connection joined");

    let hello = ServerMessage::Connected(id.clone());
    let send_id = id.clone();
    let sender_task = tokio::spawn(async move {
        if let Err(e) = send_json(&mut ws_tx, &hello).await {
            warn!(id = %send_id, "failed to send hello: {e}");
            return;
        }
        loop {
            let msg = match rx.recv().await {
                Ok(msg) => msg,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(id = %send_id, skipped, "subscriber lagging; dropped broadcasts");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if let Err(e) = send_json(&mut ws_tx, &msg).await {
                debug!(id = %send_id, "send failed, stopping writer: {e}");
                break;
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!(%id, "receive error: {e}");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                if let Err(e) = relay.on_frame(&id, &text) {
                    warn!(%id, "dropping frame: {e}");
                }
            }
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    sender_task.abort();
    relay.leave(&id);
    info!(%id, "connection closed");
}

async fn send_json<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), String>
where
    S: futures_util::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = msg.to_json().map_err(|e| {
        error!("failed to serialize message: {e}");
        e.to_string()
    })?;
    sink.send(Message::Text(text))
        .await
        .map_err(|e| e.to_string())
}
