//! `WebSocket` handler for real-time count updates.
//!
//! Clients connect to `GET /ws/counter` and receive one JSON-encoded
//! [`ChannelMessage`](viewcount_types::ChannelMessage) text frame per
//! increment:
//!
//! ```json
//! {"channel": "counter", "event": "new_user", "data": {"count": 6}}
//! ```
//!
//! Each connection owns a [`Subscription`], so a slow client only delays
//! itself. A failed send ends the connection and drops the subscription.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};
use viewcount_core::{BroadcastPublisher, Subscription};
use viewcount_store::CounterStore;
use viewcount_types::{ChannelMessage, CountUpdateEvent, SubscriberId};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming count updates.
///
/// # Route
///
/// `GET /ws/counter`
pub async fn ws_counter<S: CounterStore>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    // Subscribe before the upgrade completes so no event published after
    // the handshake can be missed.
    let frames = FrameSource::new(state.service.publisher());
    ws.on_upgrade(move |socket| handle_ws(socket, frames))
}

/// One connection's stream of encoded text frames.
///
/// Holds only a receiver and the envelope names, never the sender, so
/// [`next_frame`](Self::next_frame) ends once the publisher is dropped.
#[derive(Debug)]
pub struct FrameSource {
    subscription: Subscription,
    channel: String,
    event: String,
}

impl FrameSource {
    /// Subscribe to `publisher` and capture its channel and event names.
    pub fn new(publisher: &BroadcastPublisher) -> Self {
        Self {
            subscription: publisher.subscribe(),
            channel: publisher.channel().to_owned(),
            event: publisher.event_name().to_owned(),
        }
    }

    /// Identifier of the underlying subscription.
    pub const fn subscriber(&self) -> SubscriberId {
        self.subscription.id()
    }

    /// Encode `event` as the text frame sent to observers.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(&self, event: CountUpdateEvent) -> Result<String, serde_json::Error> {
        serde_json::to_string(&ChannelMessage::new(&self.channel, &self.event, event))
    }

    /// Wait for the next update and encode it.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn next_frame(&mut self) -> Option<String> {
        loop {
            let event = self.subscription.recv().await?;
            match self.encode(event) {
                Ok(json) => return Some(json),
                Err(e) => {
                    warn!(subscriber = %self.subscriber(), "Failed to serialize count update: {e}");
                }
            }
        }
    }
}

/// Handle the `WebSocket` lifecycle: forward each count update as a text
/// frame until either side goes away.
async fn handle_ws(mut socket: WebSocket, mut frames: FrameSource) {
    let subscriber = frames.subscriber();
    debug!(%subscriber, "WebSocket client connected");

    loop {
        tokio::select! {
            // Receive a count update from the publisher.
            frame = frames.next_frame() => {
                let Some(json) = frame else {
                    debug!(%subscriber, "publisher closed, shutting down WebSocket");
                    return;
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(%subscriber, "WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%subscriber, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%subscriber, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%subscriber, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Observers only listen; ignore anything else they send.
                    }
                }
            }
        }
    }
}
