//! Count update events and the channel envelope pushed to observers.
//!
//! A [`CountUpdateEvent`] is produced once per successful increment. The
//! HTTP response body and every pub/sub payload are this exact value, so
//! the caller and the observers can never disagree about the count.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Channel name observers subscribe to.
pub const DEFAULT_CHANNEL: &str = "counter";

/// Event name carried by every count update.
pub const DEFAULT_EVENT: &str = "new_user";

/// The `{count: N}` payload emitted on every successful increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountUpdateEvent {
    /// The counter value produced by the increment.
    #[ts(type = "number")]
    pub count: u64,
}

impl CountUpdateEvent {
    /// Create an event for the given count.
    pub const fn new(count: u64) -> Self {
        Self { count }
    }
}

/// Envelope wrapping an event with its channel and event name.
///
/// This is the text frame a `WebSocket` observer receives:
///
/// ```json
/// {"channel": "counter", "event": "new_user", "data": {"count": 6}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChannelMessage {
    /// Logical channel name.
    pub channel: String,
    /// Event name within the channel.
    pub event: String,
    /// The event payload.
    pub data: CountUpdateEvent,
}

impl ChannelMessage {
    /// Wrap `data` for the given channel and event name.
    pub fn new(channel: &str, event: &str, data: CountUpdateEvent) -> Self {
        Self {
            channel: channel.to_owned(),
            event: event.to_owned(),
            data,
        }
    }
}
