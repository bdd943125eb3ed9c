//! NATS relay for count update events.
//!
//! The relay is one more subscriber of the [`BroadcastPublisher`]: it
//! drains its own [`Subscription`] on a background task and republishes
//! each event as JSON `{"count": N}` on subject `{channel}.{event}`
//! (`counter.new_user` by default). Publish failures are logged and the
//! relay moves on to the next event; they never reach an HTTP caller.
//!
//! [`BroadcastPublisher`]: crate::publisher::BroadcastPublisher

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use viewcount_types::CountUpdateEvent;

use crate::error::RelayError;
use crate::publisher::Subscription;

/// Build the NATS subject for a channel/event pair.
pub fn subject_for(channel: &str, event: &str) -> String {
    format!("{channel}.{event}")
}

/// Publishes count updates to a NATS subject.
pub struct NatsRelay {
    client: async_nats::Client,
    subject: String,
}

impl NatsRelay {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str, channel: &str, event: &str) -> Result<Self, RelayError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| RelayError::Nats(format!("failed to connect to {url}: {e}")))?;
        let subject = subject_for(channel, event);
        info!(subject = subject, "NATS relay connected");
        Ok(Self { client, subject })
    }

    /// Subject events are published on.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Publish one event.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] if serialization or publishing fails.
    pub async fn forward(&self, event: CountUpdateEvent) -> Result<(), RelayError> {
        let payload = serde_json::to_vec(&event)?;
        debug!(subject = self.subject, count = event.count, "relaying count update");
        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| RelayError::Nats(format!("failed to publish to {}: {e}", self.subject)))
    }

    /// Forward every event from `subscription` until the publisher closes.
    pub fn spawn(self, mut subscription: Subscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                if let Err(e) = self.forward(event).await {
                    warn!(
                        subject = self.subject,
                        count = event.count,
                        error = %e,
                        "failed to relay count update"
                    );
                }
            }
            info!(subject = self.subject, "NATS relay stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use std::time::Duration;

    use futures::StreamExt as _;

    use super::*;
    use crate::publisher::BroadcastPublisher;

    #[test]
    fn subject_joins_channel_and_event() {
        assert_eq!(subject_for("counter", "new_user"), "counter.new_user");
    }

    #[tokio::test]
    async fn connect_to_unreachable_server_fails() {
        let result = NatsRelay::connect("nats://127.0.0.1:1", "counter", "new_user").await;
        assert!(matches!(result, Err(RelayError::Nats(_))));
    }

    #[tokio::test]
    #[ignore = "requires a live NATS server on localhost:4222"]
    async fn relays_published_events() {
        let url = "nats://localhost:4222";
        let listener = async_nats::connect(url)
            .await
            .expect("Failed to connect to NATS -- is Docker running?");
        let mut inbox = listener.subscribe("counter.new_user".to_owned()).await.unwrap();
        listener.flush().await.unwrap();

        let publisher = BroadcastPublisher::new(16, "counter", "new_user");
        let relay = NatsRelay::connect(url, "counter", "new_user").await.unwrap();
        let handle = relay.spawn(publisher.subscribe());

        publisher.publish(CountUpdateEvent::new(6));

        let msg = tokio::time::timeout(Duration::from_secs(5), inbox.next())
            .await
            .unwrap()
            .unwrap();
        let event: CountUpdateEvent = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(event, CountUpdateEvent::new(6));

        drop(publisher);
        handle.await.unwrap();
    }
}
