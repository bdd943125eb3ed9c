//! Broadcast publisher for count update events.
//!
//! Built on [`tokio::sync::broadcast`]: [`BroadcastPublisher::publish`]
//! copies the event into a bounded ring buffer and returns immediately,
//! and each [`Subscription`] drains its own cursor into that buffer. A
//! slow observer therefore costs only its own backlog. If it falls more
//! than `capacity` events behind, the oldest events are dropped for that
//! subscriber alone and the gap is logged.
//!
//! There is no replay. A subscription sees only events published after
//! [`BroadcastPublisher::subscribe`] returned, in publish order.

use tokio::sync::broadcast;
use tracing::{debug, warn};
use viewcount_types::{ChannelMessage, CountUpdateEvent, SubscriberId};

/// Fan-out point for [`CountUpdateEvent`]s on one channel/event name.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<CountUpdateEvent>,
    channel: String,
    event: String,
}

impl BroadcastPublisher {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    ///
    /// A `capacity` of zero is raised to one.
    pub fn new(capacity: usize, channel: &str, event: &str) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            channel: channel.to_owned(),
            event: event.to_owned(),
        }
    }

    /// Queue `event` for every live subscription.
    ///
    /// Returns the number of subscriptions it was queued for. Returns 0 if
    /// nobody is subscribed (this is not an error).
    pub fn publish(&self, event: CountUpdateEvent) -> usize {
        // send returns Err only when there are zero receivers.
        self.tx.send(event).unwrap_or(0)
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> Subscription {
        let subscription = Subscription {
            id: SubscriberId::new(),
            rx: self.tx.subscribe(),
        };
        debug!(subscriber = %subscription.id, channel = %self.channel, "subscribed");
        subscription
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Channel name stamped on outgoing messages.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Event name stamped on outgoing messages.
    pub fn event_name(&self) -> &str {
        &self.event
    }

    /// Wrap `event` in the channel envelope observers receive.
    pub fn envelope(&self, event: CountUpdateEvent) -> ChannelMessage {
        ChannelMessage::new(&self.channel, &self.event, event)
    }
}

/// One observer's view of the publisher.
///
/// Dropping the subscription unsubscribes it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: broadcast::Receiver<CountUpdateEvent>,
}

impl Subscription {
    /// Identifier used in log lines for this subscription.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the publisher has been dropped. Events lost to
    /// lag are logged and skipped.
    pub async fn recv(&mut self) -> Option<CountUpdateEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(subscriber = %self.id, skipped, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Return the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<CountUpdateEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(subscriber = %self.id, skipped, "subscriber lagged, events dropped");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {
        debug!(subscriber = %self.id, "unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(capacity: usize) -> BroadcastPublisher {
        BroadcastPublisher::new(capacity, "counter", "new_user")
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let p = publisher(4);
        assert_eq!(p.publish(CountUpdateEvent::new(1)), 0);
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_event_in_order() {
        let p = publisher(16);
        let mut a = p.subscribe();
        let mut b = p.subscribe();

        for count in 1..=5 {
            assert_eq!(p.publish(CountUpdateEvent::new(count)), 2);
        }

        for sub in [&mut a, &mut b] {
            for count in 1..=5 {
                assert_eq!(sub.recv().await, Some(CountUpdateEvent::new(count)));
            }
            assert_eq!(sub.try_recv(), None);
        }
    }

    #[tokio::test]
    async fn late_subscriber_sees_only_later_events() {
        let p = publisher(16);
        let mut early = p.subscribe();
        p.publish(CountUpdateEvent::new(1));

        let mut late = p.subscribe();
        p.publish(CountUpdateEvent::new(2));

        assert_eq!(early.recv().await, Some(CountUpdateEvent::new(1)));
        assert_eq!(early.recv().await, Some(CountUpdateEvent::new(2)));
        assert_eq!(late.recv().await, Some(CountUpdateEvent::new(2)));
        assert_eq!(late.try_recv(), None);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_ahead_without_blocking_publisher() {
        let p = publisher(2);
        let mut slow = p.subscribe();

        for count in 1..=5 {
            p.publish(CountUpdateEvent::new(count));
        }

        // Only the newest `capacity` events are retained.
        assert_eq!(slow.recv().await, Some(CountUpdateEvent::new(4)));
        assert_eq!(slow.recv().await, Some(CountUpdateEvent::new(5)));
    }

    #[tokio::test]
    async fn closed_publisher_ends_subscription() {
        let p = publisher(4);
        let mut sub = p.subscribe();
        drop(p);
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn unsubscribe_releases_receiver() {
        let p = publisher(4);
        let sub = p.subscribe();
        assert_eq!(p.subscriber_count(), 1);
        sub.unsubscribe();
        assert_eq!(p.subscriber_count(), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let p = publisher(0);
        let mut sub = p.subscribe();
        p.publish(CountUpdateEvent::new(9));
        assert_eq!(sub.try_recv(), Some(CountUpdateEvent::new(9)));
    }

    #[test]
    fn envelope_uses_configured_names() {
        let p = BroadcastPublisher::new(4, "lobby", "viewer");
        let msg = p.envelope(CountUpdateEvent::new(3));
        assert_eq!(msg.channel, "lobby");
        assert_eq!(msg.event, "viewer");
        assert_eq!(msg.data.count, 3);
    }
}
