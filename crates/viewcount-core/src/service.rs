//! The increment service: the only writer of the counter.
//!
//! [`IncrementService`] owns the store behind a [`tokio::sync::Mutex`]. Each
//! [`increment`](IncrementService::increment) holds the lock across
//! read, add-one, durable write and event hand-off, so increments are
//! totally ordered and no two callers can observe the same value.
//!
//! The hand-off to the [`BroadcastPublisher`] happens before the lock is
//! released. It only enqueues into the broadcast ring and never waits on
//! an observer, so subscriber I/O stays outside the critical section while
//! every subscriber still sees counts in increment order.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use viewcount_store::{CounterStore, StoreError};
use viewcount_types::CountUpdateEvent;

use crate::config::MalformedPolicy;
use crate::error::CounterError;
use crate::publisher::BroadcastPublisher;

/// Upper bound on a single store read or write.
///
/// Expiry drops the store future, which does not cancel I/O already handed
/// off elsewhere: a file rename running on the blocking pool, or a `SET`
/// already sent to Dragonfly, may still land after the caller got
/// [`CounterError::StorageUnavailable`]. The next increment reads whatever
/// settled, so counts stay unique, but a timed-out increment can still
/// have been counted.
pub const STORAGE_TIMEOUT: Duration = Duration::from_secs(2);

/// Serialized read-modify-write over a [`CounterStore`].
pub struct IncrementService<S> {
    store: Mutex<S>,
    publisher: BroadcastPublisher,
    policy: MalformedPolicy,
    timeout: Duration,
}

impl<S: CounterStore> IncrementService<S> {
    /// Take ownership of `store` and load the starting count.
    ///
    /// A missing value starts the counter at 0. A malformed value follows
    /// `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::StorageUnavailable`] if the store cannot be
    /// read, or [`CounterError::MalformedPersistedValue`] under
    /// [`MalformedPolicy::Fail`].
    pub async fn open(
        store: S,
        publisher: BroadcastPublisher,
        policy: MalformedPolicy,
    ) -> Result<Self, CounterError> {
        Self::open_with_timeout(store, publisher, policy, STORAGE_TIMEOUT).await
    }

    /// Like [`open`](Self::open) with a custom bound on store calls.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub async fn open_with_timeout(
        store: S,
        publisher: BroadcastPublisher,
        policy: MalformedPolicy,
        timeout: Duration,
    ) -> Result<Self, CounterError> {
        let location = store.location();
        let service = Self {
            store: Mutex::new(store),
            publisher,
            policy,
            timeout,
        };
        let initial = service.current().await?;
        info!(%location, count = initial, "counter loaded");
        Ok(service)
    }

    /// Add one to the counter and return the new value.
    ///
    /// On success exactly one [`CountUpdateEvent`] carrying the returned
    /// value has been published. On error nothing was written and nothing
    /// was published.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::StorageUnavailable`] if the read or write
    /// fails or times out, [`CounterError::MalformedPersistedValue`] under
    /// [`MalformedPolicy::Fail`], or [`CounterError::Overflow`] at
    /// `u64::MAX`.
    pub async fn increment(&self) -> Result<u64, CounterError> {
        let store = self.store.lock().await;

        let current = self.load(&store).await?;
        let next = current
            .checked_add(1)
            .ok_or(CounterError::Overflow { value: current })?;
        bounded(self.timeout, "write", store.write(next)).await?;

        let queued = self.publisher.publish(CountUpdateEvent::new(next));
        drop(store);

        debug!(count = next, subscribers = queued, "counter incremented");
        Ok(next)
    }

    /// Read the persisted count without changing it.
    ///
    /// # Errors
    ///
    /// Same read failures as [`increment`](Self::increment).
    pub async fn current(&self) -> Result<u64, CounterError> {
        let store = self.store.lock().await;
        self.load(&store).await
    }

    /// The publisher events are handed to.
    pub const fn publisher(&self) -> &BroadcastPublisher {
        &self.publisher
    }

    async fn load(&self, store: &S) -> Result<u64, CounterError> {
        match bounded(self.timeout, "read", store.read()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(0),
            Err(CounterError::MalformedPersistedValue { raw })
                if self.policy == MalformedPolicy::Reset =>
            {
                warn!(
                    location = %store.location(),
                    raw,
                    "persisted counter is malformed, resetting to 0"
                );
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

/// Run a store call under `timeout`, mapping failures onto [`CounterError`].
async fn bounded<T, F>(timeout: Duration, op: &'static str, call: F) -> Result<T, CounterError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(StoreError::Malformed { raw, .. })) => {
            Err(CounterError::MalformedPersistedValue { raw })
        }
        Ok(Err(e)) => Err(CounterError::StorageUnavailable {
            reason: format!("{op} failed: {e}"),
        }),
        Err(elapsed) => Err(CounterError::StorageUnavailable {
            reason: format!("{op} timed out after {timeout:?}: {elapsed}"),
        }),
    }
}
