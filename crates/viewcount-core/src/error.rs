//! Error types for the increment path.
//!
//! [`CounterError`] is what callers of the increment service see. Store
//! failures and timeouts collapse into [`CounterError::StorageUnavailable`];
//! a bad persisted value only surfaces when the configured policy says to
//! fail instead of resetting.

/// Errors returned by the increment service.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// The store could not be read or written, or did not answer in time.
    /// Nothing was persisted.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// The persisted value is not a non-negative integer.
    #[error("malformed persisted value: {raw:?}")]
    MalformedPersistedValue {
        /// The raw stored text.
        raw: String,
    },

    /// The counter is already at its maximum representable value.
    #[error("counter overflow at {value}")]
    Overflow {
        /// The value that could not be incremented.
        value: u64,
    },
}

/// Errors from the NATS relay.
///
/// These never reach an HTTP caller; the relay logs them per event.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to connect to or publish on the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// Serialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
