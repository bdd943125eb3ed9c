//! Persistent counter store for the viewcount service.
//!
//! The counter is a single non-negative integer stored as decimal text at
//! one named location. This crate defines the [`CounterStore`] contract and
//! the two backends that satisfy it:
//!
//! ```text
//! IncrementService
//!     |
//!     +-- CounterStore::read / write
//!         |-- FileStore        (count.txt, temp file + atomic rename)
//!         +-- DragonflyStore   (Redis-compatible key)
//! ```
//!
//! Stores do not serialize callers themselves. Mutual exclusion around a
//! read-modify-write belongs to the owner of the store.
//!
//! # Modules
//!
//! - [`file`] -- File-backed store
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) store
//! - [`backend`] -- Runtime-selected backend enum
//! - [`error`] -- Shared error types

pub mod backend;
pub mod dragonfly;
pub mod error;
pub mod file;

pub use backend::CounterBackend;
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use file::FileStore;

/// Durable home of the single counter value.
pub trait CounterStore: Send + Sync + 'static {
    /// Return the last durably written value.
    ///
    /// `Ok(None)` means the location does not exist yet.
    fn read(&self) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send;

    /// Durably persist `value`, replacing any prior value.
    ///
    /// On error the previously stored value must still be readable.
    fn write(&self, value: u64) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Human-readable location used in log lines.
    fn location(&self) -> String;
}

/// Parse persisted counter text.
///
/// Surrounding whitespace is ignored (a trailing newline from a hand-edited
/// file is common). Anything else that is not a `u64` is
/// [`StoreError::Malformed`].
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if `raw` is not a non-negative integer.
pub fn parse_count(raw: &str) -> Result<u64, StoreError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|source| StoreError::Malformed {
            raw: raw.to_owned(),
            source,
        })
}
