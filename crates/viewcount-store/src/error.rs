//! Error types for the counter store.
//!
//! All errors are propagated via [`StoreError`] which wraps the underlying
//! I/O and [`fred`] errors with the location that failed.

use std::path::PathBuf;

/// Errors that can occur reading or writing the counter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// The stored content is not a non-negative integer.
    #[error("malformed persisted value {raw:?}: {source}")]
    Malformed {
        /// The raw stored text.
        raw: String,
        /// Why it failed to parse.
        source: std::num::ParseIntError,
    },

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
