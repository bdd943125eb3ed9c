//! Error types for the service binary.
//!
//! [`ServiceError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: viewcount_core::config::ConfigError,
    },

    /// The counter store could not be opened.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: viewcount_store::StoreError,
    },

    /// The initial counter load failed.
    #[error("counter error: {source}")]
    Counter {
        /// The underlying counter error.
        #[from]
        source: viewcount_core::CounterError,
    },

    /// The HTTP server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: viewcount_server::ServerError,
    },
}
