//! Shared application state for the HTTP server.
//!
//! [`AppState`] owns the [`IncrementService`], which in turn owns the store
//! and the broadcast publisher. Handlers reach both through it.

use viewcount_core::{IncrementService, Subscription};
use viewcount_store::CounterStore;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
pub struct AppState<S> {
    /// The single writer of the counter.
    pub service: IncrementService<S>,
}

impl<S: CounterStore> AppState<S> {
    /// Create application state around an opened service.
    pub const fn new(service: IncrementService<S>) -> Self {
        Self { service }
    }

    /// Subscribe to count updates.
    pub fn subscribe(&self) -> Subscription {
        self.service.publisher().subscribe()
    }
}
