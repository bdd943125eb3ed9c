//! Core of the viewcount service.
//!
//! Ties the persistent counter to its observers:
//!
//! ```text
//! POST /update_counter
//!     |
//!     +-- IncrementService::increment   (lock, read, +1, write, unlock)
//!         |
//!         +-- BroadcastPublisher::publish
//!             |-- Subscription (one per WebSocket observer)
//!             +-- NatsRelay    (optional, counter.new_user)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- Typed `viewcount-config.yaml` structures
//! - [`service`] -- Serialized read-modify-write over the store
//! - [`publisher`] -- In-process fan-out to subscriptions
//! - [`relay`] -- Forwarding of count updates to NATS
//! - [`error`] -- Error types

pub mod config;
pub mod error;
pub mod publisher;
pub mod relay;
pub mod service;

// Re-export primary types for convenience.
pub use config::{MalformedPolicy, ServiceConfig};
pub use error::{CounterError, RelayError};
pub use publisher::{BroadcastPublisher, Subscription};
pub use relay::NatsRelay;
pub use service::IncrementService;
