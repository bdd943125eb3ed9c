//! Shared wire types for the viewcount service.
//!
//! Everything that crosses a process boundary (HTTP response bodies,
//! `WebSocket` frames, NATS payloads) is defined here so the server, the
//! core and external display clients agree on one shape. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Subscriber identifiers
//! - [`events`] -- Count update event and channel envelope

pub mod events;
pub mod ids;

pub use events::{ChannelMessage, CountUpdateEvent, DEFAULT_CHANNEL, DEFAULT_EVENT};
pub use ids::SubscriberId;
