//! HTTP surface of the viewcount service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`POST /update_counter`** -- the "viewer arrived" trigger. Runs one
//!   atomic increment and answers `{"count": N}` with the value that
//!   increment produced.
//! - **`GET /count`** -- the current count, read-only
//! - **`WebSocket` endpoint** (`/ws/counter`) streaming every count update
//!   to connected display clients
//!
//! # Architecture
//!
//! Handlers are generic over the [`CounterStore`](viewcount_store::CounterStore)
//! so tests can run the full router against a temporary file while the
//! binary plugs in whichever backend is configured. All counter access goes
//! through the single [`IncrementService`](viewcount_core::IncrementService)
//! held in [`AppState`].

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
