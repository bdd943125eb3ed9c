//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin display clients.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use viewcount_store::CounterStore;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /update_counter` -- count a viewer, return `{"count": N}`
/// - `GET /count` -- current count
/// - `GET /ws/counter` -- `WebSocket` count update stream
///
/// Anything else gets a JSON 404.
pub fn build_router<S: CounterStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/update_counter", post(handlers::update_counter::<S>))
        .route("/count", get(handlers::get_count::<S>))
        .route("/ws/counter", get(ws::ws_counter::<S>))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
