//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/update_counter` | A viewer arrived: increment and return the new count |
//! | `GET` | `/count` | Current count, unchanged |
//!
//! `GET /update_counter` is deliberately not routed. Axum answers it with
//! `405 Method Not Allowed`, so crawlers and caches cannot bump the count.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::Json;
use viewcount_store::CounterStore;
use viewcount_types::CountUpdateEvent;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /update_counter
// ---------------------------------------------------------------------------

/// Count one new viewer.
///
/// The response body is the same [`CountUpdateEvent`] that was published
/// to subscribers. No request body is required.
pub async fn update_counter<S: CounterStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CountUpdateEvent>, ApiError> {
    let count = state.service.increment().await?;
    Ok(Json(CountUpdateEvent::new(count)))
}

// ---------------------------------------------------------------------------
// GET /count
// ---------------------------------------------------------------------------

/// Report the persisted count without incrementing it.
pub async fn get_count<S: CounterStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<CountUpdateEvent>, ApiError> {
    let count = state.service.current().await?;
    Ok(Json(CountUpdateEvent::new(count)))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// JSON 404 for any unrouted path.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {method} {}", uri.path()))
}
