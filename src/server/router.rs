//! Axum router configuration.

use axum::routing::{get, post, put};
use axum::Router;

use crate::server::handlers::{health, put_value, reserve_value, update_value};
use crate::state::AppState;

/// Build the router serving the store's HTTP surface.
///
/// Routes:
/// - `PUT  /values/{key}` - write a value and take its lock
/// - `POST /values/{key}/{lock_id}?release={true|false}` - update under a
///   held lock
/// - `POST /reservations/{key}` - wait for a key's lock and read under it
/// - `GET  /health` - liveness probe
pub fn build_router(state: &AppState) -> Router {
    Router::new()
        .route("/values/{key}", put(put_value))
        .route("/values/{key}/{lock_id}", post(update_value))
        .route("/reservations/{key}", post(reserve_value))
        .route("/health", get(health))
        .with_state(state.clone())
}
