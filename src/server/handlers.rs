//! HTTP handlers for the store surface.
//!
//! Handlers translate store outcomes to status codes: `KeyNotFound` maps to
//! `404`, `LockIdNotFound` to `401`, malformed input to `400`. The blocking
//! routes wait without bound; a client that disconnects mid-wait does not
//! cancel the acquisition.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::store::{Key, LockId, StoreError, Value};

/// Body of responses that grant a lock.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockResponse {
    /// The granted lock id, rendered as a decimal string.
    pub lock_id: String,
}

/// Body of reservation responses: the granted lock plus the current value.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockValueResponse {
    /// The granted lock id, rendered as a decimal string.
    pub lock_id: String,
    /// The value read under the lock.
    pub value: String,
}

/// Query string for value updates.
#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    /// Whether to release the lock after the update. Must be exactly
    /// `true` or `false`.
    release: String,
}

/// `PUT /values/{key}` - write the body as the key's value and take its
/// lock, waiting for the current holder if there is one.
///
/// Always `200` with the granted lock id.
pub async fn put_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: String,
) -> impl IntoResponse {
    let lock_id = state
        .store()
        .put_and_lock(Key::from(key), Value::from(body))
        .await;
    Json(LockResponse {
        lock_id: lock_id.to_string(),
    })
}

/// `POST /reservations/{key}` - wait for the key's lock and read the value
/// under it.
///
/// `404` when the key has never been written; a reservation does not create
/// it.
pub async fn reserve_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.store().get_and_lock(Key::from(key)).await {
        Ok((lock_id, value)) => Json(LockValueResponse {
            lock_id: lock_id.to_string(),
            value: value.into_string(),
        })
        .into_response(),
        Err(StoreError::KeyNotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// `POST /values/{key}/{lock_id}?release={true|false}` - update the key's
/// value under a held lock, optionally releasing it.
///
/// `204` on success, `404` for an unknown key, `401` when the lock id does
/// not identify the currently held lock, `400` when `release` is missing or
/// not a boolean.
pub async fn update_value(
    State(state): State<AppState>,
    Path((key, lock_id)): Path<(String, String)>,
    Query(params): Query<UpdateParams>,
    body: String,
) -> impl IntoResponse {
    let Ok(release) = params.release.parse::<bool>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    // Ids are minted starting at 1, so 0 can never name a live lock; a path
    // segment that does not parse back degrades to it and fails the same
    // way any dead id does, after the key existence check.
    let lock_id = lock_id.parse::<LockId>().unwrap_or(LockId(0));

    match state
        .store()
        .update(lock_id, Key::from(key), Value::from(body), release)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(StoreError::KeyNotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
        Err(StoreError::LockIdNotFound { .. }) => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// `GET /health` - liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
