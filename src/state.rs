//! Application state shared across all HTTP handlers.

use std::sync::Arc;

use crate::store::LockStore;

/// Shared application state passed to all axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<LockStore>,
}

impl AppState {
    /// Bundle the store into handler state.
    pub fn new(store: Arc<LockStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &LockStore {
        &self.store
    }
}
