//! Error types for store operations.

use snafu::Snafu;

use crate::store::types::{Key, LockId};

/// Errors from store operations.
///
/// These are the only two failures the store itself produces; everything
/// else (bad routes, malformed query parameters) is rejected at the HTTP
/// boundary before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    /// The referenced key has never been written.
    #[snafu(display("key not found: {key}"))]
    KeyNotFound {
        /// The key the operation named.
        key: Key,
    },

    /// The presented lock id does not identify a live lock on the named key.
    #[snafu(display("lock id not found: {lock_id}"))]
    LockIdNotFound {
        /// The lock id the caller presented.
        lock_id: LockId,
    },
}
