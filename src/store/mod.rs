//! Lock-coordinated key/value store.
//!
//! The store keeps three tables (current values, per-key lock slots, and
//! live lock ids mapped back to their keys) behind one reader/writer
//! section, with a one-permit gate per key as the serialization point for
//! writers.
//!
//! - [`LockStore`] - the operation surface: `put_and_lock`, `get`,
//!   `get_and_lock`, `update`, `release`, `direct_get`
//! - [`StoreError`] - the two failures operations can produce
//! - [`Key`], [`Value`], [`LockId`] - the typed identifiers

mod error;
mod lock;
mod sequence;
mod store;
mod types;

pub use error::StoreError;
pub use store::LockStore;
pub use types::{Key, LockId, Value};
