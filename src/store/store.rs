//! The lock-coordinated store.
//!
//! Three tables define store state: `values` (key → value), `locks`
//! (key → [`KeyLock`]), and `holders` (live lock id → key). The tables are
//! only jointly consistent when mutated together, so a single reader/writer
//! section guards all three plus the id sequence. Waiting for a key's gate
//! always happens outside that section: acquirers clone the gate handle
//! under the shared side, await the permit with no index lock held, then
//! re-enter the exclusive side to mint an id and install themselves as
//! holder.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::ensure;
use tokio::sync::{RwLock, Semaphore};
use tracing::debug;

use crate::store::error::{KeyNotFoundSnafu, LockIdNotFoundSnafu, StoreError};
use crate::store::lock::KeyLock;
use crate::store::sequence::LockIdSequence;
use crate::store::types::{Key, LockId, Value};

/// The shared tables. Mutated only under the exclusive section.
#[derive(Debug, Default)]
struct Index {
    /// Current value of every key ever written.
    values: HashMap<Key, Value>,
    /// Per-key lock slots; one for every key ever written, never removed.
    locks: HashMap<Key, KeyLock>,
    /// Live lock ids, mapped back to the key they guard.
    holders: HashMap<LockId, Key>,
    /// Lock-id mint; advanced only while this index is held exclusively.
    sequence: LockIdSequence,
}

impl Index {
    /// Install `lock_id` as the holder of `key`'s lock and register it in
    /// the holders table.
    ///
    /// Any superseded holder id is dropped from the table in the same
    /// section, so a stale id can never grant access again.
    fn install_holder(&mut self, key: &Key, lock_id: LockId) {
        if let Some(lock) = self.locks.get_mut(key) {
            if let Some(stale) = lock.install_holder(lock_id) {
                self.holders.remove(&stale);
            }
        }
        self.holders.insert(lock_id, key.clone());
    }
}

/// In-memory key/value store with per-key advisory locks.
///
/// Each key has at most one live lock at a time; holders are identified by
/// the [`LockId`] minted at acquisition. Writers that do not hold a key's
/// lock wait for the current holder to release it. There are no timeouts: a
/// holder that never releases leaves its key held forever, and blocked
/// writers wait indefinitely.
///
/// Operations on distinct keys never wait on each other. Operations on the
/// same key observe a total order consistent with gate acquisition order.
#[derive(Debug)]
pub struct LockStore {
    name: String,
    index: RwLock<Index>,
}

impl LockStore {
    /// Create an empty store.
    ///
    /// `name` is purely observational; it appears in log events.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            index: RwLock::new(Index::default()),
        })
    }

    /// Store instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `value` at `key`, acquiring the key's lock atomically with the
    /// write. Never fails.
    ///
    /// If the key does not exist yet it is created with its lock already
    /// held, without blocking. If it exists, this waits until the current
    /// holder releases, then installs the caller as the new holder.
    pub async fn put_and_lock(&self, key: Key, value: Value) -> LockId {
        loop {
            let gate = {
                let index = self.index.read().await;
                index.locks.get(&key).map(KeyLock::gate)
            };

            match gate {
                Some(gate) => {
                    // Wait for the current holder with no index lock held.
                    acquire_gate(gate).await;

                    let mut index = self.index.write().await;
                    let lock_id = index.sequence.next_id();
                    index.install_holder(&key, lock_id);
                    debug!(store = %self.name, key = %key, lock_id = %lock_id, "lock acquired");
                    index.values.insert(key, value);
                    return lock_id;
                }
                None => {
                    let mut index = self.index.write().await;
                    if index.locks.contains_key(&key) {
                        // Another writer created the key between our read
                        // and write sections; take the blocking path.
                        continue;
                    }
                    let lock_id = index.sequence.next_id();
                    index.locks.insert(key.clone(), KeyLock::held_by(lock_id));
                    index.holders.insert(lock_id, key.clone());
                    debug!(store = %self.name, key = %key, lock_id = %lock_id, "key created, lock held");
                    index.values.insert(key, value);
                    return lock_id;
                }
            }
        }
    }

    /// Read the value at `key` under the lock named by `lock_id`.
    ///
    /// Non-blocking. Fails with [`StoreError::LockIdNotFound`] when the id
    /// names no live lock, and with [`StoreError::KeyNotFound`] when it
    /// names a lock on a different key.
    pub async fn get(&self, lock_id: LockId, key: Key) -> Result<Value, StoreError> {
        let index = self.index.read().await;
        let locked_key = match index.holders.get(&lock_id) {
            Some(locked_key) => locked_key,
            None => return LockIdNotFoundSnafu { lock_id }.fail(),
        };
        ensure!(*locked_key == key, KeyNotFoundSnafu { key });

        match index.values.get(&key) {
            Some(value) => Ok(value.clone()),
            None => KeyNotFoundSnafu { key }.fail(),
        }
    }

    /// Acquire the lock of an existing key and read its value under it.
    ///
    /// Waits until the lock is free. Fails immediately with
    /// [`StoreError::KeyNotFound`] when the key has never been written; a
    /// reservation never creates the key.
    pub async fn get_and_lock(&self, key: Key) -> Result<(LockId, Value), StoreError> {
        let gate = {
            let index = self.index.read().await;
            match index.locks.get(&key) {
                Some(lock) => lock.gate(),
                None => return KeyNotFoundSnafu { key }.fail(),
            }
        };

        acquire_gate(gate).await;

        let mut index = self.index.write().await;
        let lock_id = index.sequence.next_id();
        index.install_holder(&key, lock_id);
        debug!(store = %self.name, key = %key, lock_id = %lock_id, "lock acquired for read");
        let value = index.values.get(&key).cloned().unwrap_or_default();
        Ok((lock_id, value))
    }

    /// Update the value at `key` under the lock named by `lock_id`,
    /// releasing the lock when `release_lock` is set.
    ///
    /// Preconditions are checked in order: a key that was never written
    /// fails with [`StoreError::KeyNotFound`] before the lock id is looked
    /// at; an id that is dead or names a different key fails with
    /// [`StoreError::LockIdNotFound`]. On release the id becomes dead.
    pub async fn update(
        &self,
        lock_id: LockId,
        key: Key,
        value: Value,
        release_lock: bool,
    ) -> Result<(), StoreError> {
        let mut index = self.index.write().await;
        ensure!(index.locks.contains_key(&key), KeyNotFoundSnafu { key });
        match index.holders.get(&lock_id) {
            Some(locked_key) if *locked_key == key => {}
            _ => return LockIdNotFoundSnafu { lock_id }.fail(),
        }

        if release_lock {
            index.holders.remove(&lock_id);
            if let Some(lock) = index.locks.get_mut(&key) {
                lock.release();
            }
            debug!(store = %self.name, key = %key, lock_id = %lock_id, "value updated, lock released");
        } else {
            debug!(store = %self.name, key = %key, lock_id = %lock_id, "value updated");
        }
        index.values.insert(key, value);
        Ok(())
    }

    /// Release the lock named by `lock_id`, making the id dead.
    ///
    /// Fails with [`StoreError::LockIdNotFound`] when the id names no live
    /// lock, including when it was already released once.
    pub async fn release(&self, lock_id: LockId) -> Result<(), StoreError> {
        let mut index = self.index.write().await;
        let Some(key) = index.holders.remove(&lock_id) else {
            return LockIdNotFoundSnafu { lock_id }.fail();
        };
        if let Some(lock) = index.locks.get_mut(&key) {
            lock.release();
        }
        debug!(store = %self.name, key = %key, lock_id = %lock_id, "lock released");
        Ok(())
    }

    /// Read the current value of `key`, bypassing lock discipline.
    ///
    /// Test observability aid; not exposed over HTTP.
    pub async fn direct_get(&self, key: &Key) -> Option<Value> {
        self.index.read().await.values.get(key).cloned()
    }
}

/// Wait for a key's gate, consuming the permit.
///
/// The permit is forgotten rather than held in a guard: the lock stays
/// taken until [`KeyLock::release`] puts the permit back.
async fn acquire_gate(gate: Arc<Semaphore>) {
    // Gates are never closed, so acquisition can only end with a permit.
    let permit = gate
        .acquire_owned()
        .await
        .expect("key lock gates are never closed");
    permit.forget();
}
