//! Per-key lock slot.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::store::types::LockId;

/// Single-owner mutual-exclusion slot bound to one key.
///
/// The gate is a one-permit semaphore: zero permits available means the lock
/// is held. Acquirers await a permit on the gate handle outside the index
/// sections and forget it once granted; [`KeyLock::release`] puts the permit
/// back, waking the longest-waiting acquirer (the semaphore queues waiters
/// in FIFO order).
///
/// A slot is created for a key on its first write and lives for the store's
/// lifetime.
#[derive(Debug)]
pub(crate) struct KeyLock {
    gate: Arc<Semaphore>,
    holder: Option<LockId>,
}

impl KeyLock {
    /// Create a lock already held by `holder`.
    ///
    /// New keys are inserted in the held state under the index's exclusive
    /// section, so no caller can ever observe a freshly created key as free.
    pub(crate) fn held_by(holder: LockId) -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            holder: Some(holder),
        }
    }

    /// Handle to the gate, for waiting outside the index sections.
    pub(crate) fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.gate)
    }

    /// Record `holder` as the owner, returning the superseded holder if one
    /// was still recorded.
    pub(crate) fn install_holder(&mut self, holder: LockId) -> Option<LockId> {
        self.holder.replace(holder)
    }

    /// Clear the holder and return the permit, waking one waiter.
    pub(crate) fn release(&mut self) {
        self.holder = None;
        self.gate.add_permits(1);
    }
}
