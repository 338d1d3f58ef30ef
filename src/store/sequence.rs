//! Monotone lock-id sequence.

use crate::store::types::LockId;

/// Mints strictly increasing lock ids: `1, 2, 3, …`.
///
/// The sequence is owned by the store and advanced only inside the index's
/// exclusive section, so ids are unique and monotone without any further
/// synchronization, and a dead id can never be minted again.
#[derive(Debug, Default)]
pub(crate) struct LockIdSequence {
    current: u64,
}

impl LockIdSequence {
    /// Mint the next lock id.
    pub(crate) fn next_id(&mut self) -> LockId {
        self.current += 1;
        LockId(self.current)
    }
}
