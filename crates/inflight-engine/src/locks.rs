//! Per-entity critical sections
//!
//! Transactions that read a record, decide, and write it back take the
//! lock of every entity they touch. Locks are always taken slot first, then
//! passenger, so two transactions can never wait on each other in a cycle.

use std::sync::Arc;

use dashmap::DashMap;
use inflight_core::{PassengerId, SlotId};
use parking_lot::Mutex;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LockKey {
    Slot(SlotId),
    Passenger(PassengerId),
}

/// Map from entity to its mutex, created on first use
#[derive(Default)]
pub struct LockTable {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock of `key`
    ///
    /// The locks are not reentrant: `f` must not lock `key` again.
    pub fn with<R>(&self, key: LockKey, f: impl FnOnce() -> R) -> R {
        // clone the mutex out so the shard lock is released before blocking
        let mutex = self.locks.entry(key).or_default().clone();
        let _guard = mutex.lock();
        f()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn critical_sections_do_not_interleave() {
        let table = LockTable::new();
        let inside = AtomicU32::new(0);
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        table.with(LockKey::Slot(1), || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                });
            }
        });
    }

    #[test]
    fn distinct_keys_nest() {
        let table = LockTable::new();
        let value = table.with(LockKey::Slot(3), || {
            table.with(LockKey::Passenger(3), || 42)
        });
        assert_eq!(value, 42);
    }
}
