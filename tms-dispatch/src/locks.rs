//! Per-key mutual exclusion for routes and orders.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};

/// Entries are pruned once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// A lazily populated table of mutexes, one per key.
///
/// Callers that need several keys must take them in one
/// [`KeyedLocks::lock`] call, which acquires them in ascending order so
/// two callers can never wait on each other.
#[derive(Debug)]
pub(crate) struct KeyedLocks<K> {
    slots: RwLock<HashMap<K, Arc<Mutex<()>>>>,
}

/// Guards for every key of one [`KeyedLocks::lock`] call.
///
/// Dropping the guard releases every key.
#[must_use = "the keys are released as soon as the guard is dropped"]
pub(crate) struct KeyGuard {
    _held: Vec<ArcMutexGuard<RawMutex, ()>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Ord + Hash> KeyedLocks<K> {
    /// Block until every key in `keys` is held.
    pub(crate) fn lock(&self, keys: impl IntoIterator<Item = K>) -> KeyGuard {
        let mut ordered: Vec<K> = keys.into_iter().collect();
        ordered.sort_unstable();
        ordered.dedup();
        let slots: Vec<Arc<Mutex<()>>> = ordered.into_iter().map(|key| self.slot(key)).collect();
        KeyGuard {
            _held: slots.iter().map(|slot| slot.lock_arc()).collect(),
        }
    }

    fn slot(&self, key: K) -> Arc<Mutex<()>> {
        if let Some(slot) = self.slots.read().get(&key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        if slots.len() >= PRUNE_THRESHOLD {
            // A slot only referenced by the table is neither held nor awaited.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        Arc::clone(slots.entry(key).or_default())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.read().len()
    }
}
