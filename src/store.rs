use alloc::collections::BTreeMap;
use core::{mem, time::Duration};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::debug;

use crate::errors::StoreErrorKind;

/// Outcome of [`KeyedStore::add_or_update`] and [`KeyedStore::add_or_update_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOrUpdateStatus {
    Added,
    Updated,
    Unchanged,
}

/// Scoped resource release for values owned by a [`KeyedStore`]
pub trait Release {
    fn release(&mut self);
}

/// Map guarded by a reader-writer lock.
///
/// Any number of readers proceed in parallel, a writer excludes everyone else.
/// Check-and-set operations hold an upgradable read and escalate to exclusive access only when they actually write,
/// so readers aren't held off by a check that ends up changing nothing.
pub struct KeyedStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Ord,
{
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Returns a copy of the value stored under `key`
    ///
    /// # Errors
    /// - Returns [`StoreErrorKind::KeyNotFound`] if there's no such key
    pub fn read(&self, key: &K) -> Result<V, StoreErrorKind>
    where
        V: Clone,
    {
        self.read_with(key, V::clone)
    }

    /// Runs `f` on the value stored under `key` while holding the read lock.
    /// `f` must not call back into this store for writing.
    ///
    /// # Errors
    /// - Returns [`StoreErrorKind::KeyNotFound`] if there's no such key
    pub fn read_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Result<R, StoreErrorKind> {
        self.inner.read().get(key).map(f).ok_or(StoreErrorKind::KeyNotFound)
    }

    /// # Errors
    /// - Returns [`StoreErrorKind::KeyExists`] if the key is already present
    pub fn add(&self, key: K, value: V) -> Result<(), StoreErrorKind> {
        Self::insert_new(&mut self.inner.write(), key, value)
    }

    /// Same as [`Self::add`], but gives up if exclusive access isn't acquired within `timeout`
    ///
    /// # Errors
    /// - Returns [`StoreErrorKind::Timeout`] if the lock wasn't acquired in time
    /// - Returns [`StoreErrorKind::KeyExists`] if the key is already present
    pub fn add_with_timeout(&self, key: K, value: V, timeout: Duration) -> Result<(), StoreErrorKind> {
        let Some(mut guard) = self.inner.try_write_for(timeout) else {
            debug!(?timeout, "Store lock not acquired in time");
            return Err(StoreErrorKind::Timeout);
        };
        Self::insert_new(&mut guard, key, value)
    }

    /// Inserts or replaces the value under `key` as one atomic step.
    /// An equal value already in place is left untouched.
    pub fn add_or_update(&self, key: K, value: V) -> AddOrUpdateStatus
    where
        V: PartialEq,
    {
        let guard = self.inner.upgradable_read();
        match guard.get(&key) {
            Some(current) if *current == value => AddOrUpdateStatus::Unchanged,
            Some(_) => {
                RwLockUpgradableReadGuard::upgrade(guard).insert(key, value);
                AddOrUpdateStatus::Updated
            }
            None => {
                RwLockUpgradableReadGuard::upgrade(guard).insert(key, value);
                AddOrUpdateStatus::Added
            }
        }
    }

    /// Inserts `create(item)` if `key` is absent, otherwise hands `item` to `update` along with the stored value,
    /// as one atomic step. `update` returns whether it changed anything.
    pub fn add_or_update_with<T, C, U>(&self, key: K, item: T, create: C, update: U) -> AddOrUpdateStatus
    where
        C: FnOnce(T) -> V,
        U: FnOnce(&mut V, T) -> bool,
    {
        let mut guard = self.inner.write();
        match guard.get_mut(&key) {
            Some(current) => {
                if update(current, item) {
                    AddOrUpdateStatus::Updated
                } else {
                    AddOrUpdateStatus::Unchanged
                }
            }
            None => {
                guard.insert(key, create(item));
                AddOrUpdateStatus::Added
            }
        }
    }

    /// Takes the value under `key` out of the store, `None` if there's no such key.
    /// The removed value isn't released.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    fn insert_new(map: &mut BTreeMap<K, V>, key: K, value: V) -> Result<(), StoreErrorKind> {
        use alloc::collections::btree_map::Entry::{Occupied, Vacant};

        match map.entry(key) {
            Occupied(_) => Err(StoreErrorKind::KeyExists),
            Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Ord,
    V: Release,
{
    /// Empties the store and releases every value that was in it.
    /// Values are taken out under exclusive access and released after the lock is dropped.
    pub fn release(&self) {
        let values = mem::take(&mut *self.inner.write());
        let count = values.len();
        for (_, mut value) in values {
            value.release();
        }
        debug!(count, "Store released");
    }
}
