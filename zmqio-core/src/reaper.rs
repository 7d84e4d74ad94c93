//! Reapers: registries that dispose of whatever is still registered when
//! they go away.
//!
//! Objects register right after successful construction and deregister
//! when closed explicitly. At teardown the remaining entries are disposed
//! in reverse registration order, so the most recently created object is
//! closed first. Entries are moved out of the registry before disposal;
//! a disposal that deregisters (or registers) re-entrantly is harmless.

use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;

/// Something that can be closed, idempotently.
pub trait Closable {
    fn close(&self);
}

/// Disposal policy for reaped entries.
pub trait Deleter<T> {
    fn delete(&mut self, item: T);
}

/// Closes weakly registered objects that are still alive.
#[derive(Debug, Default, Clone, Copy)]
pub struct Close;

impl<C: Closable + ?Sized> Deleter<Weak<C>> for Close {
    fn delete(&mut self, item: Weak<C>) {
        if let Some(object) = item.upgrade() {
            object.close();
        }
    }
}

/// Registration token returned by `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReapKey(u64);

#[derive(Debug)]
struct Registry<T> {
    next: u64,
    items: BTreeMap<u64, T>,
}

impl<T> Registry<T> {
    const fn new() -> Self {
        Self {
            next: 0,
            items: BTreeMap::new(),
        }
    }

    fn add(&mut self, item: T) -> ReapKey {
        let key = self.next;
        self.next += 1;
        self.items.insert(key, item);
        ReapKey(key)
    }

    fn remove(&mut self, key: ReapKey) -> Option<T> {
        self.items.remove(&key.0)
    }

    /// Takes every entry, newest first.
    fn drain_newest_first(&mut self) -> Vec<T> {
        let mut items: Vec<T> = std::mem::take(&mut self.items).into_values().collect();
        items.reverse();
        items
    }
}

/// Single-threaded reaper.
pub struct Reaper<T, D: Deleter<T> = Close> {
    registry: RefCell<Registry<T>>,
    deleter: RefCell<D>,
}

impl<T, D: Deleter<T>> Reaper<T, D> {
    pub fn new(deleter: D) -> Self {
        Self {
            registry: RefCell::new(Registry::new()),
            deleter: RefCell::new(deleter),
        }
    }

    pub fn add(&self, item: T) -> ReapKey {
        self.registry.borrow_mut().add(item)
    }

    /// Deregisters without disposing. Unknown keys are ignored.
    pub fn remove(&self, key: ReapKey) -> Option<T> {
        self.registry.borrow_mut().remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disposes every registered entry, newest first.
    pub fn reap(&self) {
        loop {
            let items = self.registry.borrow_mut().drain_newest_first();
            if items.is_empty() {
                break;
            }
            for item in items {
                self.deleter.borrow_mut().delete(item);
            }
        }
    }
}

impl<T, D: Deleter<T> + Default> Default for Reaper<T, D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<T, D: Deleter<T>> Drop for Reaper<T, D> {
    fn drop(&mut self) {
        self.reap();
    }
}

/// Reaper shared between threads.
pub struct ThreadSafeReaper<T, D: Deleter<T>> {
    registry: Mutex<Registry<T>>,
    deleter: Mutex<D>,
}

impl<T, D: Deleter<T>> ThreadSafeReaper<T, D> {
    pub fn new(deleter: D) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            deleter: Mutex::new(deleter),
        }
    }

    pub fn add(&self, item: T) -> ReapKey {
        self.registry.lock().add(item)
    }

    pub fn remove(&self, key: ReapKey) -> Option<T> {
        self.registry.lock().remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disposes every registered entry, newest first. The registry lock is
    /// not held while disposing.
    pub fn reap(&self) {
        loop {
            let items = self.registry.lock().drain_newest_first();
            if items.is_empty() {
                break;
            }
            let mut deleter = self.deleter.lock();
            for item in items {
                deleter.delete(item);
            }
        }
    }
}

impl<T, D: Deleter<T>> Drop for ThreadSafeReaper<T, D> {
    fn drop(&mut self) {
        self.reap();
    }
}
