//! Shared handle to an entity held by a store.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, interior-mutable handle to an entity.
///
/// Cloning the handle shares the entity. The store keeps clones of the handles
/// it is given, so key assignment done by the store is visible through every
/// clone. Two handles are the *same entity* only when they point at the same
/// allocation (see [`Managed::ptr_eq`]); a detached copy built from
/// [`Managed::detached`] carries equal data but is a different object.
///
/// Do not hold a guard from [`read`](Managed::read)/[`write`](Managed::write)
/// while passing the same handle to a store operation.
pub struct Managed<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Managed<T> {
    pub fn new(entity: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(entity)),
        }
    }

    /// Shared access to the entity.
    ///
    /// A poisoned entity lock is recovered: entity data has no invariants the
    /// store relies on beyond what the partition lock already guards.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to the entity.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same entity object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` against the entity under a shared guard.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read())
    }

    /// Copy of the entity data.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.read().clone()
    }

    /// New handle to a copy of the entity: equal data, different object.
    pub fn detached(&self) -> Self
    where
        T: Clone,
    {
        Self::new(self.snapshot())
    }
}

impl<T> Clone for Managed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Managed<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Managed").field(&*self.read()).finish()
    }
}

impl<T> From<T> for Managed<T> {
    fn from(entity: T) -> Self {
        Self::new(entity)
    }
}
