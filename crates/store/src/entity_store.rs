//! The storage contract shared by entity tables and the table router.

use std::sync::Arc;

use memrepo_core::{Entity, Managed, StoreResult};

/// Snapshot sequence of entities returned by [`EntityStore::find_all`].
///
/// Each call produces a fresh sequence reflecting the contents at call time;
/// later writes are not observed by an already returned sequence.
pub type Entities<T> = std::vec::IntoIter<Managed<T>>;

/// Keyed CRUD over managed entities.
///
/// Implementations validate that `T` is a type they manage before touching
/// any state: a table rejects foreign types with `TypeMismatch`, the router
/// rejects types without a table with `UnmanagedType`.
///
/// ## Write Semantics
///
/// - `store`: creates. Assigns an identifier when the entity has none; fails
///   with `AlreadyExists` when its identifier is already mapped. A
///   pre-assigned identifier that is not yet mapped is kept as is; the
///   generator is never consulted for it, so stored keys are never silently
///   replaced.
/// - `merge`: upserts under the entity's own identifier (which must be set).
/// - `remove`: deletes by identifier; fails with `NotFound` when absent.
///
/// Each write is all-or-nothing against a single partition.
pub trait EntityStore: Send + Sync {
    fn store<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()>;

    fn merge<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<Managed<T>>;

    fn find<T: Entity>(&self, id: &T::Id) -> StoreResult<Option<Managed<T>>>;

    fn find_all<T: Entity>(&self) -> StoreResult<Entities<T>>;

    fn remove<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()>;

    /// Whether this exact entity object (not merely its identifier) is resident.
    fn contains<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<bool>;
}

impl<S> EntityStore for Arc<S>
where
    S: EntityStore,
{
    fn store<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        (**self).store(entity)
    }

    fn merge<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<Managed<T>> {
        (**self).merge(entity)
    }

    fn find<T: Entity>(&self, id: &T::Id) -> StoreResult<Option<Managed<T>>> {
        (**self).find::<T>(id)
    }

    fn find_all<T: Entity>(&self) -> StoreResult<Entities<T>> {
        (**self).find_all::<T>()
    }

    fn remove<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        (**self).remove(entity)
    }

    fn contains<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<bool> {
        (**self).contains(entity)
    }
}
