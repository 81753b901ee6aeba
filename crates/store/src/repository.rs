//! Typed CRUD repository over an [`EntityStore`].

use std::sync::Arc;

use memrepo_core::{Entity, EntityDescriptor, Managed, StoreError, StoreResult, Value};

use crate::entity_store::{Entities, EntityStore};
use crate::query::{self, PropertyMatches};
use crate::router::EntityTableStore;

/// Repository for entity type `T`.
///
/// An entity is *new* while its identifier is unset. Saving a new entity
/// stores it (assigning an identifier); saving any other entity merges it.
pub struct InMemoryRepository<T: Entity, S = Arc<EntityTableStore>> {
    store: S,
    descriptor: EntityDescriptor<T, T::Id>,
}

impl<T, S> InMemoryRepository<T, S>
where
    T: Entity,
    S: EntityStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            descriptor: T::descriptor(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_new(&self, entity: &Managed<T>) -> bool {
        entity.with(|e| self.descriptor.identifier_of(e)).is_none()
    }

    /// Store a new entity or merge an existing one; returns the resident handle.
    pub fn save(&self, entity: &Managed<T>) -> StoreResult<Managed<T>> {
        if self.is_new(entity) {
            self.store.store(entity)?;
            Ok(entity.clone())
        } else {
            self.store.merge(entity)
        }
    }

    /// Save each entity in order, stopping at the first failure.
    pub fn save_all<'a, I>(&self, entities: I) -> StoreResult<Vec<Managed<T>>>
    where
        I: IntoIterator<Item = &'a Managed<T>>,
    {
        entities.into_iter().map(|entity| self.save(entity)).collect()
    }

    pub fn find_by_id(&self, id: &T::Id) -> StoreResult<Option<Managed<T>>> {
        self.store.find::<T>(id)
    }

    pub fn exists_by_id(&self, id: &T::Id) -> StoreResult<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }

    pub fn find_all(&self) -> StoreResult<Entities<T>> {
        self.store.find_all::<T>()
    }

    /// Entities for every id, in the given order; `NotFound` for the first
    /// id that is not resident.
    pub fn find_all_by_id<'a, I>(&self, ids: I) -> StoreResult<Vec<Managed<T>>>
    where
        I: IntoIterator<Item = &'a T::Id>,
    {
        ids.into_iter().map(|id| self.find_or_not_found(id)).collect()
    }

    pub fn count(&self) -> StoreResult<usize> {
        Ok(self.find_all()?.len())
    }

    pub fn delete_by_id(&self, id: &T::Id) -> StoreResult<()> {
        let entity = self.find_or_not_found(id)?;
        self.delete(&entity)
    }

    /// Delete `entity` if a resident entity carries its identifier.
    ///
    /// New entities and identifiers that are not resident are ignored. A
    /// detached copy first replaces the resident entity, then is removed.
    pub fn delete(&self, entity: &Managed<T>) -> StoreResult<()> {
        let Some(id) = entity.with(|e| self.descriptor.identifier_of(e)) else {
            return Ok(());
        };
        if self.store.find::<T>(&id)?.is_none() {
            return Ok(());
        }

        if self.store.contains(entity)? {
            self.store.remove(entity)
        } else {
            let resident = self.store.merge(entity)?;
            self.store.remove(&resident)
        }
    }

    pub fn delete_many<'a, I>(&self, entities: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = &'a Managed<T>>,
    {
        entities.into_iter().try_for_each(|entity| self.delete(entity))
    }

    /// Remove every resident entity of `T`.
    pub fn delete_all(&self) -> StoreResult<()> {
        for entity in self.find_all()? {
            self.store.remove(&entity)?;
        }
        Ok(())
    }

    pub fn find_all_by(&self, property: &str, value: impl Into<Value>) -> StoreResult<PropertyMatches<T>> {
        query::find_all_by(&self.descriptor, self.find_all()?, property, value.into())
    }

    pub fn find_unique_by(
        &self,
        property: &str,
        value: impl Into<Value>,
    ) -> StoreResult<Option<Managed<T>>> {
        query::find_unique_by(&self.descriptor, self.find_all()?, property, value.into())
    }

    fn find_or_not_found(&self, id: &T::Id) -> StoreResult<Managed<T>> {
        self.find_by_id(id)?
            .ok_or_else(|| StoreError::not_found(format!("no entity w/ id [{id:?}] exists")))
    }
}

impl<T, S> core::fmt::Debug for InMemoryRepository<T, S>
where
    T: Entity,
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("entity", &self.descriptor.entity_name())
            .field("store", &self.store)
            .finish()
    }
}
