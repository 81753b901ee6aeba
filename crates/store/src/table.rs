//! Single-type entity partition.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use memrepo_core::{Entity, EntityDescriptor, Managed, StoreError, StoreResult, Value};

use crate::entity_store::{Entities, EntityStore};
use crate::generator::{DefaultConstructGenerator, PrimaryKeyGenerator};
use crate::query::{self, PropertyMatches};
use crate::registry::{IdentifierMapping, SharedGenerator};

struct Partition<D: Entity> {
    rows: HashMap<D::Id, Managed<D>>,
    /// Last key issued or merged; seeds the generator.
    previous_id: Option<D::Id>,
}

/// Storage partition for entity type `D`.
///
/// Owns the identifier-to-entity map and the key cursor under one lock:
/// `store`, `merge`, `remove` and `clear` take it exclusively, lookups share
/// it. The generator is shared with other tables and holds no state.
pub struct EntityTable<D: Entity> {
    descriptor: EntityDescriptor<D, D::Id>,
    generator: SharedGenerator<D::Id>,
    partition: RwLock<Partition<D>>,
}

impl<D: Entity> EntityTable<D> {
    /// Create a table issuing keys with `generator`.
    ///
    /// Fails with `Configuration` when the entity descriptor declares no
    /// identifier.
    pub fn new(generator: SharedGenerator<D::Id>) -> StoreResult<Self> {
        let descriptor = D::descriptor();
        if !descriptor.has_identifier() {
            return Err(StoreError::configuration(format!(
                "entity [{}] declares no identifier",
                descriptor.entity_name()
            )));
        }

        Ok(Self {
            descriptor,
            generator,
            partition: RwLock::new(Partition {
                rows: HashMap::new(),
                previous_id: None,
            }),
        })
    }

    pub fn with_generator(generator: impl PrimaryKeyGenerator<D::Id> + 'static) -> StoreResult<Self> {
        Self::new(Arc::new(generator))
    }

    /// Create a table with the generator registered for `D::Id`.
    ///
    /// Falls back to default construction of the identifier type; fails with
    /// `Configuration` when the type cannot be constructed either.
    pub fn from_mapping(mapping: &IdentifierMapping) -> StoreResult<Self> {
        let generator: SharedGenerator<D::Id> = match mapping.generator::<D::Id>() {
            Some(generator) => generator,
            None => match DefaultConstructGenerator::<D::Id>::for_type() {
                Some(generator) => Arc::new(generator),
                None => {
                    return Err(StoreError::configuration(format!(
                        "no primary key generator registered for identifier type [{}] of entity [{}], \
                         and the identifier type cannot be constructed",
                        core::any::type_name::<D::Id>(),
                        core::any::type_name::<D>(),
                    )));
                }
            },
        };
        Self::new(generator)
    }

    /// Name of the bound domain type.
    pub fn domain_type(&self) -> &'static str {
        self.descriptor.entity_name()
    }

    pub fn descriptor(&self) -> &EntityDescriptor<D, D::Id> {
        &self.descriptor
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.rows.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.rows.is_empty())
    }

    /// Last issued (or merged) key.
    pub fn previous_id(&self) -> StoreResult<Option<D::Id>> {
        Ok(self.read()?.previous_id.clone())
    }

    /// Drop every resident entity. The key cursor is kept, so identifiers are
    /// not reissued after a reset.
    pub fn clear(&self) -> StoreResult<()> {
        let mut partition = self.write()?;
        partition.rows.clear();
        tracing::debug!(entity = self.domain_type(), "table cleared");
        Ok(())
    }

    /// Entities whose `property` equals `value`.
    pub fn find_all_by(&self, property: &str, value: impl Into<Value>) -> StoreResult<PropertyMatches<D>> {
        query::find_all_by(&self.descriptor, self.find_all_entities()?, property, value.into())
    }

    /// The single entity whose `property` equals `value`, if any.
    pub fn find_unique_by(
        &self,
        property: &str,
        value: impl Into<Value>,
    ) -> StoreResult<Option<Managed<D>>> {
        query::find_unique_by(&self.descriptor, self.find_all_entities()?, property, value.into())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Partition<D>>> {
        self.partition
            .read()
            .map_err(|_| StoreError::LockPoisoned(self.domain_type()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Partition<D>>> {
        self.partition
            .write()
            .map_err(|_| StoreError::LockPoisoned(self.domain_type()))
    }

    /// This table viewed as a table of `T`; `TypeMismatch` unless `T` is `D`.
    fn bound<T: Entity>(&self) -> StoreResult<&EntityTable<T>> {
        (self as &dyn Any)
            .downcast_ref::<EntityTable<T>>()
            .ok_or_else(StoreError::type_mismatch::<D, T>)
    }

    fn store_entity(&self, entity: &Managed<D>) -> StoreResult<()> {
        let mut partition = self.write()?;
        let mut guard = entity.write();

        let id = match self.descriptor.identifier_of(&guard) {
            Some(id) => {
                if partition.rows.contains_key(&id) {
                    return Err(self.duplicate(&id));
                }
                id
            }
            None => {
                let id = self.issue_key(&partition)?;
                self.descriptor.set_identifier(&mut guard, id.clone())?;
                tracing::debug!(entity = self.domain_type(), id = ?id, "identifier assigned");
                id
            }
        };
        drop(guard);

        partition.rows.insert(id.clone(), entity.clone());
        partition.previous_id = Some(id);
        Ok(())
    }

    /// Next free key after the cursor.
    ///
    /// Keys occupied by merged entities are skipped; a generator that keeps
    /// returning an occupied key (e.g. identity) fails with `AlreadyExists`.
    fn issue_key(&self, partition: &Partition<D>) -> StoreResult<D::Id> {
        let mut previous = partition.previous_id.clone();

        for _ in 0..=partition.rows.len() {
            let candidate = self.generator.next(previous.as_ref()).ok_or_else(|| {
                StoreError::invalid_argument(format!(
                    "entity of type [{}] has no identifier and none could be generated",
                    self.domain_type()
                ))
            })?;

            if !partition.rows.contains_key(&candidate) {
                return Ok(candidate);
            }
            if previous.as_ref() == Some(&candidate) {
                return Err(self.duplicate(&candidate));
            }
            previous = Some(candidate);
        }

        match previous {
            Some(id) => Err(self.duplicate(&id)),
            None => Err(StoreError::invalid_argument(format!(
                "no free identifier for entity of type [{}]",
                self.domain_type()
            ))),
        }
    }

    fn merge_entity(&self, entity: &Managed<D>) -> StoreResult<Managed<D>> {
        let id = self.identifier_of(entity).ok_or_else(|| {
            StoreError::invalid_argument(format!(
                "cannot merge entity of type [{}] without identifier",
                self.domain_type()
            ))
        })?;

        let mut partition = self.write()?;
        let replaced = partition.rows.insert(id.clone(), entity.clone()).is_some();
        tracing::debug!(entity = self.domain_type(), id = ?id, replaced, "entity merged");
        partition.previous_id = Some(id);
        Ok(entity.clone())
    }

    fn find_entity(&self, id: &D::Id) -> StoreResult<Option<Managed<D>>> {
        Ok(self.read()?.rows.get(id).cloned())
    }

    fn find_all_entities(&self) -> StoreResult<Entities<D>> {
        let partition = self.read()?;
        let snapshot: Vec<_> = partition.rows.values().cloned().collect();
        Ok(snapshot.into_iter())
    }

    fn remove_entity(&self, entity: &Managed<D>) -> StoreResult<()> {
        let not_found = || {
            StoreError::not_found(format!(
                "store doesn't contain such entity of type [{}]",
                self.domain_type()
            ))
        };

        let id = self.identifier_of(entity).ok_or_else(not_found)?;
        let mut partition = self.write()?;
        partition.rows.remove(&id).ok_or_else(not_found)?;
        tracing::debug!(entity = self.domain_type(), id = ?id, "entity removed");
        Ok(())
    }

    fn contains_entity(&self, entity: &Managed<D>) -> StoreResult<bool> {
        let partition = self.read()?;
        Ok(partition.rows.values().any(|resident| resident.ptr_eq(entity)))
    }

    fn identifier_of(&self, entity: &Managed<D>) -> Option<D::Id> {
        entity.with(|e| self.descriptor.identifier_of(e))
    }

    fn duplicate(&self, id: &D::Id) -> StoreError {
        StoreError::already_exists(format!(
            "store already contains entity of type [{}] with id {:?}",
            self.domain_type(),
            id
        ))
    }
}

impl<D: Entity> EntityStore for EntityTable<D> {
    fn store<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        self.bound::<T>()?.store_entity(entity)
    }

    fn merge<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<Managed<T>> {
        self.bound::<T>()?.merge_entity(entity)
    }

    fn find<T: Entity>(&self, id: &T::Id) -> StoreResult<Option<Managed<T>>> {
        self.bound::<T>()?.find_entity(id)
    }

    fn find_all<T: Entity>(&self) -> StoreResult<Entities<T>> {
        self.bound::<T>()?.find_all_entities()
    }

    fn remove<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        self.bound::<T>()?.remove_entity(entity)
    }

    fn contains<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<bool> {
        self.bound::<T>()?.contains_entity(entity)
    }
}

impl<D: Entity> core::fmt::Debug for EntityTable<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityTable")
            .field("domain_type", &self.domain_type())
            .field("len", &self.len().ok())
            .finish()
    }
}
