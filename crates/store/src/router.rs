//! Multi-type store: routes every operation to the table of the entity's type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use memrepo_core::{Entity, Managed, StoreError, StoreResult, Value};

use crate::config::StoreSettings;
use crate::entity_store::{Entities, EntityStore};
use crate::query::PropertyMatches;
use crate::table::EntityTable;

struct RegisteredTable {
    domain: &'static str,
    // Holds an `EntityTable<T>` for the keyed `TypeId::of::<T>()`.
    table: Arc<dyn Any + Send + Sync>,
}

impl RegisteredTable {
    fn new<T: Entity>(table: Arc<EntityTable<T>>) -> Self {
        Self {
            domain: table.domain_type(),
            table,
        }
    }

    fn downcast<T: Entity>(&self) -> StoreResult<Arc<EntityTable<T>>> {
        let domain = self.domain;
        Arc::clone(&self.table)
            .downcast::<EntityTable<T>>()
            .map_err(|_| StoreError::TypeMismatch {
                expected: domain,
                actual: core::any::type_name::<T>(),
            })
    }
}

/// Façade over one [`EntityTable`] per managed entity type.
///
/// The table map has its own lock; a lookup clones the table handle and
/// releases the map before the table operation runs, so operations on
/// different types never contend.
pub struct EntityTableStore {
    tables: RwLock<HashMap<TypeId, RegisteredTable>>,
    settings: StoreSettings,
}

impl EntityTableStore {
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default())
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            settings,
        }
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
    }

    /// Register `table` as the partition for `T`.
    ///
    /// An existing table for `T` is replaced (its contents are dropped) unless
    /// the settings reject duplicates, in which case this fails with
    /// `Configuration`.
    pub fn register<T: Entity>(&self, table: EntityTable<T>) -> StoreResult<Arc<EntityTable<T>>> {
        let table = Arc::new(table);
        let mut tables = self.write()?;

        if let Some(existing) = tables.get(&TypeId::of::<T>()) {
            if self.settings.reject_duplicate_tables {
                return Err(StoreError::configuration(format!(
                    "a table for entity [{}] is already registered",
                    existing.domain
                )));
            }
            tracing::warn!(entity = existing.domain, "replacing registered table");
        }

        tables.insert(TypeId::of::<T>(), RegisteredTable::new(Arc::clone(&table)));
        tracing::info!(entity = table.domain_type(), "table registered");
        Ok(table)
    }

    /// The table for `T`, registering the one built by `create` if there is
    /// none yet. `create` runs under the map lock, at most once per type.
    pub fn table_or_register<T, F>(&self, create: F) -> StoreResult<Arc<EntityTable<T>>>
    where
        T: Entity,
        F: FnOnce() -> StoreResult<EntityTable<T>>,
    {
        if let Some(registered) = self.read()?.get(&TypeId::of::<T>()) {
            return registered.downcast::<T>();
        }

        let mut tables = self.write()?;
        if let Some(registered) = tables.get(&TypeId::of::<T>()) {
            return registered.downcast::<T>();
        }

        let table = Arc::new(create()?);
        tables.insert(TypeId::of::<T>(), RegisteredTable::new(Arc::clone(&table)));
        tracing::debug!(entity = table.domain_type(), "table created on first use");
        Ok(table)
    }

    /// The table managing `T`.
    pub fn table<T: Entity>(&self) -> StoreResult<Arc<EntityTable<T>>> {
        self.read()?
            .get(&TypeId::of::<T>())
            .ok_or_else(StoreError::unmanaged::<T>)?
            .downcast::<T>()
    }

    pub fn is_managed<T: Entity>(&self) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(&TypeId::of::<T>()))
    }

    /// Names of all managed entity types, sorted.
    pub fn managed_types(&self) -> StoreResult<Vec<&'static str>> {
        let mut names: Vec<_> = self.read()?.values().map(|t| t.domain).collect();
        names.sort_unstable();
        Ok(names)
    }

    pub fn find_all_by<T: Entity>(
        &self,
        property: &str,
        value: impl Into<Value>,
    ) -> StoreResult<PropertyMatches<T>> {
        self.table::<T>()?.find_all_by(property, value)
    }

    pub fn find_unique_by<T: Entity>(
        &self,
        property: &str,
        value: impl Into<Value>,
    ) -> StoreResult<Option<Managed<T>>> {
        self.table::<T>()?.find_unique_by(property, value)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<TypeId, RegisteredTable>>> {
        self.tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("table router"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<TypeId, RegisteredTable>>> {
        self.tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("table router"))
    }
}

impl Default for EntityTableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EntityTableStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityTableStore")
            .field("managed_types", &self.managed_types().ok())
            .field("settings", &self.settings)
            .finish()
    }
}

impl EntityStore for EntityTableStore {
    fn store<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        self.table::<T>()?.store(entity)
    }

    fn merge<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<Managed<T>> {
        self.table::<T>()?.merge(entity)
    }

    fn find<T: Entity>(&self, id: &T::Id) -> StoreResult<Option<Managed<T>>> {
        self.table::<T>()?.find::<T>(id)
    }

    fn find_all<T: Entity>(&self) -> StoreResult<Entities<T>> {
        self.table::<T>()?.find_all::<T>()
    }

    fn remove<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<()> {
        self.table::<T>()?.remove(entity)
    }

    fn contains<T: Entity>(&self, entity: &Managed<T>) -> StoreResult<bool> {
        self.table::<T>()?.contains(entity)
    }
}
