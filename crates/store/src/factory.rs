//! Creates repositories and the tables behind them on demand.

use std::sync::Arc;

use memrepo_core::{Entity, StoreResult};

use crate::config::{StoreConfiguration, StoreSettings};
use crate::registry::IdentifierMapping;
use crate::repository::InMemoryRepository;
use crate::router::EntityTableStore;
use crate::table::EntityTable;

/// Hands out [`InMemoryRepository`] instances backed by a shared router.
///
/// The first repository requested for a type registers its table, using the
/// generator the identifier mapping holds for the type's identifier (or
/// default construction of the identifier). Later requests reuse that table.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    store: Arc<EntityTableStore>,
    mapping: Arc<IdentifierMapping>,
}

impl RepositoryFactory {
    pub fn new(store: Arc<EntityTableStore>, mapping: Arc<IdentifierMapping>) -> Self {
        Self { store, mapping }
    }

    /// Factory over a fresh router, built from `configuration` and `settings`.
    pub fn from_configuration(configuration: &StoreConfiguration, settings: StoreSettings) -> Self {
        Self::new(
            Arc::new(EntityTableStore::with_settings(settings)),
            Arc::new(configuration.identifier_mapping()),
        )
    }

    pub fn store(&self) -> &Arc<EntityTableStore> {
        &self.store
    }

    pub fn mapping(&self) -> &IdentifierMapping {
        &self.mapping
    }

    /// Repository for `T`, creating and registering its table on first use.
    pub fn repository<T: Entity>(&self) -> StoreResult<InMemoryRepository<T>> {
        self.store
            .table_or_register(|| EntityTable::<T>::from_mapping(&self.mapping))?;
        Ok(InMemoryRepository::new(Arc::clone(&self.store)))
    }
}

impl Default for RepositoryFactory {
    fn default() -> Self {
        Self::from_configuration(&StoreConfiguration::new(), StoreSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_store::EntityStore;
    use crate::registry::{IdentifierRegistry, RepositoryConfigurer};
    use memrepo_core::{EntityDescriptor, Managed, StoreError};

    #[derive(Debug, Clone)]
    struct Ledger {
        id: Option<String>,
    }

    impl Entity for Ledger {
        type Id = String;

        fn descriptor() -> EntityDescriptor<Self, String> {
            EntityDescriptor::new().identifier(|l: &Ledger| l.id.clone(), |l, id| l.id = Some(id))
        }
    }

    #[derive(Debug, Clone)]
    struct Account {
        id: Option<u64>,
    }

    impl Entity for Account {
        type Id = u64;

        fn descriptor() -> EntityDescriptor<Self, u64> {
            EntityDescriptor::new().identifier(|a: &Account| a.id, |a, id| a.id = Some(id))
        }
    }

    struct LedgerCodes;

    impl RepositoryConfigurer for LedgerCodes {
        fn add_identifiers(&self, registry: &mut IdentifierRegistry) {
            registry.add_identifier::<String, _>(|previous: Option<&String>| {
                let next = previous
                    .and_then(|code| code.strip_prefix("L-"))
                    .and_then(|n| n.parse::<u32>().ok())
                    .map_or(1, |n| n + 1);
                Some(format!("L-{next}"))
            });
        }
    }

    #[test]
    fn repositories_share_one_table_per_type() {
        let factory = RepositoryFactory::default();
        let first = factory.repository::<Account>().unwrap();
        let second = factory.repository::<Account>().unwrap();

        let account = Managed::new(Account { id: None });
        first.save(&account).unwrap();

        assert!(second.find_by_id(&1).unwrap().unwrap().ptr_eq(&account));
        assert_eq!(factory.store().managed_types().unwrap().len(), 1);
    }

    #[test]
    fn unconstructible_identifier_without_generator_fails() {
        let factory = RepositoryFactory::default();
        let err = factory.repository::<Ledger>().unwrap_err();

        assert!(matches!(err, StoreError::Configuration(_)));
        assert!(!factory.store().is_managed::<Ledger>().unwrap());
    }

    #[test]
    fn configured_generator_is_used() {
        let configuration = StoreConfiguration::new().with_configurer(LedgerCodes);
        let factory = RepositoryFactory::from_configuration(&configuration, StoreSettings::default());
        let repo = factory.repository::<Ledger>().unwrap();

        let a = Managed::new(Ledger { id: None });
        let b = Managed::new(Ledger { id: None });
        repo.save(&a).unwrap();
        repo.save(&b).unwrap();

        assert_eq!(a.read().id.as_deref(), Some("L-1"));
        assert_eq!(b.read().id.as_deref(), Some("L-2"));
        assert!(factory.store().contains(&b).unwrap());
    }
}
