//! In-memory entity storage: key generation, per-type tables, routing,
//! property queries and repositories.

pub mod config;
pub mod entity_store;
pub mod factory;
pub mod generator;
pub mod query;
pub mod registry;
pub mod repository;
pub mod router;
pub mod table;


pub use config::{REJECT_DUPLICATE_TABLES_ENV, StoreConfiguration, StoreSettings};
pub use entity_store::{Entities, EntityStore};
pub use factory::RepositoryFactory;
pub use generator::{
    DefaultConstructGenerator, IdentityGenerator, IntegerPrimaryKeyGenerator, LongPrimaryKeyGenerator,
    PrimaryKeyGenerator, UnsignedLongPrimaryKeyGenerator, UnsignedPrimaryKeyGenerator,
};
pub use query::PropertyMatches;
pub use registry::{
    ConfigurerComposite, IdentifierMapping, IdentifierRegistry, RepositoryConfigurer, SharedGenerator,
};
pub use repository::InMemoryRepository;
pub use router::EntityTableStore;
pub use table::EntityTable;
