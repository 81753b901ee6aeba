//! Identifier registry: which generator issues keys for which identifier type.
//!
//! The registry is mutable while the store is being configured; `build()`
//! takes a read-only snapshot ([`IdentifierMapping`]) that is shared by every
//! table created afterwards.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use memrepo_core::Identifier;

use crate::generator::PrimaryKeyGenerator;

/// Shared generator handle for identifier type `I`.
pub type SharedGenerator<I> = Arc<dyn PrimaryKeyGenerator<I>>;

#[derive(Clone)]
struct Registration {
    id_type: &'static str,
    // Holds a `SharedGenerator<I>` for the keyed `TypeId::of::<I>()`.
    generator: Arc<dyn Any + Send + Sync>,
}

impl Registration {
    fn new<I: Identifier>(generator: SharedGenerator<I>) -> Self {
        Self {
            id_type: core::any::type_name::<I>(),
            generator: Arc::new(generator),
        }
    }

    fn generator<I: Identifier>(&self) -> Option<SharedGenerator<I>> {
        self.generator.downcast_ref::<SharedGenerator<I>>().cloned()
    }
}

/// Mutable registration of one generator per identifier type.
#[derive(Clone, Default)]
pub struct IdentifierRegistry {
    registrations: HashMap<TypeId, Registration>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `generator` to identifier type `I`, replacing any earlier binding.
    pub fn add_identifier<I, G>(&mut self, generator: G) -> &mut Self
    where
        I: Identifier,
        G: PrimaryKeyGenerator<I> + 'static,
    {
        self.add_shared::<I>(Arc::new(generator))
    }

    /// Bind an already shared generator to identifier type `I`.
    pub fn add_shared<I: Identifier>(&mut self, generator: SharedGenerator<I>) -> &mut Self {
        let registration = Registration::new(generator);
        if let Some(previous) = self
            .registrations
            .insert(TypeId::of::<I>(), registration)
        {
            tracing::debug!(id_type = previous.id_type, "identifier generator overridden");
        }
        self
    }

    pub fn contains<I: Identifier>(&self) -> bool {
        self.registrations.contains_key(&TypeId::of::<I>())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Read-only snapshot of the current registrations.
    pub fn build(&self) -> IdentifierMapping {
        IdentifierMapping {
            registrations: self.registrations.clone(),
        }
    }
}

impl core::fmt::Debug for IdentifierRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentifierRegistry")
            .field("id_types", &id_type_names(&self.registrations))
            .finish()
    }
}

/// Immutable lookup from identifier type to its generator.
#[derive(Clone, Default)]
pub struct IdentifierMapping {
    registrations: HashMap<TypeId, Registration>,
}

impl IdentifierMapping {
    /// Mapping with no registrations (every table falls back to default construction).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn generator<I: Identifier>(&self) -> Option<SharedGenerator<I>> {
        self.registrations
            .get(&TypeId::of::<I>())
            .and_then(Registration::generator::<I>)
    }

    pub fn contains<I: Identifier>(&self) -> bool {
        self.registrations.contains_key(&TypeId::of::<I>())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Names of the registered identifier types, sorted.
    pub fn id_types(&self) -> Vec<&'static str> {
        id_type_names(&self.registrations)
    }
}

impl core::fmt::Debug for IdentifierMapping {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdentifierMapping")
            .field("id_types", &self.id_types())
            .finish()
    }
}

fn id_type_names(registrations: &HashMap<TypeId, Registration>) -> Vec<&'static str> {
    let mut names: Vec<_> = registrations.values().map(|r| r.id_type).collect();
    names.sort_unstable();
    names
}

/// Extension point for contributing identifier generators.
pub trait RepositoryConfigurer: Send + Sync {
    fn add_identifiers(&self, _registry: &mut IdentifierRegistry) {}
}

impl<C: RepositoryConfigurer + ?Sized> RepositoryConfigurer for Arc<C> {
    fn add_identifiers(&self, registry: &mut IdentifierRegistry) {
        (**self).add_identifiers(registry)
    }
}

/// Fans a registry out to every delegate configurer, in insertion order.
#[derive(Default)]
pub struct ConfigurerComposite {
    delegates: Vec<Arc<dyn RepositoryConfigurer>>,
}

impl ConfigurerComposite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_configurer(&mut self, configurer: Arc<dyn RepositoryConfigurer>) {
        self.delegates.push(configurer);
    }

    pub fn add_configurers<I>(&mut self, configurers: I)
    where
        I: IntoIterator<Item = Arc<dyn RepositoryConfigurer>>,
    {
        self.delegates.extend(configurers);
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl RepositoryConfigurer for ConfigurerComposite {
    fn add_identifiers(&self, registry: &mut IdentifierRegistry) {
        for delegate in &self.delegates {
            delegate.add_identifiers(registry);
        }
    }
}
