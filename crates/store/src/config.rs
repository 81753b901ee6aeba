//! Store configuration: built-in generators, configurers and runtime settings.

use std::sync::Arc;

use crate::generator::{
    IntegerPrimaryKeyGenerator, LongPrimaryKeyGenerator, UnsignedLongPrimaryKeyGenerator,
    UnsignedPrimaryKeyGenerator,
};
use crate::registry::{ConfigurerComposite, IdentifierMapping, IdentifierRegistry, RepositoryConfigurer};

/// Environment variable toggling [`StoreSettings::reject_duplicate_tables`].
pub const REJECT_DUPLICATE_TABLES_ENV: &str = "MEMREPO_REJECT_DUPLICATE_TABLES";

/// Runtime settings of a table router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// Fail registration of a second table for an already managed type instead
    /// of replacing the first one (and losing its contents).
    pub reject_duplicate_tables: bool,
}

impl StoreSettings {
    /// Read settings from the process environment.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(raw) = lookup(REJECT_DUPLICATE_TABLES_ENV) {
            match parse_flag(&raw) {
                Some(flag) => settings.reject_duplicate_tables = flag,
                None => tracing::warn!(
                    variable = REJECT_DUPLICATE_TABLES_ENV,
                    value = %raw,
                    "ignoring unparseable store setting"
                ),
            }
        }

        settings
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Builds the identifier mapping: built-in sequences first, then every
/// configurer in the order it was added (later registrations win).
#[derive(Default)]
pub struct StoreConfiguration {
    configurers: ConfigurerComposite,
}

impl StoreConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configurer(mut self, configurer: impl RepositoryConfigurer + 'static) -> Self {
        self.configurers.add_configurer(Arc::new(configurer));
        self
    }

    pub fn with_configurers<I>(mut self, configurers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn RepositoryConfigurer>>,
    {
        self.configurers.add_configurers(configurers);
        self
    }

    /// Register the built-in generators, then the configurers' overrides.
    pub fn add_identifiers(&self, registry: &mut IdentifierRegistry) {
        registry
            .add_identifier::<i32, _>(IntegerPrimaryKeyGenerator)
            .add_identifier::<i64, _>(LongPrimaryKeyGenerator)
            .add_identifier::<u32, _>(UnsignedPrimaryKeyGenerator)
            .add_identifier::<u64, _>(UnsignedLongPrimaryKeyGenerator);

        self.configurers.add_identifiers(registry);
    }

    pub fn identifier_mapping(&self) -> IdentifierMapping {
        let mut registry = IdentifierRegistry::new();
        self.add_identifiers(&mut registry);
        let mapping = registry.build();

        tracing::info!(
            configurers = self.configurers.len(),
            id_types = ?mapping.id_types(),
            "identifier mapping built"
        );
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::IdentityGenerator;
    use memrepo_core::EntityKey;
    use std::collections::HashMap;

    struct PreAssignedLongs;

    impl RepositoryConfigurer for PreAssignedLongs {
        fn add_identifiers(&self, registry: &mut IdentifierRegistry) {
            registry.add_identifier::<i64, _>(IdentityGenerator);
        }
    }

    #[test]
    fn defaults_cover_integer_identifiers() {
        let mapping = StoreConfiguration::new().identifier_mapping();

        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.generator::<i32>().unwrap().next(None), Some(1));
        assert_eq!(mapping.generator::<u64>().unwrap().next(Some(&9)), Some(10));
        assert!(!mapping.contains::<EntityKey>());
    }

    #[test]
    fn configurers_override_defaults() {
        let mapping = StoreConfiguration::new()
            .with_configurer(PreAssignedLongs)
            .identifier_mapping();

        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.generator::<i64>().unwrap().next(Some(&41)), Some(41));
        assert_eq!(mapping.generator::<i32>().unwrap().next(Some(&41)), Some(42));
    }

    #[test]
    fn settings_default_to_replacing_tables() {
        let settings = StoreSettings::from_lookup(|_| None);
        assert!(!settings.reject_duplicate_tables);
    }

    #[test]
    fn settings_read_flag_from_environment() {
        let env: HashMap<&str, &str> = [(REJECT_DUPLICATE_TABLES_ENV, " Yes ")].into();
        let settings = StoreSettings::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert!(settings.reject_duplicate_tables);
    }

    #[test]
    fn unparseable_flag_falls_back_to_default() {
        let settings = StoreSettings::from_lookup(|_| Some("sometimes".to_string()));
        assert_eq!(settings, StoreSettings::default());
    }
}
