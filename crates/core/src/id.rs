//! Identifier types usable as primary keys.

use core::fmt::Debug;
use core::hash::Hash;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// A value type usable as a table partition key.
///
/// Equality and hashing must be well-defined.
pub trait Identifier: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Construct a fresh identifier from nothing.
    ///
    /// Used as the fallback key policy when no generator is registered for the
    /// identifier type. Types without a natural empty constructor return `None`.
    fn construct() -> Option<Self> {
        None
    }
}

impl Identifier for i32 {}
impl Identifier for i64 {}
impl Identifier for u32 {}
impl Identifier for u64 {}
impl Identifier for String {}

impl Identifier for Uuid {
    fn construct() -> Option<Self> {
        Some(Uuid::now_v7())
    }
}

/// Generated, time-ordered identifier value object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(Uuid);

macro_rules! impl_uuid_identifier {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Identifier for $t {
            fn construct() -> Option<Self> {
                Some(Self::new())
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| StoreError::invalid_argument(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_identifier!(EntityKey, "EntityKey");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_identifiers_are_not_constructible() {
        assert_eq!(i32::construct(), None);
        assert_eq!(i64::construct(), None);
        assert_eq!(String::construct(), None);
    }

    #[test]
    fn entity_keys_are_constructible_and_distinct() {
        let a = EntityKey::construct().unwrap();
        let b = EntityKey::construct().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn entity_key_parses_its_display_form() {
        let key = EntityKey::new();
        let parsed: EntityKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);

        let err = "not-a-uuid".parse::<EntityKey>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}
