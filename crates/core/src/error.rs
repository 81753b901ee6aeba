//! Store error model.

use thiserror::Error;

/// Result type used across the store.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by entity tables, the table router and repositories.
///
/// Every variant is a local, synchronous, non-retryable condition. The store
/// never retries internally; callers decide whether a condition is
/// recoverable (e.g. switch from `store` to `merge` on `AlreadyExists`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object or type is not a member of the partition's declared type.
    #[error("type mismatch: [{actual}] is not an entity of type [{expected}]")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// No table is registered for the resolved entity type.
    #[error("[{0}] is not an entity or is not managed by the entity store")]
    UnmanagedType(&'static str),

    /// Duplicate primary key on create.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The targeted entity is not resident.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A property name could not be resolved on the entity type or its ancestors.
    #[error("entity [{entity}] has no property [{property}]")]
    NoSuchProperty {
        entity: &'static str,
        property: String,
    },

    /// A uniqueness expectation was violated.
    #[error("property [{property}] is not a unique field in entity [{entity}]")]
    NonUniqueResult {
        entity: &'static str,
        property: String,
    },

    /// The store cannot be set up as requested.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A partition lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl StoreError {
    pub fn type_mismatch<Expected: ?Sized, Actual: ?Sized>() -> Self {
        Self::TypeMismatch {
            expected: core::any::type_name::<Expected>(),
            actual: core::any::type_name::<Actual>(),
        }
    }

    pub fn unmanaged<T: ?Sized>() -> Self {
        Self::UnmanagedType(core::any::type_name::<T>())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn no_such_property(entity: &'static str, property: impl Into<String>) -> Self {
        Self::NoSuchProperty {
            entity,
            property: property.into(),
        }
    }

    pub fn non_unique(entity: &'static str, property: impl Into<String>) -> Self {
        Self::NonUniqueResult {
            entity,
            property: property.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
