//! Primary key generation policies.
//!
//! A generator is a pure function from the previously issued key to the next
//! one. It holds no per-table state: the table owns the cursor, so a single
//! generator instance can be shared by every table with the same identifier
//! type.

use memrepo_core::Identifier;

/// Derives the next identifier from the last issued one.
///
/// Returns `None` when the policy cannot issue a key for `previous`.
pub trait PrimaryKeyGenerator<I>: Send + Sync {
    fn next(&self, previous: Option<&I>) -> Option<I>;
}

impl<I, F> PrimaryKeyGenerator<I> for F
where
    F: Fn(Option<&I>) -> Option<I> + Send + Sync,
{
    fn next(&self, previous: Option<&I>) -> Option<I> {
        self(previous)
    }
}

macro_rules! sequence_generator {
    ($(#[$meta:meta])* $name:ident, $t:ty) => {
        $(#[$meta])*
        ///
        /// Absent or non-positive previous values restart the sequence at `1`.
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl PrimaryKeyGenerator<$t> for $name {
            fn next(&self, previous: Option<&$t>) -> Option<$t> {
                match previous {
                    Some(&previous) if previous >= 1 => Some(previous.saturating_add(1)),
                    _ => Some(1),
                }
            }
        }
    };
}

sequence_generator!(
    /// Sequence policy for `i32` identifiers.
    IntegerPrimaryKeyGenerator,
    i32
);
sequence_generator!(
    /// Sequence policy for `i64` identifiers.
    LongPrimaryKeyGenerator,
    i64
);
sequence_generator!(
    /// Sequence policy for `u32` identifiers.
    UnsignedPrimaryKeyGenerator,
    u32
);
sequence_generator!(
    /// Sequence policy for `u64` identifiers.
    UnsignedLongPrimaryKeyGenerator,
    u64
);

/// Returns the previous key unchanged (pre-assigned identifiers).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdentityGenerator;

impl<I: Clone> PrimaryKeyGenerator<I> for IdentityGenerator {
    fn next(&self, previous: Option<&I>) -> Option<I> {
        previous.cloned()
    }
}

/// Fallback policy: constructs a fresh identifier via [`Identifier::construct`].
///
/// Only created for identifier types that are constructible; see
/// [`DefaultConstructGenerator::for_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultConstructGenerator<I> {
    _id: core::marker::PhantomData<fn() -> I>,
}

impl<I: Identifier> DefaultConstructGenerator<I> {
    /// `None` when `I` has no natural empty constructor.
    pub fn for_type() -> Option<Self> {
        I::construct().map(|_| Self {
            _id: core::marker::PhantomData,
        })
    }
}

impl<I: Identifier> PrimaryKeyGenerator<I> for DefaultConstructGenerator<I> {
    fn next(&self, _previous: Option<&I>) -> Option<I> {
        I::construct()
    }
}
