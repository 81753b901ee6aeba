//! Entity trait: a typed domain object with exactly one identifier.

use crate::descriptor::EntityDescriptor;
use crate::id::Identifier;

/// Entity marker + descriptor factory.
///
/// The identifier may be absent until the store assigns one; it is read and
/// written through the descriptor rather than through the type itself.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Identifier type used as the partition key.
    type Id: Identifier;

    /// Build the accessor record for this type.
    ///
    /// Called once per table, when the table is created.
    fn descriptor() -> EntityDescriptor<Self, Self::Id>;
}
