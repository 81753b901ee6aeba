//! `memrepo-core`: building blocks of the in-memory entity store.
//!
//! This crate contains the store-independent primitives: entities, identifiers,
//! descriptors, property values, managed handles and the error model.

pub mod descriptor;
pub mod entity;
pub mod error;
pub mod id;
pub mod managed;
pub mod value;

pub use descriptor::{EntityDescriptor, FieldAccessor};
pub use entity::Entity;
pub use error::{StoreError, StoreResult};
pub use id::{EntityKey, Identifier};
pub use managed::Managed;
pub use value::Value;
