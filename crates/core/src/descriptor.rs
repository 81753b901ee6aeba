//! Per-type entity descriptors: identifier and field access without reflection.
//!
//! A descriptor is an ordered list of *levels*. The first level describes the
//! concrete entity type itself; every following level describes an ancestor
//! embedded in it (see [`EntityDescriptor::inherit`]). Lookups walk the levels
//! in order, so the declaration closest to the concrete type wins.

use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::value::Value;

/// Reads a named field of an entity as a [`Value`].
pub type FieldAccessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

type IdGetter<T, I> = Box<dyn Fn(&T) -> Option<I> + Send + Sync>;
type IdSetter<T, I> = Box<dyn Fn(&mut T, I) + Send + Sync>;

struct IdentifierAccessor<T, I> {
    get: IdGetter<T, I>,
    set: IdSetter<T, I>,
}

struct Level<T, I> {
    type_name: &'static str,
    identifier: Option<IdentifierAccessor<T, I>>,
    fields: Vec<(String, FieldAccessor<T>)>,
}

impl<T, I> Level<T, I> {
    fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            identifier: None,
            fields: Vec::new(),
        }
    }
}

/// Accessor record for entity type `T` with identifier type `I`.
///
/// Built once, typically in [`Entity::descriptor`](crate::Entity::descriptor),
/// and handed to the table at construction time.
///
/// ```ignore
/// EntityDescriptor::new()
///     .identifier(|u: &User| u.id, |u, id| u.id = Some(id))
///     .field("name", |u: &User| u.name.clone())
///     .inherit(Auditable::descriptor(), |u| &u.audit, |u| &mut u.audit)
/// ```
pub struct EntityDescriptor<T, I> {
    levels: Vec<Level<T, I>>,
}

impl<T: 'static, I: 'static> EntityDescriptor<T, I> {
    pub fn new() -> Self {
        Self {
            levels: vec![Level::new(core::any::type_name::<T>())],
        }
    }

    /// Declare the identifier on the concrete type's own level.
    pub fn identifier<G, S>(mut self, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Option<I> + Send + Sync + 'static,
        S: Fn(&mut T, I) + Send + Sync + 'static,
    {
        self.levels[0].identifier = Some(IdentifierAccessor {
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Declare a named field on the concrete type's own level.
    pub fn field<F, V>(mut self, name: impl Into<String>, read: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        let accessor: FieldAccessor<T> = Arc::new(move |entity: &T| -> Value { read(entity).into() });
        self.levels[0].fields.push((name.into(), accessor));
        self
    }

    /// Append the levels of an embedded ancestor after the current ones.
    ///
    /// `project`/`project_mut` reach the ancestor value inside `T`.
    pub fn inherit<P: 'static>(
        mut self,
        parent: EntityDescriptor<P, I>,
        project: fn(&T) -> &P,
        project_mut: fn(&mut T) -> &mut P,
    ) -> Self {
        for level in parent.levels {
            let identifier = level.identifier.map(|accessor| {
                let get = accessor.get;
                let set = accessor.set;
                IdentifierAccessor::<T, I> {
                    get: Box::new(move |entity: &T| get(project(entity))),
                    set: Box::new(move |entity: &mut T, id| set(project_mut(entity), id)),
                }
            });

            let fields = level
                .fields
                .into_iter()
                .map(|(name, read)| {
                    let lifted: FieldAccessor<T> = Arc::new(move |entity: &T| read(project(entity)));
                    (name, lifted)
                })
                .collect();

            self.levels.push(Level {
                type_name: level.type_name,
                identifier,
                fields,
            });
        }
        self
    }

    /// Name of the concrete entity type.
    pub fn entity_name(&self) -> &'static str {
        self.levels[0].type_name
    }

    /// Whether any level declares an identifier.
    pub fn has_identifier(&self) -> bool {
        self.identifier_accessor().is_some()
    }

    /// Current identifier of `entity`, if one is set.
    pub fn identifier_of(&self, entity: &T) -> Option<I> {
        self.identifier_accessor()
            .and_then(|accessor| (accessor.get)(entity))
    }

    /// Assign `id` onto `entity` in place.
    pub fn set_identifier(&self, entity: &mut T, id: I) -> StoreResult<()> {
        let accessor = self.identifier_accessor().ok_or_else(|| {
            StoreError::configuration(format!(
                "entity [{}] declares no identifier",
                self.entity_name()
            ))
        })?;
        (accessor.set)(entity, id);
        Ok(())
    }

    /// Resolve the accessor for `name`, walking the ancestry levels in order.
    pub fn accessor(&self, name: &str) -> StoreResult<FieldAccessor<T>> {
        self.levels
            .iter()
            .flat_map(|level| level.fields.iter())
            .find(|(field, _)| field == name)
            .map(|(_, accessor)| Arc::clone(accessor))
            .ok_or_else(|| StoreError::no_such_property(self.entity_name(), name))
    }

    /// Read the named field of `entity`.
    pub fn field_value(&self, entity: &T, name: &str) -> StoreResult<Value> {
        let read = self.accessor(name)?;
        Ok(read(entity))
    }

    /// All declared field names, closest level first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .flat_map(|level| level.fields.iter().map(|(name, _)| name.as_str()))
    }

    fn identifier_accessor(&self) -> Option<&IdentifierAccessor<T, I>> {
        self.levels
            .iter()
            .find_map(|level| level.identifier.as_ref())
    }
}

impl<T: 'static, I: 'static> Default for EntityDescriptor<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, I> core::fmt::Debug for EntityDescriptor<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field(
                "levels",
                &self
                    .levels
                    .iter()
                    .map(|level| level.type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Audit {
        id: Option<i64>,
        created_by: String,
        name: String,
    }

    #[derive(Debug, Default)]
    struct Document {
        audit: Audit,
        name: String,
    }

    fn audit_descriptor() -> EntityDescriptor<Audit, i64> {
        EntityDescriptor::new()
            .identifier(|a: &Audit| a.id, |a, id| a.id = Some(id))
            .field("created_by", |a: &Audit| a.created_by.clone())
            .field("name", |a: &Audit| a.name.clone())
    }

    fn document_descriptor() -> EntityDescriptor<Document, i64> {
        EntityDescriptor::new()
            .field("name", |d: &Document| d.name.clone())
            .inherit(audit_descriptor(), |d| &d.audit, |d| &mut d.audit)
    }

    #[test]
    fn identifier_is_resolved_through_ancestor() {
        let descriptor = document_descriptor();
        let mut doc = Document::default();

        assert!(descriptor.has_identifier());
        assert_eq!(descriptor.identifier_of(&doc), None);

        descriptor.set_identifier(&mut doc, 7).unwrap();
        assert_eq!(doc.audit.id, Some(7));
        assert_eq!(descriptor.identifier_of(&doc), Some(7));
    }

    #[test]
    fn closest_field_declaration_wins() {
        let descriptor = document_descriptor();
        let doc = Document {
            audit: Audit {
                id: None,
                created_by: "alice".to_string(),
                name: "inner".to_string(),
            },
            name: "outer".to_string(),
        };

        assert_eq!(descriptor.field_value(&doc, "name").unwrap(), Value::from("outer"));
        assert_eq!(
            descriptor.field_value(&doc, "created_by").unwrap(),
            Value::from("alice")
        );
    }

    #[test]
    fn unknown_property_is_rejected_without_prefix_matching() {
        let descriptor = document_descriptor();
        let doc = Document::default();

        let err = descriptor.field_value(&doc, "created").unwrap_err();
        assert!(matches!(err, StoreError::NoSuchProperty { ref property, .. } if property == "created"));
    }

    #[test]
    fn descriptor_without_identifier_cannot_assign() {
        let descriptor: EntityDescriptor<Document, i64> =
            EntityDescriptor::new().field("name", |d: &Document| d.name.clone());
        let mut doc = Document::default();

        assert!(!descriptor.has_identifier());
        assert!(matches!(
            descriptor.set_identifier(&mut doc, 1),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn field_names_list_own_level_first() {
        let descriptor = document_descriptor();
        let names: Vec<_> = descriptor.field_names().collect();
        assert_eq!(names, vec!["name", "created_by", "name"]);
    }
}
