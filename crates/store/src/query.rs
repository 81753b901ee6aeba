//! Exact-match property queries over a table scan.

use memrepo_core::{Entity, EntityDescriptor, FieldAccessor, Managed, StoreError, StoreResult, Value};

use crate::entity_store::Entities;

/// Lazy filter over a table snapshot, keeping entities whose field equals the
/// expected value.
pub struct PropertyMatches<T> {
    entities: Entities<T>,
    read: FieldAccessor<T>,
    expected: Value,
}

impl<T> Iterator for PropertyMatches<T> {
    type Item = Managed<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let read = &self.read;
        let expected = &self.expected;
        self.entities
            .by_ref()
            .find(|entity| entity.with(|e| read(e) == *expected))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.entities.size_hint().1)
    }
}

/// Filter `entities` by `property == value`.
///
/// The property is resolved once through the descriptor, so an unknown name
/// fails with `NoSuchProperty` even when there is nothing to scan.
pub fn find_all_by<T: Entity>(
    descriptor: &EntityDescriptor<T, T::Id>,
    entities: Entities<T>,
    property: &str,
    value: Value,
) -> StoreResult<PropertyMatches<T>> {
    let read = descriptor.accessor(property)?;
    Ok(PropertyMatches {
        entities,
        read,
        expected: value,
    })
}

/// The single entity whose `property` equals `value`.
///
/// `None` for no match; `NonUniqueResult` for more than one.
pub fn find_unique_by<T: Entity>(
    descriptor: &EntityDescriptor<T, T::Id>,
    entities: Entities<T>,
    property: &str,
    value: Value,
) -> StoreResult<Option<Managed<T>>> {
    let mut matches: Vec<_> = find_all_by(descriptor, entities, property, value)?.collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.pop()),
        _ => Err(StoreError::non_unique(descriptor.entity_name(), property)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: Option<u32>,
        label: Option<String>,
        weight: u32,
    }

    impl Entity for Tag {
        type Id = u32;

        fn descriptor() -> EntityDescriptor<Self, u32> {
            EntityDescriptor::new()
                .identifier(|t: &Tag| t.id, |t, id| t.id = Some(id))
                .field("label", |t: &Tag| t.label.clone())
                .field("weight", |t: &Tag| t.weight)
        }
    }

    fn tags() -> Vec<Managed<Tag>> {
        vec![
            Managed::new(Tag {
                id: Some(1),
                label: Some("x".into()),
                weight: 5,
            }),
            Managed::new(Tag {
                id: Some(2),
                label: Some("x".into()),
                weight: 3,
            }),
            Managed::new(Tag {
                id: Some(3),
                label: Some("y".into()),
                weight: 5,
            }),
            Managed::new(Tag {
                id: Some(4),
                label: None,
                weight: 1,
            }),
        ]
    }

    fn ids(matches: impl Iterator<Item = Managed<Tag>>) -> Vec<Option<u32>> {
        matches.map(|t| t.read().id).collect()
    }

    #[test]
    fn all_matches_are_returned_in_scan_order() {
        let descriptor = Tag::descriptor();
        let matches = find_all_by(&descriptor, tags().into_iter(), "weight", Value::from(5u32)).unwrap();
        assert_eq!(ids(matches), vec![Some(1), Some(3)]);
    }

    #[test]
    fn unsuffixed_literal_matches_unsigned_field() {
        let descriptor = Tag::descriptor();
        let matches = find_all_by(&descriptor, tags().into_iter(), "weight", Value::from(5)).unwrap();
        assert_eq!(ids(matches), vec![Some(1), Some(3)]);

        let unique = find_unique_by(&descriptor, tags().into_iter(), "weight", Value::from(3i64)).unwrap();
        assert_eq!(unique.unwrap().read().id, Some(2));
    }

    #[test]
    fn null_matches_absent_fields() {
        let descriptor = Tag::descriptor();
        let matches = find_all_by(&descriptor, tags().into_iter(), "label", Value::Null).unwrap();
        assert_eq!(ids(matches), vec![Some(4)]);
    }

    #[test]
    fn unknown_property_fails_even_without_entities() {
        let descriptor = Tag::descriptor();
        let result = find_all_by(&descriptor, Vec::new().into_iter(), "colour", Value::from("red"));
        assert!(matches!(result, Err(StoreError::NoSuchProperty { .. })));
    }

    #[test]
    fn unique_match_semantics() {
        let descriptor = Tag::descriptor();

        let none = find_unique_by(&descriptor, tags().into_iter(), "label", Value::from("z")).unwrap();
        assert!(none.is_none());

        let one = find_unique_by(&descriptor, tags().into_iter(), "label", Value::from("y")).unwrap();
        assert_eq!(one.unwrap().read().id, Some(3));

        let err = find_unique_by(&descriptor, tags().into_iter(), "label", Value::from("x")).unwrap_err();
        assert!(matches!(err, StoreError::NonUniqueResult { ref property, .. } if property == "label"));
    }
}
