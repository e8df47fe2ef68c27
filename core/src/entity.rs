//! Entity descriptors: the root name, declared fields and relations of a
//! queryable type.

use crate::types::FieldType;

/// A declared attribute of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

/// A named relationship to another entity, usable as a join target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub target: EntityDescriptor,
}

/// Stable mapping from a domain type to its entity name and attributes.
///
/// Relations form a tree, so recursive associations are described only as
/// deep as queries need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    fields: Vec<FieldDef>,
    relations: Vec<Relation>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Declares a field
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty,
        });
        self
    }

    /// Declares a relation to another entity
    pub fn relation(mut self, name: impl Into<String>, target: EntityDescriptor) -> Self {
        self.relations.push(Relation {
            name: name.into(),
            target,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Default qualifier for the root of a query over this entity
    pub fn acronym(&self) -> String {
        self.name.to_lowercase()
    }

    /// Follows a dotted relation path, e.g. `"pets.toys"`
    pub fn related(&self, path: &str) -> Option<&EntityDescriptor> {
        path.split('.').try_fold(self, |entity, segment| {
            entity
                .relations
                .iter()
                .find(|relation| relation.name == segment)
                .map(|relation| &relation.target)
        })
    }

    /// Declared type of a possibly nested attribute path, e.g. `"address.city"`
    pub fn field_type(&self, path: &str) -> Option<FieldType> {
        let (entity, attribute) = match path.rsplit_once('.') {
            Some((relations, attribute)) => (self.related(relations)?, attribute),
            None => (self, path),
        };
        entity
            .fields
            .iter()
            .find(|field| field.name == attribute)
            .map(|field| field.ty)
    }
}

/// Implemented by domain types that can be the root of a query
pub trait Entity {
    fn descriptor() -> EntityDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> EntityDescriptor {
        EntityDescriptor::new("User")
            .field("id", FieldType::Integer)
            .field("name", FieldType::Text)
            .relation(
                "pets",
                EntityDescriptor::new("Pet")
                    .field("name", FieldType::Text)
                    .relation("toys", EntityDescriptor::new("Toy").field("price", FieldType::Real)),
            )
    }

    #[test]
    fn test_acronym_is_lowercase_name() {
        assert_eq!(user().acronym(), "user");
    }

    #[test]
    fn test_field_type_walks_relations() {
        let user = user();
        assert_eq!(user.field_type("id"), Some(FieldType::Integer));
        assert_eq!(user.field_type("pets.name"), Some(FieldType::Text));
        assert_eq!(user.field_type("pets.toys.price"), Some(FieldType::Real));
        assert_eq!(user.field_type("pets.age"), None);
        assert_eq!(user.field_type("owner.name"), None);
    }

    #[test]
    fn test_related() {
        assert_eq!(user().related("pets.toys").map(|e| e.name()), Some("Toy"));
        assert!(user().related("cars").is_none());
    }
}
