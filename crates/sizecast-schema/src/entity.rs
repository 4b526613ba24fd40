//! Entity and attribute records produced by extraction.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sizecast_core::LogicalType;

/// What an array attribute holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArrayItems {
    /// Item schema declares its own properties; a nested entity named
    /// `capitalize(attribute name)` carries them.
    Objects,
    /// Array of primitives, with the declared item type when present.
    Primitive { declared: Option<String> },
}

/// One attribute of an entity. Each variant carries exactly the fields it
/// needs; there are no optional grab-bag keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Attribute {
    Primitive {
        name: String,
        declared: Option<String>,
        required: bool,
    },
    Array {
        name: String,
        items: ArrayItems,
        required: bool,
    },
    /// Embedded object with its own properties; `target` names the nested
    /// entity (resolved case-insensitively).
    Reference {
        name: String,
        target: String,
        required: bool,
    },
    /// Object without properties; nothing to expand.
    InlineObject { name: String, required: bool },
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive { name, .. }
            | Self::Array { name, .. }
            | Self::Reference { name, .. }
            | Self::InlineObject { name, .. } => name,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Self::Primitive { required, .. }
            | Self::Array { required, .. }
            | Self::Reference { required, .. }
            | Self::InlineObject { required, .. } => *required,
        }
    }

    /// Normalized logical type, with name overrides applied (see
    /// [`LogicalType::classify`]).
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Self::Primitive { name, declared, .. } => {
                LogicalType::classify(name, declared.as_deref())
            }
            Self::Array { name, .. } => LogicalType::classify(name, Some("array")),
            Self::Reference { name, .. } => LogicalType::classify(name, Some("reference")),
            Self::InlineObject { name, .. } => LogicalType::classify(name, Some("object")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    /// Name of the entity this one is embedded under, if any.
    pub parent: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }
}

/// Flat view of an extracted schema: every entity keyed by name, with the
/// nested ones flagged so collection-level consumers can skip them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityGraph {
    entities: BTreeMap<String, Entity>,
    nested: BTreeSet<String>,
}

impl EntityGraph {
    pub fn insert(&mut self, entity: Entity) {
        if entity.parent.is_some() {
            self.nested.insert(entity.name.clone());
        }
        // Same-name siblings overwrite; schema authors must keep names
        // unique within scope.
        self.entities.insert(entity.name.clone(), entity);
    }

    /// Entity lookup by name, case-insensitive.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        if let Some(e) = self.entities.get(name) {
            return Some(e);
        }
        let lname = name.to_ascii_lowercase();
        self.entities
            .values()
            .find(|e| e.name.to_ascii_lowercase() == lname)
    }

    pub fn is_nested(&self, name: &str) -> bool {
        self.nested.contains(name)
    }

    /// Root entities, i.e. top-level collections.
    pub fn roots(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(move |e| !self.nested.contains(&e.name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolved logical type of `collection.field`, if both exist.
    pub fn field_type(&self, collection: &str, field: &str) -> Option<LogicalType> {
        self.get(collection)?
            .attribute(field)
            .map(Attribute::logical_type)
    }
}
