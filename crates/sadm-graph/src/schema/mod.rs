//! Schema registry: attribute and relationship descriptors.
//!
//! The registry is an immutable value built once by [`build_registry`] and
//! shared (`Arc`) by every container that validates against it. All lookups
//! are `BTreeMap` probes.

mod attributes;
mod relationships;

pub use attributes::AttributeTag;

use sadm_id::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::value::ValueType;
use attributes::ATTRIBUTE_TABLE;
use relationships::RELATIONSHIP_TABLE;

/// Relationship kinds; every forward kind has an inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Contains,
    ContainedBy,
    References,
    ReferencedBy,
}

impl RelationshipKind {
    pub fn inverse(self) -> Self {
        match self {
            RelationshipKind::Contains => RelationshipKind::ContainedBy,
            RelationshipKind::ContainedBy => RelationshipKind::Contains,
            RelationshipKind::References => RelationshipKind::ReferencedBy,
            RelationshipKind::ReferencedBy => RelationshipKind::References,
        }
    }

    /// `Contains` and `References` are the declared directions.
    pub fn is_forward(self) -> bool {
        matches!(
            self,
            RelationshipKind::Contains | RelationshipKind::References
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Contains => "contains",
            RelationshipKind::ContainedBy => "contained_by",
            RelationshipKind::References => "references",
            RelationshipKind::ReferencedBy => "referenced_by",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed `[min, max]` occurrences; `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arity {
    pub min: u32,
    pub max: Option<u32>,
}

impl Arity {
    pub fn admits(&self, count: usize) -> bool {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        count >= u64::from(self.min) && self.max.is_none_or(|max| count <= u64::from(max))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {max}]", self.min),
            None => write!(f, "[{}, *]", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    pub tag: AttributeTag,
    pub entity_type: EntityType,
    pub name: &'static str,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    pub from: EntityType,
    pub to: EntityType,
    pub kind: RelationshipKind,
    pub arity: Arity,
}

/// Immutable attribute and relationship tables.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    attributes: BTreeMap<AttributeTag, AttributeDescriptor>,
    attributes_by_name: BTreeMap<EntityType, BTreeMap<&'static str, AttributeTag>>,
    relationships: BTreeMap<(EntityType, EntityType), RelationshipDescriptor>,
}

/// Build both schema tables from their declarative lists.
pub fn build_registry() -> SchemaRegistry {
    let mut attributes = BTreeMap::new();
    let mut attributes_by_name: BTreeMap<EntityType, BTreeMap<&'static str, AttributeTag>> =
        BTreeMap::new();
    for entry in ATTRIBUTE_TABLE {
        attributes.insert(
            entry.tag,
            AttributeDescriptor {
                tag: entry.tag,
                entity_type: entry.entity_type,
                name: entry.name,
                value_type: entry.value_type,
            },
        );
        attributes_by_name
            .entry(entry.entity_type)
            .or_default()
            .insert(entry.name, entry.tag);
    }

    let mut relationships = BTreeMap::new();
    for entry in RELATIONSHIP_TABLE {
        relationships.insert(
            (entry.from, entry.to),
            RelationshipDescriptor {
                from: entry.from,
                to: entry.to,
                kind: entry.kind,
                arity: entry.arity,
            },
        );
    }
    // Pairs declared in both directions (object -> object, stream <-> track
    // format) keep their declared entries.
    for entry in RELATIONSHIP_TABLE {
        relationships
            .entry((entry.to, entry.from))
            .or_insert(RelationshipDescriptor {
                from: entry.to,
                to: entry.from,
                kind: entry.kind.inverse(),
                arity: entry.arity,
            });
    }

    SchemaRegistry {
        attributes,
        attributes_by_name,
        relationships,
    }
}

impl SchemaRegistry {
    /// Process-wide registry, built on first use.
    pub fn shared() -> Arc<SchemaRegistry> {
        static SHARED: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(build_registry())))
    }

    pub fn attribute(&self, tag: AttributeTag) -> Option<&AttributeDescriptor> {
        self.attributes.get(&tag)
    }

    /// Resolve an XML attribute name on a given entity type.
    pub fn attribute_by_name(
        &self,
        entity_type: EntityType,
        name: &str,
    ) -> Option<&AttributeDescriptor> {
        let tag = self.attributes_by_name.get(&entity_type)?.get(name)?;
        self.attributes.get(tag)
    }

    /// Attributes declared on `entity_type`, in tag order.
    pub fn attributes_of(
        &self,
        entity_type: EntityType,
    ) -> impl Iterator<Item = &AttributeDescriptor> + '_ {
        self.attributes
            .values()
            .filter(move |d| d.entity_type == entity_type)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> + '_ {
        self.attributes.values()
    }

    pub fn relationship(&self, from: EntityType, to: EntityType) -> Option<&RelationshipDescriptor> {
        self.relationships.get(&(from, to))
    }

    /// All descriptors whose `from` side is `from`, ordered by `to` type.
    pub fn relationships_from(
        &self,
        from: EntityType,
    ) -> impl Iterator<Item = &RelationshipDescriptor> + '_ {
        self.relationships
            .range((from, EntityType::Void)..=(from, EntityType::Illegal))
            .map(|(_, descriptor)| descriptor)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDescriptor> + '_ {
        self.relationships.values()
    }

    /// Resolve a child element name under `parent` through the containment
    /// table. Element names are only unique per parent (`profile`).
    pub fn child_entity_type(&self, parent: EntityType, name: &str) -> Option<EntityType> {
        self.relationships_from(parent)
            .filter(|d| d.kind == RelationshipKind::Contains)
            .map(|d| d.to)
            .find(|child| child.element_name() == Some(name))
    }
}
