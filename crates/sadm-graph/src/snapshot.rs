//! JSON snapshots of a graph, built and replayed through the public
//! container operations only.
//!
//! Attribute values are stored in their text form keyed by XML attribute
//! name, the same way the XML collaborator sees them:
//!
//! ```json
//! {
//!   "entities": [
//!     { "id": "AO_1001", "status": "mutable", "attributes": { "audioObjectName": "Dialog" } }
//!   ],
//!   "relationships": [ { "from": "ACO_1001", "to": "AO_1001" } ]
//! }
//! ```

use sadm_id::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::container::GraphContainer;
use crate::entity::EntityStatus;
use crate::error::GraphError;
use crate::schema::SchemaRegistry;
use crate::value::AttributeValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// A forward (`contains` / `references`) edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipSnapshot {
    pub from: EntityId,
    pub to: EntityId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSnapshot>,
}

impl GraphSnapshot {
    /// Capture every entity and every forward edge of `graph`.
    pub fn capture(graph: &GraphContainer) -> Result<Self, GraphError> {
        let registry = graph.registry();
        let mut entities = Vec::with_capacity(graph.len());
        for record in graph.entities() {
            let mut attributes = BTreeMap::new();
            for (tag, value) in record.attributes() {
                let descriptor = registry
                    .attribute(tag)
                    .ok_or_else(|| GraphError::NotFound(format!("attribute descriptor {tag}")))?;
                attributes.insert(descriptor.name.to_string(), value.to_string());
            }
            entities.push(EntitySnapshot {
                id: record.id,
                status: record.status,
                attributes,
            });
        }
        let relationships = graph
            .relationships()
            .filter(|record| record.kind.is_forward())
            .map(|record| RelationshipSnapshot {
                from: record.from,
                to: record.to,
            })
            .collect();
        Ok(Self {
            entities,
            relationships,
        })
    }

    /// Rebuild a container: entities and values first, then edges, then
    /// lifecycle locks.
    pub fn restore(&self, registry: Arc<SchemaRegistry>) -> Result<GraphContainer, GraphError> {
        let mut graph = GraphContainer::new(registry);
        for entity in &self.entities {
            graph.add_entity(entity.id)?;
            for (name, text) in &entity.attributes {
                let entity_type = entity.id.entity_type();
                let descriptor = graph
                    .registry()
                    .attribute_by_name(entity_type, name)
                    .ok_or_else(|| {
                        GraphError::NotFound(format!("attribute {name:?} on {entity_type}"))
                    })?;
                let tag = descriptor.tag;
                let value = AttributeValue::parse(descriptor.value_type, text)?;
                graph.set_value(entity.id, tag, value)?;
            }
        }
        for edge in &self.relationships {
            graph.add_relationship(edge.from, edge.to)?;
        }
        for entity in &self.entities {
            match entity.status {
                EntityStatus::Immutable => graph.set_mutable(entity.id, false)?,
                EntityStatus::CommonDefinition => graph.set_is_common(entity.id)?,
                _ => {}
            }
        }
        Ok(graph)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
