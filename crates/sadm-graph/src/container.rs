//! The graph container: entity and relationship stores validated against one
//! shared schema registry, plus id minting.

use sadm_id::{EntityId, EntityType};
use std::sync::Arc;
use tracing::debug;

use crate::arity::{ArityReport, check_arity};
use crate::entity::{EntityRecord, EntityStatus, EntityStore};
use crate::error::GraphError;
use crate::relationship::{RelationshipRecord, RelationshipStore};
use crate::schema::{AttributeTag, RelationshipKind, SchemaRegistry};
use crate::sequence::SequenceMap;
use crate::value::AttributeValue;

/// One ADM graph.
///
/// Every container holds the top-level root entity from construction on.
/// Ids handed out by [`GraphContainer::generic_id`] and
/// [`GraphContainer::next_subcomponent_id`] never collide with entities
/// already in the container.
#[derive(Debug, Clone)]
pub struct GraphContainer {
    registry: Arc<SchemaRegistry>,
    entities: EntityStore,
    relationships: RelationshipStore,
    sequences: SequenceMap,
}

impl Default for GraphContainer {
    fn default() -> Self {
        Self::new(SchemaRegistry::shared())
    }
}

impl GraphContainer {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let root = EntityId::top_level();
        let mut sequences = SequenceMap::new();
        sequences.observe(root);
        Self {
            registry,
            entities: EntityStore::with_root(root),
            relationships: RelationshipStore::new(),
            sequences,
        }
    }

    /// Empty container whose counters start past every sequence used in
    /// `source`, so ids minted here never collide with ids copied from it.
    pub fn seeded_from(registry: Arc<SchemaRegistry>, source: &GraphContainer) -> Self {
        let mut container = Self::new(registry);
        for record in source.entities.records() {
            container.sequences.observe(record.id);
        }
        container
    }

    /// Recompute counters from the entities currently present.
    pub fn reseed_sequences(&mut self) {
        self.sequences.clear();
        for record in self.entities.records() {
            self.sequences.observe(record.id);
        }
    }

    /// Drop every entity except a fresh root and reset all counters.
    pub fn clear(&mut self) {
        let root = EntityId::top_level();
        self.entities = EntityStore::with_root(root);
        self.relationships.clear();
        self.sequences.clear();
        self.sequences.observe(root);
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    /// The fixed well-known root id.
    pub fn top_level_id(&self) -> EntityId {
        EntityId::top_level()
    }

    pub fn add_entity(&mut self, id: EntityId) -> Result<(), GraphError> {
        self.entities.add(id)?;
        self.sequences.observe(id);
        Ok(())
    }

    /// Add the schema relationship from `from` to `to`; both must exist.
    pub fn add_relationship(&mut self, from: EntityId, to: EntityId) -> Result<(), GraphError> {
        for id in [from, to] {
            if !self.entities.contains(id) {
                return Err(GraphError::NotFound(format!("entity {id}")));
            }
        }
        self.relationships.add(&self.registry, from, to)
    }

    /// Add `child` and relate it to the existing `parent` in one step.
    pub fn add_entity_with_relationship(
        &mut self,
        parent: EntityId,
        child: EntityId,
    ) -> Result<(), GraphError> {
        if !self.entities.contains(parent) {
            return Err(GraphError::NotFound(format!("entity {parent}")));
        }
        self.add_entity(child)?;
        self.relationships.add(&self.registry, parent, child)
    }

    pub fn remove_relationship(&mut self, from: EntityId, to: EntityId) -> Result<bool, GraphError> {
        self.relationships.remove(&self.registry, from, to)
    }

    /// Remove an entity and every edge touching it. The root cannot be
    /// removed.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<EntityRecord, GraphError> {
        if id == self.top_level_id() {
            return Err(GraphError::InvalidArgument(
                "the top-level entity cannot be removed".to_string(),
            ));
        }
        let record = self
            .entities
            .remove(id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        let edges = self.relationships.remove_entity(id);
        debug!(%id, edges, "entity removed");
        Ok(record)
    }

    pub fn set_value(
        &mut self,
        id: EntityId,
        tag: AttributeTag,
        value: impl Into<AttributeValue>,
    ) -> Result<(), GraphError> {
        self.entities
            .set_value(&self.registry, id, tag, value.into())
    }

    pub fn get_value(&self, id: EntityId, tag: AttributeTag) -> Result<&AttributeValue, GraphError> {
        self.entities.get_value(&self.registry, id, tag)
    }

    /// Like [`GraphContainer::get_value`], but a missing value is `None`
    /// rather than `NotFound`.
    pub fn value(&self, id: EntityId, tag: AttributeTag) -> Result<Option<&AttributeValue>, GraphError> {
        match self.get_value(id, tag) {
            Ok(value) => Ok(Some(value)),
            Err(GraphError::NotFound(_)) if self.entities.contains(id) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn set_mutable(&mut self, id: EntityId, mutable: bool) -> Result<(), GraphError> {
        self.entities.set_mutable(id, mutable)
    }

    pub fn set_is_common(&mut self, id: EntityId) -> Result<(), GraphError> {
        self.entities.set_is_common(id)
    }

    pub fn status(&self, id: EntityId) -> Result<EntityStatus, GraphError> {
        self.entities
            .get(id)
            .map(|record| record.status)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(id)
    }

    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    pub fn entity_count(&self, entity_type: EntityType) -> usize {
        self.entities.records_of(entity_type).count()
    }

    /// Total number of records, the root included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.entities.records()
    }

    pub fn entities_of(&self, entity_type: EntityType) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.entities.records_of(entity_type)
    }

    pub fn for_each_entity<F, P>(
        &self,
        entity_type: EntityType,
        visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&EntityRecord) -> Result<(), GraphError>,
        P: Fn(&EntityRecord) -> bool,
    {
        self.entities.for_each(entity_type, visit, filter)
    }

    pub fn for_each_attribute<F>(&self, id: EntityId, visit: F) -> Result<(), GraphError>
    where
        F: FnMut(AttributeTag, &AttributeValue) -> Result<(), GraphError>,
    {
        self.entities.for_each_attribute(id, visit)
    }

    pub fn for_each_relationship<F>(&self, visit: F) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
    {
        self.relationships.for_each(visit)
    }

    pub fn for_each_relationship_of_kind<F, P>(
        &self,
        id: EntityId,
        kind: RelationshipKind,
        visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
        P: Fn(&RelationshipRecord) -> bool,
    {
        self.relationships.for_each_kind(id, kind, visit, filter)
    }

    pub fn for_each_relationship_to_type<F, P>(
        &self,
        id: EntityId,
        entity_type: EntityType,
        visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
        P: Fn(&RelationshipRecord) -> bool,
    {
        self.relationships
            .for_each_type(&self.registry, id, entity_type, visit, filter)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipRecord> + '_ {
        self.relationships.iter()
    }

    pub fn relationship_exists(&self, from: EntityId, to: EntityId) -> bool {
        self.relationships.exists(&self.registry, from, to)
    }

    pub fn relationship_exists_to_type(&self, id: EntityId, entity_type: EntityType) -> bool {
        self.relationships.exists_type(&self.registry, id, entity_type)
    }

    pub fn relationship_count(&self, id: EntityId, entity_type: EntityType) -> usize {
        self.relationships.count(&self.registry, id, entity_type)
    }

    /// Ids related to `id` by edges of `kind`, in index order.
    pub fn related(&self, id: EntityId, kind: RelationshipKind) -> impl Iterator<Item = EntityId> + '_ {
        self.relationships.related(id, kind).map(|record| record.to)
    }

    /// Ids of type `entity_type` related to `id`, whatever the kind.
    pub fn related_of_type(
        &self,
        id: EntityId,
        entity_type: EntityType,
    ) -> impl Iterator<Item = EntityId> + '_ {
        self.registry
            .relationship(id.entity_type(), entity_type)
            .map(|descriptor| {
                self.relationships
                    .related_of_type(id, descriptor.kind, entity_type)
            })
            .into_iter()
            .flatten()
            .map(|record| record.to)
    }

    /// The entity containing `id`.
    pub fn container_of(&self, id: EntityId) -> Option<EntityId> {
        self.relationships.container_of(id)
    }

    /// Mint a fresh id for a generic or single-number ADM type.
    pub fn generic_id(&mut self, entity_type: EntityType) -> Result<EntityId, GraphError> {
        let entities = &self.entities;
        self.sequences
            .mint(entity_type, |candidate| entities.contains(candidate))
    }

    /// Mint a fresh block format (from a channel format) or alternative
    /// value set (from an object).
    pub fn next_subcomponent_id(&mut self, parent: EntityId) -> Result<EntityId, GraphError> {
        let entities = &self.entities;
        self.sequences
            .mint_subcomponent(parent, |candidate| entities.contains(candidate))
    }

    /// Never mint a sequence below `floor` for `entity_type`.
    pub fn raise_sequence_floor(&mut self, entity_type: EntityType, floor: u64) {
        self.sequences.raise_floor(entity_type, floor);
    }

    /// Check every entity's outgoing edges against declared minimum and
    /// maximum arities.
    pub fn validate_arity(&self) -> ArityReport {
        check_arity(&self.registry, &self.entities, &self.relationships)
    }
}
