//! Entity records, their attribute maps, and the lifecycle state machine.

use sadm_id::{EntityId, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::GraphError;
use crate::schema::{AttributeDescriptor, AttributeTag, SchemaRegistry};
use crate::value::AttributeValue;

/// Lifecycle of an entity record, in transition order.
///
/// ```text
/// Uninitialized -> ForwardReference -> Mutable <-> Immutable -> CommonDefinition
/// ```
///
/// `Destroyed` is only ever observed on a record removed from its store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Uninitialized,
    ForwardReference,
    Mutable,
    Immutable,
    CommonDefinition,
    Destroyed,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Uninitialized => "uninitialized",
            EntityStatus::ForwardReference => "forward_reference",
            EntityStatus::Mutable => "mutable",
            EntityStatus::Immutable => "immutable",
            EntityStatus::CommonDefinition => "common_definition",
            EntityStatus::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity: id, lifecycle state and its attribute values in tag order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub status: EntityStatus,
    attributes: BTreeMap<AttributeTag, AttributeValue>,
}

impl EntityRecord {
    fn new(id: EntityId) -> Self {
        Self {
            id,
            status: EntityStatus::ForwardReference,
            attributes: BTreeMap::new(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.id.entity_type()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (AttributeTag, &AttributeValue)> + '_ {
        self.attributes.iter().map(|(tag, value)| (*tag, value))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

/// Entity records keyed by id.
///
/// Every attribute read and write is validated against the schema registry:
/// the tag must be declared, declared on the entity's type, and (for writes)
/// match the declared value type.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    records: BTreeMap<EntityId, EntityRecord>,
}

fn check_descriptor<'r>(
    registry: &'r SchemaRegistry,
    id: EntityId,
    tag: AttributeTag,
) -> Result<&'r AttributeDescriptor, GraphError> {
    let descriptor = registry
        .attribute(tag)
        .ok_or_else(|| GraphError::NotFound(format!("attribute descriptor {tag}")))?;
    if descriptor.entity_type != id.entity_type() {
        return Err(GraphError::InvalidArgument(format!(
            "attribute {tag} belongs to {}, not {} ({id})",
            descriptor.entity_type,
            id.entity_type()
        )));
    }
    Ok(descriptor)
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    /// Insert `id` at `ForwardReference`. Adding an existing id is a no-op.
    pub fn add(&mut self, id: EntityId) -> Result<(), GraphError> {
        if id.is_null() {
            return Err(GraphError::InvalidArgument("null entity id".to_string()));
        }
        if matches!(id.entity_type(), EntityType::Illegal | EntityType::Void) {
            return Err(GraphError::InvalidArgument(format!(
                "id {id} has no entity type"
            )));
        }
        self.records
            .entry(id)
            .or_insert_with(|| EntityRecord::new(id));
        Ok(())
    }

    /// Store with a single `ForwardReference` record for `root`.
    pub(crate) fn with_root(root: EntityId) -> Self {
        let mut records = BTreeMap::new();
        records.insert(root, EntityRecord::new(root));
        Self { records }
    }

    /// Remove a record, returning it in the `Destroyed` state.
    pub fn remove(&mut self, id: EntityId) -> Option<EntityRecord> {
        let mut record = self.records.remove(&id)?;
        record.status = EntityStatus::Destroyed;
        Some(record)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn set_value(
        &mut self,
        registry: &SchemaRegistry,
        id: EntityId,
        tag: AttributeTag,
        value: AttributeValue,
    ) -> Result<(), GraphError> {
        let descriptor = check_descriptor(registry, id, tag)?;
        if descriptor.value_type != value.value_type() {
            return Err(GraphError::ValueTypeMismatch {
                tag,
                expected: descriptor.value_type,
                actual: value.value_type(),
            });
        }
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        match record.status {
            EntityStatus::ForwardReference => record.status = EntityStatus::Mutable,
            EntityStatus::Mutable => {}
            status => {
                return Err(GraphError::Invariant(format!(
                    "cannot write {tag} on {id} in state {status}"
                )));
            }
        }
        record.attributes.insert(tag, value);
        Ok(())
    }

    pub fn get_value(
        &self,
        registry: &SchemaRegistry,
        id: EntityId,
        tag: AttributeTag,
    ) -> Result<&AttributeValue, GraphError> {
        check_descriptor(registry, id, tag)?;
        let record = self
            .records
            .get(&id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        if matches!(
            record.status,
            EntityStatus::Uninitialized | EntityStatus::Destroyed
        ) {
            return Err(GraphError::Invariant(format!(
                "cannot read {tag} on {id} in state {}",
                record.status
            )));
        }
        record
            .attributes
            .get(&tag)
            .ok_or_else(|| GraphError::NotFound(format!("{tag} on {id}")))
    }

    /// Lock (`false`) or unlock (`true`) a record for attribute writes.
    pub fn set_mutable(&mut self, id: EntityId, mutable: bool) -> Result<(), GraphError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        let next = match (record.status, mutable) {
            (EntityStatus::Immutable, true) => EntityStatus::Mutable,
            (status @ (EntityStatus::ForwardReference | EntityStatus::Mutable), true) => status,
            (EntityStatus::ForwardReference | EntityStatus::Mutable, false) => {
                EntityStatus::Immutable
            }
            (EntityStatus::Immutable, false) => EntityStatus::Immutable,
            (status, _) => {
                return Err(GraphError::Invariant(format!(
                    "cannot set mutable={mutable} on {id} in state {status}"
                )));
            }
        };
        record.status = next;
        Ok(())
    }

    /// One-way promotion to `CommonDefinition`.
    pub fn set_is_common(&mut self, id: EntityId) -> Result<(), GraphError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        match record.status {
            EntityStatus::CommonDefinition => {}
            EntityStatus::ForwardReference | EntityStatus::Mutable | EntityStatus::Immutable => {
                record.status = EntityStatus::CommonDefinition;
            }
            status => {
                return Err(GraphError::Invariant(format!(
                    "cannot mark {id} common in state {status}"
                )));
            }
        }
        Ok(())
    }

    /// Records of one entity type in id order.
    pub fn records_of(&self, entity_type: EntityType) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.records
            .range(EntityId::type_floor(entity_type)..=EntityId::type_ceiling(entity_type))
            .map(|(_, record)| record)
    }

    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.records.values()
    }

    /// Visit records of `entity_type` that pass `filter`, stopping at the
    /// first error returned by `visit`.
    pub fn for_each<F, P>(
        &self,
        entity_type: EntityType,
        mut visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&EntityRecord) -> Result<(), GraphError>,
        P: Fn(&EntityRecord) -> bool,
    {
        self.records_of(entity_type)
            .filter(|record| filter.as_ref().is_none_or(|keep| keep(record)))
            .try_for_each(|record| visit(record))
    }

    /// Visit `(tag, value)` pairs of one entity in tag order.
    pub fn for_each_attribute<F>(&self, id: EntityId, mut visit: F) -> Result<(), GraphError>
    where
        F: FnMut(AttributeTag, &AttributeValue) -> Result<(), GraphError>,
    {
        let record = self
            .records
            .get(&id)
            .ok_or_else(|| GraphError::NotFound(format!("entity {id}")))?;
        record
            .attributes
            .iter()
            .try_for_each(|(tag, value)| visit(*tag, value))
    }
}
