//! Directed typed edges, always stored together with their inverse.

use sadm_id::{EntityId, EntityType};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::GraphError;
use crate::schema::{RelationshipDescriptor, RelationshipKind, SchemaRegistry};

/// One directed edge. Field order is the index order:
/// `(from, kind, to_type, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RelationshipRecord {
    pub from: EntityId,
    pub kind: RelationshipKind,
    pub to_type: EntityType,
    pub to: EntityId,
}

impl RelationshipRecord {
    pub fn new(from: EntityId, kind: RelationshipKind, to: EntityId) -> Self {
        Self {
            from,
            kind,
            to_type: to.entity_type(),
            to,
        }
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.to, self.kind.inverse(), self.from)
    }

    fn range_floor(from: EntityId, kind: RelationshipKind, to_type: EntityType) -> Self {
        Self {
            from,
            kind,
            to_type,
            to: EntityId::NULL,
        }
    }

    fn range_ceiling(from: EntityId, kind: RelationshipKind, to_type: EntityType) -> Self {
        Self {
            from,
            kind,
            to_type,
            to: EntityId::from_raw(u64::MAX),
        }
    }
}

/// Edge set ordered by `(from, kind, to_type, to)`; every query is an exact
/// probe or a prefix range over that order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    edges: BTreeSet<RelationshipRecord>,
}

fn descriptor_for<'r>(
    registry: &'r SchemaRegistry,
    from: EntityId,
    to: EntityId,
) -> Result<&'r RelationshipDescriptor, GraphError> {
    registry
        .relationship(from.entity_type(), to.entity_type())
        .ok_or_else(|| {
            GraphError::invalid_relationship(
                from,
                to,
                format!(
                    "no relationship between {} and {}",
                    from.entity_type(),
                    to.entity_type()
                ),
            )
        })
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Insert the schema relationship between `from` and `to` plus its
    /// inverse.
    ///
    /// Pairs given in inverse order (child before parent) are normalized to
    /// the declared direction first. Re-adding an existing containment or
    /// reference is a no-op; containing an entity that already has another
    /// container fails, as does exceeding the declared maximum arity.
    pub fn add(
        &mut self,
        registry: &SchemaRegistry,
        from: EntityId,
        to: EntityId,
    ) -> Result<(), GraphError> {
        let descriptor = descriptor_for(registry, from, to)?;
        let (from, to, descriptor) = if descriptor.kind.is_forward() {
            (from, to, descriptor)
        } else {
            (to, from, descriptor_for(registry, to, from)?)
        };
        let kind = descriptor.kind;

        match kind {
            RelationshipKind::Contains => {
                if let Some(parent) = self.container_of(to) {
                    if parent == from {
                        return Ok(());
                    }
                    return Err(GraphError::invalid_relationship(
                        from,
                        to,
                        format!("{to} is already contained by {parent}"),
                    ));
                }
            }
            RelationshipKind::References => {
                if self.edges.contains(&RelationshipRecord::new(from, kind, to)) {
                    return Ok(());
                }
            }
            other => {
                return Err(GraphError::Invariant(format!(
                    "declared relationship {} -> {} has inverse kind {other}",
                    descriptor.from, descriptor.to
                )));
            }
        }

        if let Some(max) = descriptor.arity.max {
            let present = self.related_of_type(from, kind, to.entity_type()).count();
            if present >= max as usize {
                let message = format!(
                    "{from} already {kind} {present} {} (arity {})",
                    to.entity_type(),
                    descriptor.arity
                );
                return Err(if max == 1 {
                    GraphError::NotUnique(message)
                } else {
                    GraphError::invalid_relationship(from, to, message)
                });
            }
        }

        let forward = RelationshipRecord::new(from, kind, to);
        let inverse = forward.inverse();
        if !self.edges.insert(forward) {
            return Err(GraphError::Invariant(format!(
                "edge {from} {kind} {to} present without its guard"
            )));
        }
        if !self.edges.insert(inverse) {
            self.edges.remove(&forward);
            return Err(GraphError::Invariant(format!(
                "inverse edge {to} {} {from} already present; rolled back",
                inverse.kind
            )));
        }
        debug!(%from, %to, %kind, "relationship added");
        Ok(())
    }

    /// Remove the edge between `from` and `to` together with its inverse.
    /// Returns whether anything was removed.
    pub fn remove(
        &mut self,
        registry: &SchemaRegistry,
        from: EntityId,
        to: EntityId,
    ) -> Result<bool, GraphError> {
        let Some(record) = self.get(registry, from, to)? else {
            return Ok(false);
        };
        self.edges.remove(&record);
        self.edges.remove(&record.inverse());
        Ok(true)
    }

    /// Drop every edge touching `id`, in both directions.
    pub fn remove_entity(&mut self, id: EntityId) -> usize {
        let outgoing: Vec<RelationshipRecord> = self.from(id).copied().collect();
        for record in &outgoing {
            self.edges.remove(record);
            self.edges.remove(&record.inverse());
        }
        outgoing.len()
    }

    /// The edge from `from` to `to`, resolved through the schema.
    pub fn get(
        &self,
        registry: &SchemaRegistry,
        from: EntityId,
        to: EntityId,
    ) -> Result<Option<RelationshipRecord>, GraphError> {
        let kind = descriptor_for(registry, from, to)?.kind;
        let record = RelationshipRecord::new(from, kind, to);
        Ok(self.edges.get(&record).copied())
    }

    pub fn exists(&self, registry: &SchemaRegistry, from: EntityId, to: EntityId) -> bool {
        matches!(self.get(registry, from, to), Ok(Some(_)))
    }

    /// Whether `id` has any edge to an entity of `entity_type`.
    pub fn exists_type(
        &self,
        registry: &SchemaRegistry,
        id: EntityId,
        entity_type: EntityType,
    ) -> bool {
        self.count(registry, id, entity_type) > 0
    }

    /// Number of edges from `id` to entities of `entity_type`, using the
    /// schema's relationship kind for that pair.
    pub fn count(&self, registry: &SchemaRegistry, id: EntityId, entity_type: EntityType) -> usize {
        match registry.relationship(id.entity_type(), entity_type) {
            Some(descriptor) => self.related_of_type(id, descriptor.kind, entity_type).count(),
            None => 0,
        }
    }

    /// The entity containing `id`, if any.
    pub fn container_of(&self, id: EntityId) -> Option<EntityId> {
        self.related(id, RelationshipKind::ContainedBy)
            .next()
            .map(|record| record.to)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationshipRecord> + '_ {
        self.edges.iter()
    }

    /// Every edge whose `from` side is `id`.
    pub fn from(&self, id: EntityId) -> impl Iterator<Item = &RelationshipRecord> + '_ {
        self.edges.range(
            RelationshipRecord::range_floor(id, RelationshipKind::Contains, EntityType::Void)
                ..=RelationshipRecord::range_ceiling(
                    id,
                    RelationshipKind::ReferencedBy,
                    EntityType::Illegal,
                ),
        )
    }

    /// Edges of one kind from `id`.
    pub fn related(
        &self,
        id: EntityId,
        kind: RelationshipKind,
    ) -> impl Iterator<Item = &RelationshipRecord> + '_ {
        self.edges.range(
            RelationshipRecord::range_floor(id, kind, EntityType::Void)
                ..=RelationshipRecord::range_ceiling(id, kind, EntityType::Illegal),
        )
    }

    /// Edges of one kind from `id` to entities of `to_type`.
    pub fn related_of_type(
        &self,
        id: EntityId,
        kind: RelationshipKind,
        to_type: EntityType,
    ) -> impl Iterator<Item = &RelationshipRecord> + '_ {
        self.edges.range(
            RelationshipRecord::range_floor(id, kind, to_type)
                ..=RelationshipRecord::range_ceiling(id, kind, to_type),
        )
    }

    /// Visit every edge, stopping at the first error.
    pub fn for_each<F>(&self, visit: F) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
    {
        self.edges.iter().try_for_each(visit)
    }

    /// Visit edges of `kind` from `id` that pass `filter`.
    pub fn for_each_kind<F, P>(
        &self,
        id: EntityId,
        kind: RelationshipKind,
        mut visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
        P: Fn(&RelationshipRecord) -> bool,
    {
        self.related(id, kind)
            .filter(|record| filter.as_ref().is_none_or(|keep| keep(record)))
            .try_for_each(|record| visit(record))
    }

    /// Visit edges from `id` to entities of `entity_type`; the kind comes
    /// from the schema entry for that pair.
    pub fn for_each_type<F, P>(
        &self,
        registry: &SchemaRegistry,
        id: EntityId,
        entity_type: EntityType,
        mut visit: F,
        filter: Option<P>,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&RelationshipRecord) -> Result<(), GraphError>,
        P: Fn(&RelationshipRecord) -> bool,
    {
        let descriptor = registry
            .relationship(id.entity_type(), entity_type)
            .ok_or_else(|| {
                GraphError::NotFound(format!(
                    "relationship descriptor {} -> {entity_type}",
                    id.entity_type()
                ))
            })?;
        self.related_of_type(id, descriptor.kind, entity_type)
            .filter(|record| filter.as_ref().is_none_or(|keep| keep(record)))
            .try_for_each(|record| visit(record))
    }
}
