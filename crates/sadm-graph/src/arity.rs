//! Arity validation over a populated graph.

use sadm_id::{EntityId, EntityType};
use serde::Serialize;
use std::fmt;

use crate::entity::EntityStore;
use crate::relationship::RelationshipStore;
use crate::schema::{Arity, RelationshipKind, SchemaRegistry};

/// One entity whose outgoing edge count to a type is outside the declared
/// arity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArityViolation {
    pub entity: EntityId,
    pub kind: RelationshipKind,
    pub to_type: EntityType,
    pub arity: Arity,
    pub count: usize,
}

impl fmt::Display for ArityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} (allowed {})",
            self.entity, self.kind, self.count, self.to_type, self.arity
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArityReport {
    pub entities_checked: usize,
    pub violations: Vec<ArityViolation>,
}

impl ArityReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Every forward descriptor of every entity's type is checked; inverse
/// descriptors carry the forward arity and are skipped.
pub(crate) fn check_arity(
    registry: &SchemaRegistry,
    entities: &EntityStore,
    relationships: &RelationshipStore,
) -> ArityReport {
    let mut report = ArityReport::default();
    for record in entities.records() {
        report.entities_checked += 1;
        for descriptor in registry.relationships_from(record.entity_type()) {
            if !descriptor.kind.is_forward() {
                continue;
            }
            let count = relationships
                .related_of_type(record.id, descriptor.kind, descriptor.to)
                .count();
            if !descriptor.arity.admits(count) {
                report.violations.push(ArityViolation {
                    entity: record.id,
                    kind: descriptor.kind,
                    to_type: descriptor.to,
                    arity: descriptor.arity,
                    count,
                });
            }
        }
    }
    report
}
