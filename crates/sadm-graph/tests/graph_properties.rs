//! Integration tests: container-level guarantees exercised through the
//! public surface only.

use sadm_graph::{
    AttributeTag, EntityStatus, ErrorKind, GraphContainer, GraphSnapshot, RelationshipKind,
    SchemaRegistry, build_registry,
};
use sadm_id::{EntityId, EntityType, parse_id_string};
use std::sync::Arc;

fn id(text: &str) -> EntityId {
    parse_id_string(text)
}

fn container() -> GraphContainer {
    GraphContainer::new(Arc::new(build_registry()))
}

#[test]
fn every_relationship_descriptor_has_a_swapped_inverse() {
    let registry = build_registry();
    for descriptor in registry.relationships() {
        let inverse = registry
            .relationship(descriptor.to, descriptor.from)
            .unwrap_or_else(|| panic!("no inverse for {} -> {}", descriptor.from, descriptor.to));
        assert_eq!(inverse.from, descriptor.to);
        assert_eq!(inverse.to, descriptor.from);
        if inverse.kind != descriptor.kind.inverse() {
            // declared in both directions
            assert!(
                descriptor.kind.is_forward() && inverse.kind.is_forward(),
                "{} -> {}: {} vs {}",
                descriptor.from,
                descriptor.to,
                descriptor.kind,
                inverse.kind
            );
        }
    }
}

#[test]
fn containment_is_single_parent_and_idempotent() {
    let mut graph = container();
    let first = id("AC_00011001");
    let second = id("AC_00011002");
    let block = id("AB_00011001_00000001");
    for entity in [first, second, block] {
        graph.add_entity(entity).expect("add");
    }

    graph.add_relationship(first, block).expect("contain");
    graph.add_relationship(first, block).expect("contain again");
    assert_eq!(graph.relationship_count(first, EntityType::BlockFormat), 1);

    let err = graph
        .add_relationship(second, block)
        .expect_err("second parent");
    assert_eq!(err.kind(), ErrorKind::InvalidRelationship);
    assert_eq!(graph.relationship_count(first, EntityType::BlockFormat), 1);
    assert_eq!(graph.container_of(block), Some(first));
}

#[test]
fn a_second_gain_is_not_unique() {
    let mut graph = container();
    let object = id("AO_1001");
    graph.add_entity(object).expect("object");
    let gain = graph.generic_id(EntityType::Gain).expect("gain id");
    graph
        .add_entity_with_relationship(object, gain)
        .expect("first gain");
    let other = graph.generic_id(EntityType::Gain).expect("gain id");
    let err = graph
        .add_entity_with_relationship(object, other)
        .expect_err("second gain");
    assert_eq!(err.kind(), ErrorKind::NotUnique);
}

#[test]
fn lifecycle_locks_writes() {
    let mut graph = container();
    let programme = id("APR_1001");
    graph.add_entity(programme).expect("programme");
    assert_eq!(graph.status(programme), Ok(EntityStatus::ForwardReference));

    graph
        .set_value(programme, AttributeTag::ProgrammeName, "Main")
        .expect("first write");
    assert_eq!(graph.status(programme), Ok(EntityStatus::Mutable));

    graph.set_mutable(programme, false).expect("lock");
    assert!(graph
        .set_value(programme, AttributeTag::ProgrammeName, "Other")
        .is_err());

    graph.set_mutable(programme, true).expect("unlock");
    graph.set_is_common(programme).expect("common");
    assert!(graph
        .set_value(programme, AttributeTag::ProgrammeName, "Other")
        .is_err());
}

#[test]
fn mismatched_values_are_rejected_before_storage() {
    let mut graph = container();
    let object = id("AO_1001");
    graph.add_entity(object).expect("object");
    let err = graph
        .set_value(object, AttributeTag::ObjectName, 12u32)
        .expect_err("uint for string");
    assert_eq!(err.kind(), ErrorKind::ValueTypeMismatch);
    assert_eq!(graph.status(object), Ok(EntityStatus::ForwardReference));
}

#[test]
fn visitors_stop_on_the_first_error() {
    let mut graph = container();
    let content = id("ACO_1001");
    graph.add_entity(content).expect("content");
    for object in ["AO_1001", "AO_1002", "AO_1003"] {
        graph.add_entity(id(object)).expect("object");
        graph.add_relationship(content, id(object)).expect("reference");
    }

    let mut visited = Vec::new();
    let result = graph.for_each_relationship_of_kind(
        content,
        RelationshipKind::References,
        |record| {
            visited.push(record.to);
            if record.to == id("AO_1002") {
                return Err(sadm_graph::GraphError::NotFound("stop".to_string()));
            }
            Ok(())
        },
        None::<fn(&sadm_graph::RelationshipRecord) -> bool>,
    );
    assert!(result.is_err());
    assert_eq!(visited, [id("AO_1001"), id("AO_1002")]);
}

#[test]
fn snapshots_restore_into_equal_graphs() {
    let mut graph = container();
    let programme = id("APR_1001");
    let content = id("ACO_1001");
    graph.add_entity(programme).expect("programme");
    graph.add_entity(content).expect("content");
    graph
        .set_value(programme, AttributeTag::ProgrammeName, "Main")
        .expect("name");
    graph.add_relationship(programme, content).expect("reference");
    graph.set_is_common(content).expect("common");

    let snapshot = GraphSnapshot::capture(&graph).expect("capture");
    let json = snapshot.to_json().expect("serialize");
    let restored = GraphSnapshot::from_json(&json)
        .expect("parse")
        .restore(SchemaRegistry::shared())
        .expect("restore");

    assert_eq!(GraphSnapshot::capture(&restored).expect("capture"), snapshot);
}
