use crate::support::{parse_entity_type_or_exit, print_json};
use sadm_graph::{AttributeDescriptor, RelationshipDescriptor, SchemaRegistry};
use serde_json::json;

pub fn run(entity_type: Option<String>, json_output: bool) {
    let registry = SchemaRegistry::shared();
    let filter = entity_type.as_deref().map(parse_entity_type_or_exit);

    let attributes: Vec<&AttributeDescriptor> = match filter {
        Some(t) => registry.attributes_of(t).collect(),
        None => registry.attributes().collect(),
    };
    let relationships: Vec<&RelationshipDescriptor> = match filter {
        Some(t) => registry.relationships_from(t).collect(),
        None => registry.relationships().collect(),
    };

    if json_output {
        let payload = json!({
            "entity_type": filter.map(|t| t.as_str()),
            "attribute_count": attributes.len(),
            "relationship_count": relationships.len(),
            "attributes": attributes
                .iter()
                .map(|d| json!({
                    "entity_type": d.entity_type.as_str(),
                    "name": d.name,
                    "value_type": d.value_type.as_str(),
                }))
                .collect::<Vec<_>>(),
            "relationships": relationships
                .iter()
                .map(|d| json!({
                    "from": d.from.as_str(),
                    "to": d.to.as_str(),
                    "kind": d.kind.as_str(),
                    "arity": d.arity.to_string(),
                }))
                .collect::<Vec<_>>(),
        });
        print_json(&payload);
        return;
    }

    println!("Attributes ({}):", attributes.len());
    for d in &attributes {
        println!("  {}.{}: {}", d.entity_type, d.name, d.value_type.as_str());
    }
    println!("Relationships ({}):", relationships.len());
    for d in &relationships {
        println!("  {} {} {} {}", d.from, d.kind, d.to, d.arity);
    }
}
