use crate::support::{load_graph_or_exit, print_json};
use serde_json::json;

pub fn run(input: String, json_output: bool) {
    let graph = load_graph_or_exit(&input);
    let report = graph.validate_arity();
    let violations: Vec<String> = report.violations.iter().map(ToString::to_string).collect();

    if json_output {
        let payload = json!({
            "input": input,
            "entity_count": graph.len(),
            "relationship_count": graph.relationships().filter(|r| r.kind.is_forward()).count(),
            "entities_checked": report.entities_checked,
            "valid": report.is_valid(),
            "violations": violations,
        });
        print_json(&payload);
    } else {
        println!("sadm validate {input}");
        println!("  Entities: {}", graph.len());
        println!("  Valid: {}", if report.is_valid() { "yes" } else { "no" });
        for violation in &violations {
            println!("  - {violation}");
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
}
