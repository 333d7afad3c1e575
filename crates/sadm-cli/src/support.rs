use sadm_graph::{GraphContainer, GraphSnapshot, SchemaRegistry};
use sadm_id::EntityType;
use serde_json::Value;
use std::fs;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}

/// Accepts an id prefix (`AO`) or the snake_case type name (`object`).
pub fn parse_entity_type_or_exit(text: &str) -> EntityType {
    EntityType::ALL
        .into_iter()
        .find(|t| t.id_prefix() == Some(text) || t.as_str() == text)
        .unwrap_or_else(|| exit_with(format!("unknown entity type {text:?}")))
}

pub fn load_graph_or_exit(path: &str) -> GraphContainer {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with(format!("failed to read {path}: {e}")));
    let snapshot = GraphSnapshot::from_json(&text)
        .unwrap_or_else(|e| exit_with(format!("invalid snapshot json at {path}: {e}")));
    snapshot
        .restore(SchemaRegistry::shared())
        .unwrap_or_else(|e| exit_with(format!("failed to load {path}: {e}")))
}

/// Serialize `graph` to `path`, or to stdout when no path is given.
pub fn write_graph_or_exit(graph: &GraphContainer, path: Option<&str>) {
    let json = GraphSnapshot::capture(graph)
        .map_err(|e| e.to_string())
        .and_then(|snapshot| snapshot.to_json().map_err(|e| e.to_string()))
        .unwrap_or_else(|e| exit_with(format!("failed to serialize graph: {e}")));
    match path {
        Some(path) => fs::write(path, json + "\n")
            .unwrap_or_else(|e| exit_with(format!("failed to write {path}: {e}"))),
        None => println!("{json}"),
    }
}
