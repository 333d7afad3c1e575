use crate::cli::StrategyArg;
use crate::support::{exit_with, load_graph_or_exit, print_json, write_graph_or_exit};
use sadm_flatten::{FlattenConfig, ProfileFlattener};
use serde_json::json;

pub struct Args {
    pub input: String,
    pub output: Option<String>,
    pub config: Option<String>,
    pub strategy: Option<StrategyArg>,
    pub keep_flow_id: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut config = match &args.config {
        Some(path) => FlattenConfig::from_path(path).unwrap_or_else(|e| exit_with(e)),
        None => FlattenConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    if args.keep_flow_id {
        config.regenerate_flow_id = false;
    }

    let source = load_graph_or_exit(&args.input);
    let flattened = ProfileFlattener::new(config)
        .flatten(&source)
        .unwrap_or_else(|e| exit_with(e));
    write_graph_or_exit(&flattened.graph, args.output.as_deref());

    // without --output, stdout carries the snapshot itself
    let Some(output) = args.output else {
        return;
    };
    let report = &flattened.report;
    if args.json {
        let payload = json!({
            "input": args.input,
            "output": output,
            "report": serde_json::to_value(report).expect("json serialization"),
        });
        print_json(&payload);
    } else {
        println!("sadm flatten {}", args.input);
        println!("  Strategy: {}", report.strategy);
        println!(
            "  Programmes: {} -> {}",
            report.programmes_in, report.programmes_out
        );
        println!(
            "  Flow id regenerated: {}",
            if report.flow_id_regenerated { "yes" } else { "no" }
        );
        println!("  Output: {output}");
    }
}
