use clap::{Parser, Subcommand, ValueEnum};
use sadm_flatten::FlattenStrategy;

#[derive(Parser)]
#[command(
    name = "sadm",
    about = "sadm: ADM entity ids, schema tables, graph validation and profile flattening",
    version
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode and decode entity ids
    Id {
        #[command(subcommand)]
        command: IdCommands,
    },

    /// Print the attribute and relationship tables
    Schema {
        /// Restrict to one entity type (snake_case name or id prefix, e.g. `AO`)
        #[arg(long = "type")]
        entity_type: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a graph snapshot against declared relationship arities
    Validate {
        /// Path to a graph snapshot (JSON)
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expand every programme of a graph snapshot into fixed mixes
    Flatten {
        /// Path to a graph snapshot (JSON)
        input: String,

        /// Write the flattened snapshot here instead of stdout
        #[arg(long)]
        output: Option<String>,

        /// Flattener config (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Override the configured strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Keep the source flow id even when programmes expand
        #[arg(long)]
        keep_flow_id: bool,

        /// Print the run report as JSON (only with --output)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum IdCommands {
    /// Decode an id string into its fields
    Decode {
        /// Canonical id (e.g. `AO_1001`) or raw `0x` hex
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose an id from its fields
    Encode {
        /// Id prefix (e.g. `APR`, `AP`, `AVS`) or snake_case type name
        #[arg(long = "type")]
        entity_type: String,

        /// `xw` number, frame number, or generic sequence
        #[arg(long, visible_alias = "seq")]
        sequence: u64,

        /// Audio type code for typed families (1..=5)
        #[arg(long)]
        audio_type: Option<u64>,

        /// Sub-sequence (`z`) for track formats, block formats and
        /// alternative value sets
        #[arg(long, default_value_t = 0)]
        sub: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    #[value(name = "emission")]
    Emission,
    #[value(name = "combinatorial")]
    Combinatorial,
}

impl From<StrategyArg> for FlattenStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Emission => FlattenStrategy::Emission,
            StrategyArg::Combinatorial => FlattenStrategy::Combinatorial,
        }
    }
}
