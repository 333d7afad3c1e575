//! sadm CLI: the `sadm` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands, IdCommands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Id { command } => match command {
            IdCommands::Decode { id, json } => commands::id::decode(id, json),
            IdCommands::Encode {
                entity_type,
                sequence,
                audio_type,
                sub,
                json,
            } => commands::id::encode(commands::id::EncodeArgs {
                entity_type,
                sequence,
                audio_type,
                sub,
                json,
            }),
        },

        Commands::Schema { entity_type, json } => commands::schema::run(entity_type, json),

        Commands::Validate { input, json } => commands::validate::run(input, json),

        Commands::Flatten {
            input,
            output,
            config,
            strategy,
            keep_flow_id,
            json,
        } => commands::flatten::run(commands::flatten::Args {
            input,
            output,
            config,
            strategy,
            keep_flow_id,
            json,
        }),
    }
}
