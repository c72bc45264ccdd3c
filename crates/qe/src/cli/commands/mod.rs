//! Command implementations and dispatch.

pub mod config;
pub mod parse;
pub mod run;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &mut CommandContext) -> ExitCode {
    match command {
        Commands::Run(cmd) => run::run(ctx, &cmd),
        Commands::Parse(cmd) => parse::run(ctx, &cmd),
        Commands::Config(_) => config::run(ctx),
    }
}
