//! Command-line interface for the `qe` query evaluator.
//!
//! `qe run` evaluates a file of structured queries against a JSON Lines
//! corpus and writes a TREC run, optionally expanding each query with
//! pseudo-relevance feedback. `qe parse` shows how a query is parsed, and
//! `qe config` prints the effective settings.

mod cli;

use std::{io, process::ExitCode};

use clap::Parser;
use cli::{
    CommandContext,
    args::{Cli, Commands},
    commands,
};
use tracing::Level;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match &cli.command {
        Commands::Run(cmd) => cmd.config.clone(),
        Commands::Parse(cmd) => cmd.config.clone(),
        Commands::Config(cmd) => cmd.config.clone(),
    };
    let mut ctx = match CommandContext::load(config_path.as_deref()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &mut ctx)
}

/// Installs the stderr log subscriber for the requested verbosity.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}
