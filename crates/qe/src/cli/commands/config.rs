//! Implementation of `qe config`.

use std::process::ExitCode;

use crate::cli::context::CommandContext;

/// Shows effective configuration settings and any warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config = &ctx.config;
    match &config.source {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no configuration file)"),
    }

    match config.settings_to_toml() {
        Ok(toml) => print!("{toml}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let warnings = config.validate();
    if !warnings.is_empty() {
        eprintln!();
        eprintln!("Warnings ({}):", warnings.len());
        for warning in &warnings {
            eprintln!("  - {warning}");
        }
    }

    ExitCode::SUCCESS
}
