//! Implementation of `qe parse`.

use std::process::ExitCode;

use qe_query::{Analyze, Lowercase, parse};

use crate::cli::{args::ParseCommand, context::CommandContext};

/// Prints the operator tree and canonical form of a query.
pub fn run(ctx: &mut CommandContext, cmd: &ParseCommand) -> ExitCode {
    if let Err(code) = ctx.override_model(cmd.model.as_deref()) {
        return code;
    }
    let model = match ctx.retrieval_model() {
        Ok(model) => model,
        Err(code) => return code,
    };

    let index = match &cmd.corpus {
        Some(corpus) => match ctx.load_index(corpus) {
            Ok(index) => Some(index),
            Err(code) => return code,
        },
        None => None,
    };
    let analyzer: &dyn Analyze = match &index {
        Some(index) => index,
        None => &Lowercase,
    };

    let dialect = model.dialect();
    match parse(&cmd.query, dialect, analyzer) {
        Ok(Some(node)) => {
            println!("Dialect: {dialect}");
            println!();
            print!("{node}");
            println!();
            println!("Query: {}", node.to_query_string());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("Dialect: {dialect}");
            println!();
            println!("(empty query)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
