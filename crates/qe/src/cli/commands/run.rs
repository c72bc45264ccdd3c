//! Implementation of `qe run`.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
    process::ExitCode,
};

use qe_config::FeedbackSettings;
use qe_eval::{
    BatchOptions, BatchSummary, FeedbackParams, InitialRanking, QueryEngine, parse_queries,
    run_batch,
};
use qe_index::MemoryIndex;
use tracing::info;

use crate::cli::{
    args::{FeedbackArgs, RunCommand},
    context::CommandContext,
};

/// Evaluates a query file and writes the run.
pub fn run(ctx: &mut CommandContext, cmd: &RunCommand) -> ExitCode {
    match execute(ctx, cmd) {
        Ok(summary) => report(&summary),
        Err(code) => code,
    }
}

/// Runs the batch, returning its summary.
fn execute(ctx: &mut CommandContext, cmd: &RunCommand) -> Result<BatchSummary, ExitCode> {
    ctx.override_model(cmd.model.as_deref())?;
    apply_overrides(&mut ctx.config.feedback, &cmd.feedback);
    if let Some(run_id) = &cmd.run_id {
        ctx.config.output.run_id.clone_from(run_id);
    }
    if let Some(limit) = cmd.limit {
        ctx.config.output.limit = limit;
    }

    let model = ctx.retrieval_model()?;
    let feedback = feedback_params(&ctx.config.feedback)?;
    let index = ctx.load_index(&cmd.corpus)?;
    info!(target: "qe::batch", model = %model, "loaded index");

    let content = fs::read_to_string(&cmd.queries).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", cmd.queries.display());
        ExitCode::FAILURE
    })?;
    let queries = parse_queries(&content).map_err(|e| {
        eprintln!("error: {}: {e}", cmd.queries.display());
        ExitCode::FAILURE
    })?;

    let settings = &ctx.config;
    let initial_ranking = match (&feedback, &settings.feedback.initial_ranking_file) {
        (Some(_), Some(path)) => Some(read_initial_ranking(path, &index)?),
        _ => None,
    };
    let options = BatchOptions {
        run_id: settings.output.run_id.clone(),
        limit: settings.output.limit,
        feedback,
        initial_ranking,
    };

    let engine = QueryEngine::new(&index, model);
    let summary = match &cmd.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                eprintln!("error: failed to create {}: {e}", path.display());
                ExitCode::FAILURE
            })?;
            run_batch(&engine, &queries, &options, &mut BufWriter::new(file))
        }
        None => run_batch(&engine, &queries, &options, &mut io::stdout().lock()),
    }
    .map_err(|e| {
        eprintln!("error: failed to write run: {e}");
        ExitCode::FAILURE
    })?;

    if let Some(path) = &settings.feedback.expansion_query_file
        && options.feedback.is_some()
    {
        write_expansions(path, &summary.expansions)?;
    }

    Ok(summary)
}

/// Merges command-line feedback flags into the configured settings.
fn apply_overrides(settings: &mut FeedbackSettings, args: &FeedbackArgs) {
    settings.enabled |= args.feedback;
    if let Some(docs) = args.fb_docs {
        settings.docs = docs;
    }
    if let Some(terms) = args.fb_terms {
        settings.terms = terms;
    }
    if let Some(mu) = args.fb_mu {
        settings.mu = mu;
    }
    if let Some(weight) = args.fb_orig_weight {
        settings.orig_weight = weight;
    }
    if let Some(path) = &args.initial_ranking {
        settings.initial_ranking_file = Some(path.clone());
    }
    if let Some(path) = &args.expansion_output {
        settings.expansion_query_file = Some(path.clone());
    }
}

/// Validates the feedback settings, or returns `None` when feedback is off.
fn feedback_params(settings: &FeedbackSettings) -> Result<Option<FeedbackParams>, ExitCode> {
    if !settings.enabled {
        return Ok(None);
    }
    FeedbackParams::new(
        settings.docs,
        settings.terms,
        settings.mu,
        settings.orig_weight,
    )
    .map(|params| Some(params.with_field(settings.field.as_str())))
    .map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::FAILURE
    })
}

/// Reads a TREC run used as the initial ranking.
fn read_initial_ranking(path: &Path, index: &MemoryIndex) -> Result<InitialRanking, ExitCode> {
    let file = File::open(path).map_err(|e| {
        eprintln!("error: failed to open {}: {e}", path.display());
        ExitCode::FAILURE
    })?;
    InitialRanking::read(BufReader::new(file), index).map_err(|e| {
        eprintln!("error: {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

/// Writes one learned query per line.
fn write_expansions(path: &Path, records: &[String]) -> Result<(), ExitCode> {
    let write = || -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for record in records {
            writeln!(out, "{record}")?;
        }
        out.flush()
    };
    write().map_err(|e| {
        eprintln!("error: failed to write {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

/// Reports failed queries; any failure makes the exit status non-zero.
fn report(summary: &BatchSummary) -> ExitCode {
    if summary.is_success() {
        return ExitCode::SUCCESS;
    }
    eprintln!("Failed queries ({}):", summary.failed.len());
    for failed in &summary.failed {
        eprintln!("  - {}: {}", failed.id, failed.message);
    }
    ExitCode::FAILURE
}
