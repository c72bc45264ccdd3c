//! Clap argument definitions for the `qe` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "qe")]
#[command(about = "Structured query evaluation over a document collection")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Supported `qe` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a query file and write a TREC run
    Run(RunCommand),

    /// Show how a query is parsed
    Parse(ParseCommand),

    /// Show effective configuration and warnings
    Config(ConfigCommand),
}

/// Arguments for `qe run`.
#[derive(Args, Debug, Clone)]
pub struct RunCommand {
    /// JSON-lines corpus, one document per line
    #[arg(long)]
    pub corpus: PathBuf,

    /// Query file, one `qid:query` per line
    #[arg(long)]
    pub queries: PathBuf,

    /// Configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Write the run here instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Retrieval model (unranked-boolean, ranked-boolean, bm25, indri)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Run identifier written in the last column
    #[arg(long)]
    pub run_id: Option<String>,

    /// Maximum documents per query [default: 100]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Feedback overrides.
    #[command(flatten)]
    pub feedback: FeedbackArgs,
}

/// Relevance feedback flags; each overrides the `[feedback]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct FeedbackArgs {
    /// Expand queries with pseudo-relevance feedback
    #[arg(long)]
    pub feedback: bool,

    /// Number of top documents used for feedback [default: 10]
    #[arg(long)]
    pub fb_docs: Option<usize>,

    /// Number of expansion terms [default: 10]
    #[arg(long)]
    pub fb_terms: Option<usize>,

    /// Dirichlet prior for expansion term scores [default: 0]
    #[arg(long)]
    pub fb_mu: Option<f64>,

    /// Weight of the original query (0.0-1.0) [default: 0.5]
    #[arg(long)]
    pub fb_orig_weight: Option<f64>,

    /// Run file used as the initial ranking
    #[arg(long)]
    pub initial_ranking: Option<PathBuf>,

    /// Write learned queries to this file
    #[arg(long)]
    pub expansion_output: Option<PathBuf>,
}

/// Arguments for `qe parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query text
    pub query: String,

    /// Retrieval model whose dialect is used [default: bm25]
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Analyze terms the way this corpus is indexed instead of only lowercasing
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Arguments for `qe config`.
#[derive(Args, Debug, Clone)]
pub struct ConfigCommand {
    /// Configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_feedback_flags() {
        let cli = Cli::try_parse_from([
            "qe",
            "run",
            "--corpus",
            "docs.jsonl",
            "--queries",
            "q.txt",
            "--feedback",
            "--fb-docs",
            "5",
            "--fb-orig-weight",
            "0.7",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(run) = cli.command else {
            panic!("expected run");
        };
        assert!(run.feedback.feedback);
        assert_eq!(run.feedback.fb_docs, Some(5));
        assert_eq!(run.feedback.fb_orig_weight, Some(0.7));
        assert!(run.model.is_none());
    }

    #[test]
    fn run_requires_corpus_and_queries() {
        assert!(Cli::try_parse_from(["qe", "run", "--queries", "q.txt"]).is_err());
    }
}
