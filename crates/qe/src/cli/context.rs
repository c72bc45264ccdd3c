//! Shared context for running CLI commands.

use std::{path::Path, process::ExitCode};

use qe_config::{Config, ModelKind};
use qe_eval::RetrievalModel;
use qe_index::{Analyzer, MemoryIndex, load_corpus};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Loaded configuration (the defaults if no file was given).
    pub config: Config,
}

impl CommandContext {
    /// Loads the configuration file, if one was given.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ExitCode> {
        let config = load_config_or_failure(config_path)?;
        Ok(Self { config })
    }

    /// Applies a `--model` override to the configured model.
    pub fn override_model(&mut self, name: Option<&str>) -> Result<(), ExitCode> {
        if let Some(name) = name {
            self.config.retrieval.model = name.parse::<ModelKind>().map_err(|e| {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            })?;
        }
        Ok(())
    }

    /// Builds the configured retrieval model, validating its parameters.
    pub fn retrieval_model(&self) -> Result<RetrievalModel, ExitCode> {
        let config = &self.config;
        let model = match config.retrieval.model {
            ModelKind::UnrankedBoolean => Ok(RetrievalModel::UnrankedBoolean),
            ModelKind::RankedBoolean => Ok(RetrievalModel::RankedBoolean),
            ModelKind::Bm25 => RetrievalModel::bm25(config.bm25.k1, config.bm25.b, config.bm25.k3),
            ModelKind::Indri => RetrievalModel::indri(config.indri.mu, config.indri.lambda),
        };
        model.map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Builds the analyzer for the configured stemmer.
    pub fn analyzer(&self) -> Result<Analyzer, ExitCode> {
        Analyzer::from_name(&self.config.retrieval.stemmer).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Loads and indexes a corpus with the configured analyzer.
    pub fn load_index(&self, corpus: &Path) -> Result<MemoryIndex, ExitCode> {
        let analyzer = self.analyzer()?;
        load_corpus(corpus, analyzer).map_err(|e| {
            eprintln!("error: failed to load corpus {}: {e}", corpus.display());
            ExitCode::FAILURE
        })
    }
}

/// Loads configuration from the provided path or exits with an error.
fn load_config_or_failure(path: Option<&Path>) -> Result<Config, ExitCode> {
    Config::load_optional(path).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_bm25() {
        let ctx = CommandContext::load(None).unwrap();
        assert!(matches!(
            ctx.retrieval_model().unwrap(),
            RetrievalModel::Bm25(_)
        ));
    }

    #[test]
    fn model_override_switches_model() {
        let mut ctx = CommandContext::load(None).unwrap();
        ctx.override_model(Some("indri")).unwrap();
        assert!(matches!(
            ctx.retrieval_model().unwrap(),
            RetrievalModel::Indri(_)
        ));
        assert!(ctx.override_model(Some("lsi")).is_err());
    }

    #[test]
    fn invalid_parameters_fail() {
        let mut ctx = CommandContext::load(None).unwrap();
        ctx.config.bm25.k1 = -1.0;
        assert!(ctx.retrieval_model().is_err());
    }
}
