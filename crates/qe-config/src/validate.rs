//! Configuration validation.
//!
//! Reports settings that are legal but probably not what was intended.

use std::{fmt, path::PathBuf};

use crate::{Config, ModelKind};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A model parameter section is set but another model is active.
    InactiveModelSection {
        /// The section that has no effect.
        section: &'static str,
        /// The active model.
        model: ModelKind,
    },
    /// A feedback file is configured while feedback is disabled.
    FeedbackDisabled {
        /// The key that has no effect.
        key: &'static str,
    },
    /// The initial ranking file does not exist.
    InitialRankingMissing {
        /// The resolved path.
        path: PathBuf,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InactiveModelSection { section, model } => {
                write!(f, "[{section}] has no effect with model '{model}'")
            }
            Self::FeedbackDisabled { key } => {
                write!(f, "feedback.{key} is set but feedback is disabled")
            }
            Self::InitialRankingMissing { path } => {
                write!(f, "initial ranking file does not exist: {}", path.display())
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let model = config.retrieval.model;

    if config.present.bm25 && model != ModelKind::Bm25 {
        warnings.push(ConfigWarning::InactiveModelSection {
            section: "bm25",
            model,
        });
    }
    if config.present.indri && model != ModelKind::Indri {
        warnings.push(ConfigWarning::InactiveModelSection {
            section: "indri",
            model,
        });
    }

    let feedback = &config.feedback;
    if !feedback.enabled {
        if feedback.initial_ranking_file.is_some() {
            warnings.push(ConfigWarning::FeedbackDisabled {
                key: "initial_ranking_file",
            });
        }
        if feedback.expansion_query_file.is_some() {
            warnings.push(ConfigWarning::FeedbackDisabled {
                key: "expansion_query_file",
            });
        }
    }

    if let Some(path) = &feedback.initial_ranking_file
        && !path.is_file()
    {
        warnings.push(ConfigWarning::InitialRankingMissing { path: path.clone() });
    }

    warnings
}
