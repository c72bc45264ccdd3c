//! Configuration for qe.
//!
//! qe reads an optional TOML file with `[retrieval]`, `[bm25]`, `[indri]`,
//! `[feedback]` and `[output]` sections. Every key is optional; missing keys
//! take the defaults below, and command-line flags override both.
//!
//! Parameter ranges are checked when the retrieval model is built, not here.
//! This crate only reports non-fatal [`ConfigWarning`]s.

#![warn(missing_docs)]

mod error;
mod parse;
mod resolve;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use error::ConfigError;
pub use parse::{
    RawBm25, RawConfig, RawFeedback, RawIndri, RawOutput, RawRetrieval, parse_config_file,
    parse_config_str,
};
pub use resolve::resolve_path;
use serde::{Serialize, Serializer};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Retrieval model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// Exact Boolean match, every match scores 1.
    UnrankedBoolean,
    /// Boolean match scored by term frequency.
    RankedBoolean,
    /// Okapi BM25.
    #[default]
    Bm25,
    /// Indri query likelihood.
    Indri,
}

impl ModelKind {
    /// The canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::UnrankedBoolean => "unranked-boolean",
            Self::RankedBoolean => "ranked-boolean",
            Self::Bm25 => "bm25",
            Self::Indri => "indri",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    /// Accepts names case-insensitively, with or without `-`/`_` separators,
    /// so `RankedBoolean` and `ranked-boolean` are the same model.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "unrankedboolean" => Ok(Self::UnrankedBoolean),
            "rankedboolean" => Ok(Self::RankedBoolean),
            "bm25" => Ok(Self::Bm25),
            "indri" => Ok(Self::Indri),
            _ => Err(ConfigError::UnknownModel {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ModelKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Model selection.
    pub retrieval: RetrievalSettings,
    /// BM25 parameters.
    pub bm25: Bm25Settings,
    /// Indri parameters.
    pub indri: IndriSettings,
    /// Relevance feedback.
    pub feedback: FeedbackSettings,
    /// Run output.
    pub output: OutputSettings,
    /// The file this configuration was loaded from, if any.
    pub source: Option<PathBuf>,
    /// Which optional sections the file set explicitly.
    pub(crate) present: PresentSections,
}

/// Sections whose presence matters for validation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PresentSections {
    /// `[bm25]` appeared in the file.
    pub(crate) bm25: bool,
    /// `[indri]` appeared in the file.
    pub(crate) indri: bool,
}

impl Config {
    /// Loads a configuration file.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = Self::from_raw(raw, base)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Applies defaults to a parsed file. `base` resolves relative paths.
    pub fn from_raw(raw: RawConfig, base: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let retrieval = raw.retrieval.unwrap_or_default();
        let retrieval = RetrievalSettings {
            model: match retrieval.model {
                Some(name) => name.parse()?,
                None => defaults.retrieval.model,
            },
            stemmer: retrieval.stemmer.unwrap_or(defaults.retrieval.stemmer),
        };

        let present = PresentSections {
            bm25: raw.bm25.is_some(),
            indri: raw.indri.is_some(),
        };

        let bm25 = raw.bm25.unwrap_or_default();
        let bm25 = Bm25Settings {
            k1: bm25.k1.unwrap_or(defaults.bm25.k1),
            b: bm25.b.unwrap_or(defaults.bm25.b),
            k3: bm25.k3.unwrap_or(defaults.bm25.k3),
        };

        let indri = raw.indri.unwrap_or_default();
        let indri = IndriSettings {
            mu: indri.mu.unwrap_or(defaults.indri.mu),
            lambda: indri.lambda.unwrap_or(defaults.indri.lambda),
        };

        let feedback = raw.feedback.unwrap_or_default();
        let resolve = |path: Option<String>| {
            path.map(|p| resolve_path(&p, base)).transpose()
        };
        let feedback = FeedbackSettings {
            enabled: feedback.enabled.unwrap_or(defaults.feedback.enabled),
            docs: feedback.docs.unwrap_or(defaults.feedback.docs),
            terms: feedback.terms.unwrap_or(defaults.feedback.terms),
            mu: feedback.mu.unwrap_or(defaults.feedback.mu),
            orig_weight: feedback
                .orig_weight
                .unwrap_or(defaults.feedback.orig_weight),
            field: feedback.field.unwrap_or(defaults.feedback.field),
            initial_ranking_file: resolve(feedback.initial_ranking_file)?,
            expansion_query_file: resolve(feedback.expansion_query_file)?,
        };

        let output = raw.output.unwrap_or_default();
        let output = OutputSettings {
            run_id: output.run_id.unwrap_or(defaults.output.run_id),
            limit: output.limit.unwrap_or(defaults.output.limit),
        };

        Ok(Self {
            retrieval,
            bm25,
            indri,
            feedback,
            output,
            source: None,
            present,
        })
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Parameters set for a model other than the active one
    /// - Feedback files configured while feedback is disabled
    /// - An initial ranking file that does not exist
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in the config file format.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            retrieval: &self.retrieval,
            bm25: &self.bm25,
            indri: &self.indri,
            feedback: &self.feedback,
            output: &self.output,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Model selection settings.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalSettings {
    /// The active model.
    pub model: ModelKind,
    /// Stemming language for documents and queries.
    pub stemmer: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            stemmer: String::from("english"),
        }
    }
}

/// BM25 parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Bm25Settings {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization.
    pub b: f64,
    /// Query-term-frequency saturation.
    pub k3: f64,
}

impl Default for Bm25Settings {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            k3: 0.0,
        }
    }
}

/// Indri parameters.
#[derive(Debug, Clone, Serialize)]
pub struct IndriSettings {
    /// Dirichlet prior.
    pub mu: f64,
    /// Linear interpolation weight.
    pub lambda: f64,
}

impl Default for IndriSettings {
    fn default() -> Self {
        Self {
            mu: 2500.0,
            lambda: 0.4,
        }
    }
}

/// Relevance feedback settings.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSettings {
    /// Whether queries are expanded.
    pub enabled: bool,
    /// Number of top documents treated as relevant.
    pub docs: usize,
    /// Number of expansion terms.
    pub terms: usize,
    /// Dirichlet prior for expansion term scores.
    pub mu: f64,
    /// Weight of the original query in the expanded query.
    pub orig_weight: f64,
    /// Field expansion terms come from.
    pub field: String,
    /// Run file used instead of running the original query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_ranking_file: Option<PathBuf>,
    /// File learned queries are written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion_query_file: Option<PathBuf>,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            docs: 10,
            terms: 10,
            mu: 0.0,
            orig_weight: 0.5,
            field: String::from("body"),
            initial_ranking_file: None,
            expansion_query_file: None,
        }
    }
}

/// Run output settings.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSettings {
    /// Run identifier in the last column.
    pub run_id: String,
    /// Maximum documents per query.
    pub limit: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            run_id: String::from("run-1"),
            limit: 100,
        }
    }
}

/// Borrowed view of the settings for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Model selection.
    retrieval: &'a RetrievalSettings,
    /// BM25 parameters.
    bm25: &'a Bm25Settings,
    /// Indri parameters.
    indri: &'a IndriSettings,
    /// Relevance feedback.
    feedback: &'a FeedbackSettings,
    /// Run output.
    output: &'a OutputSettings,
}
