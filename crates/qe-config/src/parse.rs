//! Configuration file parsing.
//!
//! Parses a `qe.toml` file into a `RawConfig` that keeps every field
//! optional, so that defaults and presence checks can be applied afterwards.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// Mirrors the TOML schema exactly; absent sections stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Retrieval model selection.
    pub retrieval: Option<RawRetrieval>,
    /// BM25 parameters.
    pub bm25: Option<RawBm25>,
    /// Indri parameters.
    pub indri: Option<RawIndri>,
    /// Relevance feedback settings.
    pub feedback: Option<RawFeedback>,
    /// Run output settings.
    pub output: Option<RawOutput>,
}

/// Raw `[retrieval]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawRetrieval {
    /// Model name.
    pub model: Option<String>,
    /// Stemming language.
    pub stemmer: Option<String>,
}

/// Raw `[bm25]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawBm25 {
    /// Term-frequency saturation.
    pub k1: Option<f64>,
    /// Length normalization.
    pub b: Option<f64>,
    /// Query-term-frequency saturation.
    pub k3: Option<f64>,
}

/// Raw `[indri]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIndri {
    /// Dirichlet prior.
    pub mu: Option<f64>,
    /// Linear interpolation weight.
    pub lambda: Option<f64>,
}

/// Raw `[feedback]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFeedback {
    /// Whether queries are expanded.
    pub enabled: Option<bool>,
    /// Number of feedback documents.
    pub docs: Option<usize>,
    /// Number of expansion terms.
    pub terms: Option<usize>,
    /// Dirichlet prior for expansion term scores.
    pub mu: Option<f64>,
    /// Weight of the original query.
    pub orig_weight: Option<f64>,
    /// Field expansion terms come from.
    pub field: Option<String>,
    /// Run file used as the initial ranking.
    pub initial_ranking_file: Option<String>,
    /// File learned queries are written to.
    pub expansion_query_file: Option<String>,
}

/// Raw `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawOutput {
    /// Run identifier.
    pub run_id: Option<String>,
    /// Maximum documents per query.
    pub limit: Option<usize>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
