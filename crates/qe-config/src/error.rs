//! Error types for qe configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or rendering configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// The retrieval model name is not recognized.
    #[error(
        "unknown retrieval model '{name}' (expected unranked-boolean, ranked-boolean, bm25 or indri)"
    )]
    UnknownModel {
        /// The rejected name.
        name: String,
    },

    /// Failed to determine home directory for a `~` path.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// Failed to render settings as TOML.
    #[error("failed to render settings: {0}")]
    Render(#[from] ser::Error),
}
