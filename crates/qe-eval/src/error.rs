//! Error types for query evaluation.

use std::io;

use qe_index::IndexError;
use qe_query::QueryError;
use thiserror::Error;

/// Errors raised while configuring models or evaluating queries.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Children of an inverted-list operator search different fields.
    #[error("{operator} arguments must share a field: found {expected} and {found}")]
    FieldMismatch {
        /// The merging operator.
        operator: String,
        /// Field of the first argument.
        expected: String,
        /// The differing field.
        found: String,
    },

    /// A retrieval or feedback parameter is out of range.
    #[error("invalid parameter {name} = {value}: expected {expected}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// The accepted range.
        expected: &'static str,
    },

    /// A score-list operator was used where positions are required.
    #[error("{operator} does not produce an inverted list")]
    ExpectedInvertedList {
        /// The offending operator.
        operator: String,
    },

    /// A line of an initial ranking file is malformed.
    #[error("ranking file line {line}: {message}")]
    RankingFile {
        /// One-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A line of a query file is malformed.
    #[error("query file line {line}: {message}")]
    QueryFile {
        /// One-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// The query could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The index rejected a lookup.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EvalError {
    /// Creates an `InvalidParameter` error.
    pub(crate) fn invalid(name: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            expected,
        }
    }
}
