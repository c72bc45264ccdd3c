//! Error types for query lexing and parsing.

use std::{error::Error, fmt};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where the error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

impl Error for LexError {}

/// A query that could not be turned into an operator tree.
///
/// Carries the original query (when known) so the error can be rendered with
/// a pointer to the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryErrorKind {
    /// Malformed prefix syntax: unbalanced parentheses, missing or stray
    /// weights, malformed distances, trailing tokens.
    Syntax {
        /// Error message.
        message: String,
        /// Byte position in the query (if known).
        position: Option<usize>,
    },
    /// An `#name` token that names no operator.
    UnknownOperator {
        /// The operator name as written, without the leading `#`.
        name: String,
        /// Byte position in the query (if known).
        position: Option<usize>,
    },
}

impl QueryError {
    /// Creates a syntax error.
    pub fn syntax(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            kind: QueryErrorKind::Syntax {
                message: message.into(),
                position,
            },
            query: None,
        }
    }

    /// Creates an unknown-operator error.
    pub fn unknown_operator(name: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            kind: QueryErrorKind::UnknownOperator {
                name: name.into(),
                position,
            },
            query: None,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> String {
        match &self.kind {
            QueryErrorKind::Syntax { message, .. } => message.clone(),
            QueryErrorKind::UnknownOperator { name, .. } => format!("unknown operator #{name}"),
        }
    }

    /// Returns the byte position of the error, if known.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Syntax { position, .. }
            | QueryErrorKind::UnknownOperator { position, .. } => *position,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::UnknownOperator { .. } => Some(
                "Valid operators are: #AND #OR #SYN #SCORE #SUM #NEAR/n #WINDOW/n #WAND #WSUM",
            ),
            QueryErrorKind::Syntax { message, .. } if message.contains("closing parenthesis") => {
                Some("Every #OPERATOR( needs a matching )")
            }
            QueryErrorKind::Syntax { message, .. } if message.contains("weight") => {
                Some("#WAND and #WSUM need a weight before every argument, e.g. #WAND(0.7 a 0.3 b)")
            }
            QueryErrorKind::Syntax { message, .. } if message.contains("distance") => {
                Some("Proximity operators take a positive distance, e.g. #NEAR/3(a b)")
            }
            QueryErrorKind::Syntax { .. } => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Syntax { .. } => "query syntax error",
            QueryErrorKind::UnknownOperator { .. } => "query error",
        };

        write!(f, "{}: {}", prefix, self.message())?;

        if let Some(query) = &self.query {
            write!(f, "\n  {query}")?;
            if let Some(pos) = self.position() {
                let clamped = pos.min(query.len());
                write!(f, "\n  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Syntax {
                message: err.message,
                position: Some(err.position),
            },
            query: Some(err.input),
        }
    }
}
