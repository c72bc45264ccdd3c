//! Error types for the qe-index crate.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::DocId;

/// Errors that can occur when building or reading an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// An external document identifier has no internal counterpart.
    #[error("external id not found: {0}")]
    ExternalIdNotFound(String),

    /// An internal document id is out of range.
    #[error("unknown document: {0}")]
    UnknownDocument(DocId),

    /// A posting was appended out of docid order.
    #[error("posting for document {docid} appended after document {last} in field {field}")]
    PostingOrder {
        /// Field of the inverted list.
        field: String,
        /// Docid of the rejected posting.
        docid: DocId,
        /// Docid of the last posting in the list.
        last: DocId,
    },

    /// Two documents share an external id.
    #[error("duplicate document id: {0}")]
    DuplicateDocument(String),

    /// A corpus line could not be decoded.
    #[error("{}:{line}: invalid document: {message}", path.display())]
    Corpus {
        /// Path to the corpus file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Decoder message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),
}
