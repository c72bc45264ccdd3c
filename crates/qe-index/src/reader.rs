//! Read-only view of an index, as consumed by query evaluation.

use qe_query::Analyze;

use crate::{DocId, IndexError, InvertedList, TermVector};

/// Collection statistics for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStats {
    /// Total number of indexed tokens in the field across all documents.
    pub total_term_occurrences: u64,
    /// Number of documents with at least one token in the field.
    pub doc_count: u64,
}

impl FieldStats {
    /// Average field length, or 0 for an empty field.
    pub fn average_length(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_term_occurrences as f64 / self.doc_count as f64
        }
    }
}

/// Everything query evaluation needs from an index.
///
/// Implementations are immutable while queries run, so one reader can serve
/// any number of concurrent evaluations.
pub trait IndexReader: Analyze + Send + Sync {
    /// Returns the postings of `term` in `field`; empty if the term is unseen.
    fn inverted_list(&self, term: &str, field: &str) -> InvertedList;

    /// Returns the stems of one document field.
    fn term_vector(&self, docid: DocId, field: &str) -> Result<TermVector, IndexError>;

    /// Number of indexed tokens in one document field.
    fn doc_length(&self, field: &str, docid: DocId) -> Result<u64, IndexError>;

    /// Collection statistics for `field`.
    fn field_stats(&self, field: &str) -> FieldStats;

    /// Number of documents in the index.
    fn num_docs(&self) -> u64;

    /// Maps an internal id to the document's external identifier.
    fn external_id(&self, docid: DocId) -> Result<&str, IndexError>;

    /// Maps an external identifier to the internal id.
    fn internal_id(&self, external_id: &str) -> Result<DocId, IndexError>;
}
