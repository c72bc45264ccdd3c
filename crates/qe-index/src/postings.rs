//! Positional postings and per-document term vectors.

use crate::{DocId, IndexError};

/// One document's entry in an inverted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Internal document id.
    pub docid: DocId,
    /// Ascending term positions within the document's field.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Creates a posting.
    pub fn new(docid: DocId, positions: Vec<u32>) -> Self {
        Self { docid, positions }
    }

    /// Term frequency in this document.
    pub fn tf(&self) -> usize {
        self.positions.len()
    }
}

/// Docid-ordered postings for one term (or merged terms) in one field.
///
/// `df` and `ctf` are maintained on append, so they always equal the number
/// of postings and the total number of positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertedList {
    /// Field the postings belong to.
    field: String,
    /// Collection term frequency.
    ctf: u64,
    /// Postings sorted strictly ascending by docid.
    postings: Vec<Posting>,
}

impl InvertedList {
    /// Creates an empty list for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ctf: 0,
            postings: Vec::new(),
        }
    }

    /// Appends a posting; `docid` must exceed every docid already present.
    pub fn append_posting(&mut self, docid: DocId, positions: Vec<u32>) -> Result<(), IndexError> {
        if let Some(last) = self.postings.last()
            && docid <= last.docid
        {
            return Err(IndexError::PostingOrder {
                field: self.field.clone(),
                docid,
                last: last.docid,
            });
        }
        self.ctf += positions.len() as u64;
        self.postings.push(Posting::new(docid, positions));
        Ok(())
    }

    /// Field the postings belong to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Document frequency.
    pub fn df(&self) -> usize {
        self.postings.len()
    }

    /// Collection term frequency.
    pub fn ctf(&self) -> u64 {
        self.ctf
    }

    /// The postings, ascending by docid.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Returns true if no document is listed.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// A stem in a document's term vector with its collection statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVectorEntry {
    /// The indexed stem.
    pub stem: String,
    /// Occurrences in this document.
    pub tf: u32,
    /// Documents containing the stem in this field.
    pub df: usize,
    /// Occurrences in the whole field.
    pub ctf: u64,
}

/// The stems of one document field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermVector {
    /// Entries sorted by stem.
    pub entries: Vec<TermVectorEntry>,
}

impl TermVector {
    /// Looks up one stem.
    pub fn get(&self, stem: &str) -> Option<&TermVectorEntry> {
        self.entries
            .binary_search_by(|entry| entry.stem.as_str().cmp(stem))
            .ok()
            .map(|index| &self.entries[index])
    }
}
