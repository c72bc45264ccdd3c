//! Index collaborator for the qe evaluation engine.
//!
//! This crate defines what query evaluation reads from an index and provides
//! an in-memory implementation:
//! - [`IndexReader`] - inverted lists, term vectors, lengths, statistics, id mapping
//! - [`InvertedList`] / [`Posting`] - docid-ordered positional postings
//! - [`Analyzer`] - the tantivy text pipeline shared by indexing and queries
//! - [`MemoryIndex`] - a positional index built from [`Document`]s
//! - [`load_corpus`] - JSON Lines corpus loading
//!
//! # Example
//!
//! ```
//! use qe_index::{Analyzer, Document, IndexReader, MemoryIndex};
//!
//! let docs = [Document::new("d1").with_field("body", "zebras and lions")];
//! let index = MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap();
//!
//! assert_eq!(index.inverted_list("zebra", "body").df(), 1);
//! assert_eq!(index.external_id(0).unwrap(), "d1");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod corpus;
mod document;
mod error;
mod memory;
mod postings;
mod reader;

pub use analyzer::{AnalyzedToken, Analyzer, build_analyzer, parse_language};
pub use corpus::{load_corpus, read_documents};
pub use document::Document;
pub use error::IndexError;
pub use memory::{MemoryIndex, MemoryIndexWriter};
pub use postings::{InvertedList, Posting, TermVector, TermVectorEntry};
pub use reader::{FieldStats, IndexReader};

/// Internal document identifier, dense from 0.
pub type DocId = u32;
