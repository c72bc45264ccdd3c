//! Query evaluation for the qe engine.
//!
//! Parsed query trees are evaluated against an [`IndexReader`] under one
//! [`RetrievalModel`]:
//! - [`merge`] - `#SYN`, `#NEAR/n` and `#WINDOW/n` over inverted lists
//! - [`Evaluator`] - score-list operators and default scores
//! - [`rank()`] - final ordering and truncation
//! - [`feedback`] - pseudo-relevance-feedback query expansion
//! - [`run_batch`] - a query file to a TREC run
//!
//! # Example
//!
//! ```
//! use qe_eval::{QueryEngine, RetrievalModel};
//! use qe_index::{Analyzer, Document, MemoryIndex};
//!
//! let docs = [
//!     Document::new("d1").with_field("body", "apple pie"),
//!     Document::new("d2").with_field("body", "apple tart"),
//! ];
//! let index = MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap();
//! let engine = QueryEngine::new(&index, RetrievalModel::RankedBoolean);
//!
//! let scores = engine.run("#AND(apple pie)").unwrap();
//! let ranked = engine.rank(&scores, 10).unwrap();
//! assert_eq!(ranked[0].external_id, "d1");
//! ```
//!
//! [`IndexReader`]: qe_index::IndexReader

#![warn(missing_docs)]

mod batch;
mod combine;
mod engine;
mod error;
mod evaluate;
pub mod feedback;
pub mod merge;
mod model;
mod rank;
mod score_list;
mod trec;

pub use batch::{BatchOptions, BatchSummary, FailedQuery, QueryLine, parse_queries, run_batch};
pub use engine::QueryEngine;
pub use error::EvalError;
pub use evaluate::Evaluator;
pub use feedback::{Expansion, FeedbackParams, LearnedTerm};
pub use model::{Bm25Params, IndriParams, RetrievalModel, bm25_idf, collection_probability};
pub use rank::{RankedDocument, rank};
pub use score_list::{DefaultScore, ScoreEntry, ScoreList};
pub use trec::{InitialRanking, SENTINEL_DOCUMENT, format_line, write_ranking};
