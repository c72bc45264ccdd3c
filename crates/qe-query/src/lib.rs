//! Structured query language for the qe evaluation engine.
//!
//! Queries are written in prefix notation:
//!
//! - **Terms**: `apple` or `apple.title` - a term, optionally scoped to a field
//! - **Boolean**: `#AND(a b)`, `#OR(a b)` - exact and ranked conjunction/disjunction
//! - **Proximity**: `#NEAR/3(a b)`, `#WINDOW/8(a b)` - ordered and unordered windows
//! - **Synonyms**: `#SYN(car automobile)` - treat several terms as one
//! - **Combination**: `#SUM(a b)`, `#SCORE(a)` - score-list arithmetic
//! - **Weighting**: `#WAND(0.7 a 0.3 b)`, `#WSUM(2 a 1 b)` - weighted means
//!
//! Operator names are case-insensitive. Whitespace, commas and parentheses
//! delimit tokens. A query that does not start with an operator is wrapped
//! in the default operator of the active [`QueryDialect`].
//!
//! # Example
//!
//! ```
//! use qe_query::{Lowercase, QueryDialect, parse};
//!
//! let node = parse("tart #NEAR/2(apple pie)", QueryDialect::Bm25, &Lowercase).unwrap();
//! assert_eq!(
//!     node.unwrap().to_query_string(),
//!     "#sum(tart.body #near/2(apple.body pie.body))"
//! );
//! ```

#![warn(missing_docs)]

mod analyze;
mod ast;
mod dialect;
mod error;
mod lexer;
mod parser;

pub use analyze::{Analyze, Lowercase};
pub use ast::{DEFAULT_FIELD, QueryNode, Weighted};
pub use dialect::QueryDialect;
pub use error::{LexError, QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::parse;
