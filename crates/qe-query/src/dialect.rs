//! Model-dependent parts of the query language.

use std::fmt;

use crate::QueryNode;

/// The family of retrieval model a query is parsed for.
///
/// The dialect decides which operator wraps a bare query and whether `#AND`
/// means exact-match conjunction or the probabilistic Indri combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryDialect {
    /// Unranked and ranked Boolean models. Bare queries become `#OR`.
    Boolean,
    /// BM25. Bare queries become `#SUM`.
    Bm25,
    /// Indri query likelihood. Bare queries become `#AND`, which is parsed as
    /// the Indri combination.
    Indri,
}

impl QueryDialect {
    /// Returns the operator name a bare query is wrapped in.
    pub fn default_operator(self) -> &'static str {
        match self {
            Self::Boolean => "#or",
            Self::Bm25 => "#sum",
            Self::Indri => "#and",
        }
    }

    /// Wraps `query` in this dialect's default operator.
    pub fn wrap(self, query: &str) -> String {
        format!("{}({})", self.default_operator(), query)
    }

    /// Wraps already built nodes in this dialect's default operator.
    ///
    /// Produces the same tree as parsing the wrapped query text, without
    /// analyzing any term again.
    pub fn wrap_nodes(self, children: Vec<QueryNode>) -> QueryNode {
        match self {
            Self::Boolean => QueryNode::Or(children),
            Self::Bm25 => QueryNode::Sum(children),
            Self::Indri => QueryNode::IndriAnd(children),
        }
    }
}

impl fmt::Display for QueryDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Bm25 => "bm25",
            Self::Indri => "indri",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lowercase, parse};

    #[test]
    fn default_operators() {
        assert_eq!(QueryDialect::Boolean.default_operator(), "#or");
        assert_eq!(QueryDialect::Bm25.default_operator(), "#sum");
        assert_eq!(QueryDialect::Indri.default_operator(), "#and");
    }

    #[test]
    fn wrap_uses_default_operator() {
        assert_eq!(QueryDialect::Indri.wrap("a b"), "#and(a b)");
    }

    #[test]
    fn wrap_nodes_matches_parsed_wrap() {
        let children = || vec![QueryNode::term("a", "body"), QueryNode::term("b", "body")];
        for dialect in [QueryDialect::Boolean, QueryDialect::Bm25, QueryDialect::Indri] {
            let parsed = parse(&dialect.wrap("a b"), dialect, &Lowercase).unwrap();
            assert_eq!(parsed, Some(dialect.wrap_nodes(children())));
        }
    }
}
