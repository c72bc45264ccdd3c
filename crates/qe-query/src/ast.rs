//! Query operator tree.
//!
//! A parsed query is a tree of [`QueryNode`]s. Leaves are field-scoped terms;
//! interior nodes either merge inverted lists (`Syn`, `Near`, `Window`) or
//! combine score lists (everything else).

use std::{fmt, slice};

/// Field searched by terms that do not name one.
pub const DEFAULT_FIELD: &str = "body";

/// A child of a weighted operator, paired with its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted {
    /// Non-negative, finite weight.
    pub weight: f64,
    /// The weighted argument.
    pub node: QueryNode,
}

impl Weighted {
    /// Pairs a node with its weight.
    pub fn new(weight: f64, node: QueryNode) -> Self {
        Self { weight, node }
    }
}

/// A node of the query operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// A normalized term searched in one field.
    Term {
        /// The analyzed term.
        term: String,
        /// The field the term is looked up in.
        field: String,
    },

    /// Union of inverted lists, treating every child as the same term.
    Syn(Vec<Self>),

    /// Ordered proximity: each child follows the previous within `distance`.
    Near {
        /// Maximum gap between consecutive children.
        distance: u32,
        /// Inverted-list children, in match order.
        children: Vec<Self>,
    },

    /// Unordered proximity: all children inside a span of `distance`.
    Window {
        /// Maximum span covering one position of every child.
        distance: u32,
        /// Inverted-list children.
        children: Vec<Self>,
    },

    /// Converts an inverted list into a score list.
    Score(Box<Self>),

    /// Exact-match conjunction.
    And(Vec<Self>),

    /// Disjunction.
    Or(Vec<Self>),

    /// Sum of child scores.
    Sum(Vec<Self>),

    /// Indri conjunction: geometric mean with default scores.
    IndriAnd(Vec<Self>),

    /// Weighted geometric mean with default scores.
    Wand(Vec<Weighted>),

    /// Weighted arithmetic mean with default scores.
    Wsum(Vec<Weighted>),
}

impl QueryNode {
    /// Creates a term leaf.
    pub fn term(term: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Term {
            term: term.into(),
            field: field.into(),
        }
    }

    /// Returns true if this node evaluates to an inverted list.
    pub fn is_inverted_list(&self) -> bool {
        matches!(
            self,
            Self::Term { .. } | Self::Syn(_) | Self::Near { .. } | Self::Window { .. }
        )
    }

    /// Returns the lowercase operator name, or `None` for terms.
    pub fn operator_name(&self) -> Option<String> {
        let name = match self {
            Self::Term { .. } => return None,
            Self::Syn(_) => "#syn".to_string(),
            Self::Near { distance, .. } => format!("#near/{distance}"),
            Self::Window { distance, .. } => format!("#window/{distance}"),
            Self::Score(_) => "#score".to_string(),
            Self::And(_) | Self::IndriAnd(_) => "#and".to_string(),
            Self::Or(_) => "#or".to_string(),
            Self::Sum(_) => "#sum".to_string(),
            Self::Wand(_) => "#wand".to_string(),
            Self::Wsum(_) => "#wsum".to_string(),
        };
        Some(name)
    }

    /// Returns the unweighted children of this node.
    fn children(&self) -> &[Self] {
        match self {
            Self::Term { .. } | Self::Wand(_) | Self::Wsum(_) => &[],
            Self::Score(child) => slice::from_ref(child.as_ref()),
            Self::Syn(children)
            | Self::Near { children, .. }
            | Self::Window { children, .. }
            | Self::And(children)
            | Self::Or(children)
            | Self::Sum(children)
            | Self::IndriAnd(children) => children,
        }
    }

    /// Returns every term leaf in the tree, left to right.
    pub fn terms(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    /// Accumulates term leaves into `out`.
    fn collect_terms<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Term { term, field } => out.push((term, field)),
            Self::Wand(children) | Self::Wsum(children) => {
                for child in children {
                    child.node.collect_terms(out);
                }
            }
            _ => {
                for child in self.children() {
                    child.collect_terms(out);
                }
            }
        }
    }

    /// Formats the node as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term { term, field } => writeln!(f, "{prefix}Term({term:?}, {field:?})"),
            Self::Syn(_) => self.fmt_children(f, indent, "Syn"),
            Self::Near { distance, .. } => {
                self.fmt_children(f, indent, &format!("Near/{distance}"))
            }
            Self::Window { distance, .. } => {
                self.fmt_children(f, indent, &format!("Window/{distance}"))
            }
            Self::Score(_) => self.fmt_children(f, indent, "Score"),
            Self::And(_) => self.fmt_children(f, indent, "And"),
            Self::Or(_) => self.fmt_children(f, indent, "Or"),
            Self::Sum(_) => self.fmt_children(f, indent, "Sum"),
            Self::IndriAnd(_) => self.fmt_children(f, indent, "IndriAnd"),
            Self::Wand(children) | Self::Wsum(children) => {
                let label = if matches!(self, Self::Wand(_)) {
                    "Wand"
                } else {
                    "Wsum"
                };
                writeln!(f, "{prefix}{label}")?;
                for child in children {
                    writeln!(f, "{prefix}  weight {}", child.weight)?;
                    child.node.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
        }
    }

    /// Writes a label line followed by the unweighted children.
    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, indent: usize, label: &str) -> fmt::Result {
        writeln!(f, "{}{label}", "  ".repeat(indent))?;
        for child in self.children() {
            child.fmt_tree(f, indent + 1)?;
        }
        Ok(())
    }

    /// Formats the node in canonical prefix syntax.
    ///
    /// Terms always carry their field, and operator names are lowercase, so
    /// the output parses back to the same tree under any dialect except that
    /// `#and` follows the dialect it is parsed with.
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Term { term, field } => format!("{term}.{field}"),
            Self::Wand(children) | Self::Wsum(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| format!("{} {}", c.weight, c.node.to_query_string()))
                    .collect();
                format!(
                    "{}({})",
                    self.operator_name().unwrap_or_default(),
                    parts.join(" ")
                )
            }
            _ => {
                let parts: Vec<String> = self
                    .children()
                    .iter()
                    .map(Self::to_query_string)
                    .collect();
                format!(
                    "{}({})",
                    self.operator_name().unwrap_or_default(),
                    parts.join(" ")
                )
            }
        }
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
