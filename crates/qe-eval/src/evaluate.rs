//! Query-tree evaluation against an index.
//!
//! [`Evaluator`] walks a [`QueryNode`] bottom-up. Inverted-list nodes become
//! [`InvertedList`]s through the merges in [`crate::merge`]; score-list nodes
//! combine their children's [`ScoreList`]s. An inverted list that reaches a
//! score-list context is scored as if wrapped in `#SCORE`.
//!
//! Alongside each score list the evaluator tracks a [`DefaultScore`], which
//! `#AND` under Indri, `#WAND` and `#WSUM` use for documents a child did not
//! match.

use qe_index::{DocId, IndexReader, InvertedList};
use qe_query::{QueryNode, Weighted};
use tracing::trace;

use crate::{
    DefaultScore, EvalError, RetrievalModel, ScoreList, combine, merge,
    model::{bm25_idf, collection_probability},
};

/// A score list with the default score of the node that produced it.
#[derive(Debug)]
struct Scored {
    /// Scores of matched documents.
    list: ScoreList,
    /// Score of unmatched documents.
    default: DefaultScore,
}

impl Scored {
    /// A list whose node never contributes to unmatched documents.
    fn plain(list: ScoreList) -> Self {
        Self {
            list,
            default: DefaultScore::Constant(0.0),
        }
    }
}

/// How a weighted operator combines its children.
#[derive(Debug, Clone, Copy)]
enum Weighting {
    /// Weighted geometric mean (`#WAND`).
    Product,
    /// Weighted arithmetic mean (`#WSUM`).
    Sum,
}

/// Evaluates query trees under one retrieval model.
pub struct Evaluator<'a, I> {
    /// The index being searched.
    index: &'a I,
    /// The active model.
    model: &'a RetrievalModel,
}

impl<'a, I: IndexReader> Evaluator<'a, I> {
    /// Creates an evaluator over `index`.
    pub fn new(index: &'a I, model: &'a RetrievalModel) -> Self {
        Self { index, model }
    }

    /// Evaluates `node` to the scores of every matching document.
    pub fn evaluate(&self, node: &QueryNode) -> Result<ScoreList, EvalError> {
        Ok(self.scores(node)?.list)
    }

    /// Evaluates an inverted-list node to its postings.
    pub fn inverted_list(&self, node: &QueryNode) -> Result<InvertedList, EvalError> {
        match node {
            QueryNode::Term { term, field } => Ok(self.index.inverted_list(term, field)),
            QueryNode::Syn(children) => merge::syn(&self.inverted_lists(children)?),
            QueryNode::Near { distance, children } => {
                merge::near(&self.inverted_lists(children)?, *distance)
            }
            QueryNode::Window { distance, children } => {
                merge::window(&self.inverted_lists(children)?, *distance)
            }
            other => Err(EvalError::ExpectedInvertedList {
                operator: other.operator_name().unwrap_or_default(),
            }),
        }
    }

    /// Evaluates each child to an inverted list.
    fn inverted_lists(&self, children: &[QueryNode]) -> Result<Vec<InvertedList>, EvalError> {
        children.iter().map(|c| self.inverted_list(c)).collect()
    }

    /// Evaluates each child to a score list, dropping defaults.
    fn score_lists(&self, children: &[QueryNode]) -> Result<Vec<ScoreList>, EvalError> {
        children.iter().map(|c| self.evaluate(c)).collect()
    }

    /// Evaluates `node` in a score-list context.
    fn scores(&self, node: &QueryNode) -> Result<Scored, EvalError> {
        let unranked = self.model.is_unranked();
        match node {
            QueryNode::Term { .. }
            | QueryNode::Syn(_)
            | QueryNode::Near { .. }
            | QueryNode::Window { .. } => self.score_inverted(&self.inverted_list(node)?),
            QueryNode::Score(child) if child.is_inverted_list() => {
                self.score_inverted(&self.inverted_list(child)?)
            }
            QueryNode::Score(child) => self.scores(child),
            QueryNode::And(children) => Ok(Scored::plain(combine::and(
                self.score_lists(children)?,
                unranked,
            ))),
            QueryNode::Or(children) => Ok(Scored::plain(combine::or(
                &self.score_lists(children)?,
                unranked,
            ))),
            QueryNode::Sum(children) => Ok(Scored::plain(combine::sum(
                &self.score_lists(children)?,
            ))),
            QueryNode::IndriAnd(children) => self.indri_and(children),
            QueryNode::Wand(children) => self.weighted(children, Weighting::Product),
            QueryNode::Wsum(children) => self.weighted(children, Weighting::Sum),
        }
    }

    /// Scores every posting of `list` under the active model.
    fn score_inverted(&self, list: &InvertedList) -> Result<Scored, EvalError> {
        let field = list.field();
        let postings = list.postings();

        let scored = match self.model {
            RetrievalModel::UnrankedBoolean => {
                Scored::plain(postings.iter().map(|p| (p.docid, 1.0)).collect())
            }
            RetrievalModel::RankedBoolean => {
                Scored::plain(postings.iter().map(|p| (p.docid, p.tf() as f64)).collect())
            }
            RetrievalModel::Bm25(params) => {
                let idf = bm25_idf(self.index.num_docs(), list.df());
                let avg_doclen = self.index.field_stats(field).average_length();
                let mut scores = ScoreList::new();
                for posting in postings {
                    let doclen = self.index.doc_length(field, posting.docid)? as f64;
                    scores.push(
                        posting.docid,
                        params.score(idf, posting.tf() as f64, doclen, avg_doclen),
                    );
                }
                Scored::plain(scores)
            }
            RetrievalModel::Indri(params) => {
                let collection_length = self.index.field_stats(field).total_term_occurrences;
                let mle = collection_probability(list.ctf(), collection_length);
                let mut scores = ScoreList::new();
                for posting in postings {
                    let doclen = self.index.doc_length(field, posting.docid)? as f64;
                    scores.push(posting.docid, params.score(posting.tf() as f64, doclen, mle));
                }
                Scored {
                    list: scores,
                    default: DefaultScore::Term {
                        field: field.to_string(),
                        ctf: list.ctf(),
                    },
                }
            }
        };

        trace!(
            target: "qe::eval",
            field,
            df = list.df(),
            ctf = list.ctf(),
            "scored inverted list"
        );
        Ok(scored)
    }

    /// `#AND` under Indri: geometric mean over the union of matches.
    fn indri_and(&self, children: &[QueryNode]) -> Result<Scored, EvalError> {
        let children = children
            .iter()
            .map(|c| self.scores(c))
            .collect::<Result<Vec<_>, _>>()?;
        let lists: Vec<ScoreList> = children.iter().map(|c| c.list.clone()).collect();
        let exponent = 1.0 / children.len().max(1) as f64;

        let list = combine::with_defaults(
            &lists,
            |child, docid| self.default_score(&children[child].default, docid),
            |scores| scores.iter().product::<f64>().powf(exponent),
        )?;
        let default = DefaultScore::Mean(children.into_iter().map(|c| c.default).collect());
        Ok(Scored { list, default })
    }

    /// `#WAND` and `#WSUM`: weighted means over the union of matches.
    ///
    /// Zero-weight children are skipped; with no positive weight left the
    /// result is empty with a neutral default of 1.
    fn weighted(&self, children: &[Weighted], weighting: Weighting) -> Result<Scored, EvalError> {
        let active: Vec<&Weighted> = children.iter().filter(|c| c.weight > 0.0).collect();
        let total: f64 = active.iter().map(|c| c.weight).sum();
        if active.is_empty() || total <= 0.0 {
            return Ok(Scored {
                list: ScoreList::new(),
                default: DefaultScore::Constant(1.0),
            });
        }

        let weights: Vec<f64> = active.iter().map(|c| c.weight / total).collect();
        let scored = active
            .iter()
            .map(|c| self.scores(&c.node))
            .collect::<Result<Vec<_>, _>>()?;
        let lists: Vec<ScoreList> = scored.iter().map(|c| c.list.clone()).collect();

        let list = combine::with_defaults(
            &lists,
            |child, docid| self.default_score(&scored[child].default, docid),
            |scores| match weighting {
                Weighting::Product => scores
                    .iter()
                    .zip(&weights)
                    .map(|(s, w)| s.powf(*w))
                    .product(),
                Weighting::Sum => scores.iter().zip(&weights).map(|(s, w)| s * w).sum(),
            },
        )?;

        let defaults = weights
            .iter()
            .copied()
            .zip(scored.into_iter().map(|c| c.default))
            .collect();
        let default = match weighting {
            Weighting::Product => DefaultScore::Product(defaults),
            Weighting::Sum => DefaultScore::Sum(defaults),
        };
        Ok(Scored { list, default })
    }

    /// Computes a default score for `docid`.
    pub fn default_score(&self, default: &DefaultScore, docid: DocId) -> Result<f64, EvalError> {
        match default {
            DefaultScore::Constant(value) => Ok(*value),
            DefaultScore::Term { field, ctf } => match self.model {
                RetrievalModel::Indri(params) => {
                    let collection_length =
                        self.index.field_stats(field).total_term_occurrences;
                    let mle = collection_probability(*ctf, collection_length);
                    let doclen = self.index.doc_length(field, docid)? as f64;
                    Ok(params.score(0.0, doclen, mle))
                }
                _ => Ok(0.0),
            },
            DefaultScore::Mean(children) => {
                let mut product = 1.0;
                for child in children {
                    product *= self.default_score(child, docid)?;
                }
                Ok(product.powf(1.0 / children.len().max(1) as f64))
            }
            DefaultScore::Product(children) => {
                let mut product = 1.0;
                for (weight, child) in children {
                    product *= self.default_score(child, docid)?.powf(*weight);
                }
                Ok(product)
            }
            DefaultScore::Sum(children) => {
                let mut sum = 0.0;
                for (weight, child) in children {
                    sum += self.default_score(child, docid)? * weight;
                }
                Ok(sum)
            }
        }
    }
}
