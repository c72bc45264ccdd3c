//! Parse, evaluate and rank one query.

use qe_index::IndexReader;
use qe_query::{QueryNode, parse};
use tracing::debug;

use crate::{EvalError, Evaluator, RankedDocument, RetrievalModel, ScoreList, rank};

/// An index paired with the retrieval model queries run under.
pub struct QueryEngine<'a, I> {
    /// The index being searched.
    index: &'a I,
    /// The active model.
    model: RetrievalModel,
}

impl<'a, I: IndexReader> QueryEngine<'a, I> {
    /// Creates an engine over `index`.
    pub fn new(index: &'a I, model: RetrievalModel) -> Self {
        Self { index, model }
    }

    /// The index queries run against.
    pub fn index(&self) -> &'a I {
        self.index
    }

    /// The active retrieval model.
    pub fn model(&self) -> &RetrievalModel {
        &self.model
    }

    /// Parses `query` in the model's dialect using the index analyzer.
    ///
    /// Returns `None` when nothing but stopwords remains.
    pub fn parse(&self, query: &str) -> Result<Option<QueryNode>, EvalError> {
        Ok(parse(query, self.model.dialect(), self.index)?)
    }

    /// Evaluates an already parsed tree.
    pub fn evaluate(&self, node: &QueryNode) -> Result<ScoreList, EvalError> {
        Evaluator::new(self.index, &self.model).evaluate(node)
    }

    /// Parses and evaluates `query`. An empty query matches nothing.
    pub fn run(&self, query: &str) -> Result<ScoreList, EvalError> {
        let Some(node) = self.parse(query)? else {
            debug!(target: "qe::eval", query, "query is empty after analysis");
            return Ok(ScoreList::new());
        };
        let list = self.evaluate(&node)?;
        debug!(
            target: "qe::eval",
            query = %node.to_query_string(),
            model = %self.model,
            matches = list.len(),
            "evaluated query"
        );
        Ok(list)
    }

    /// Ranks `list` and keeps the best `limit` documents.
    pub fn rank(&self, list: &ScoreList, limit: usize) -> Result<Vec<RankedDocument>, EvalError> {
        rank::rank(self.index, list, limit)
    }
}

#[cfg(test)]
mod tests {
    use qe_index::{Analyzer, Document, MemoryIndex};

    use super::*;

    fn index() -> MemoryIndex {
        let docs = [
            Document::new("p1").with_field("body", "pizza cheese"),
            Document::new("p2").with_field("body", "pizza pizza"),
        ];
        MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap()
    }

    #[test]
    fn stopword_query_matches_nothing() {
        let index = index();
        let engine = QueryEngine::new(&index, RetrievalModel::RankedBoolean);
        assert!(engine.parse("the of").unwrap().is_none());
        assert!(engine.run("the of").unwrap().is_empty());
    }

    #[test]
    fn syntax_errors_surface() {
        let index = index();
        let engine = QueryEngine::new(&index, RetrievalModel::RankedBoolean);
        assert!(matches!(engine.run("#AND(pizza"), Err(EvalError::Query(_))));
    }

    #[test]
    fn runs_and_ranks() {
        let index = index();
        let engine = QueryEngine::new(&index, RetrievalModel::RankedBoolean);
        let list = engine.run("pizza").unwrap();
        let ranked = engine.rank(&list, 10).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|d| d.external_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let index = index();
        let engine = QueryEngine::new(&index, RetrievalModel::indri(2500.0, 0.4).unwrap());
        assert_eq!(
            engine.run("pizza cheese").unwrap(),
            engine.run("pizza cheese").unwrap()
        );
    }
}
