//! Final ordering of scored documents.

use qe_index::{DocId, IndexReader};

use crate::{EvalError, ScoreList};

/// A document in ranked order.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    /// Internal document id.
    pub docid: DocId,
    /// External identifier, used for output and tie-breaking.
    pub external_id: String,
    /// Final score.
    pub score: f64,
}

/// Orders `list` by descending score, ties by ascending external id, and
/// keeps the first `limit` documents.
pub fn rank<I: IndexReader>(
    index: &I,
    list: &ScoreList,
    limit: usize,
) -> Result<Vec<RankedDocument>, EvalError> {
    let mut ranked = Vec::with_capacity(list.len());
    for entry in list.entries() {
        ranked.push(RankedDocument {
            docid: entry.docid,
            external_id: index.external_id(entry.docid)?.to_string(),
            score: entry.score,
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.external_id.cmp(&b.external_id))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use qe_index::{Analyzer, Document, IndexError, MemoryIndex};

    use super::*;

    fn index() -> MemoryIndex {
        let docs = [
            Document::new("zeta"),
            Document::new("alpha"),
            Document::new("mid"),
        ];
        MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap()
    }

    fn ids(ranked: &[RankedDocument]) -> Vec<&str> {
        ranked.iter().map(|d| d.external_id.as_str()).collect()
    }

    #[test]
    fn orders_by_score_descending() {
        let index = index();
        let list = [(0, 1.0), (1, 3.0), (2, 2.0)].into_iter().collect();
        assert_eq!(ids(&rank(&index, &list, 10).unwrap()), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn ties_break_by_external_id() {
        let index = index();
        let list = [(0, 1.0), (1, 1.0), (2, 1.0)].into_iter().collect();
        assert_eq!(ids(&rank(&index, &list, 10).unwrap()), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn truncates_to_limit() {
        let index = index();
        let list = [(0, 3.0), (1, 2.0), (2, 1.0)].into_iter().collect();
        let ranked = rank(&index, &list, 2).unwrap();
        assert_eq!(ids(&ranked), vec!["zeta", "alpha"]);
        assert!(rank(&index, &list, 0).unwrap().is_empty());
    }

    #[test]
    fn unknown_docid_is_an_error() {
        let index = index();
        let list = [(7, 1.0)].into_iter().collect();
        assert!(matches!(
            rank(&index, &list, 10),
            Err(EvalError::Index(IndexError::UnknownDocument(7)))
        ));
    }
}
