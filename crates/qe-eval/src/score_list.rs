//! Score lists and default scores.

use qe_index::DocId;

/// One document's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEntry {
    /// Internal document id.
    pub docid: DocId,
    /// Score under the active model.
    pub score: f64,
}

/// Scores of matching documents.
///
/// Lists produced by evaluation hold at most one entry per docid, in
/// ascending docid order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreList {
    /// The entries.
    entries: Vec<ScoreEntry>,
}

impl ScoreList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a score.
    pub fn push(&mut self, docid: DocId, score: f64) {
        self.entries.push(ScoreEntry { docid, score });
    }

    /// The entries in stored order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no document scored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document ids in stored order.
    pub fn docids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.entries.iter().map(|e| e.docid)
    }

    /// Score of `docid`, if present. Assumes docid order.
    pub fn score_of(&self, docid: DocId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&docid, |e| e.docid)
            .ok()
            .map(|index| self.entries[index].score)
    }
}

impl FromIterator<(DocId, f64)> for ScoreList {
    fn from_iter<T: IntoIterator<Item = (DocId, f64)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(docid, score)| ScoreEntry { docid, score })
                .collect(),
        }
    }
}

/// How a node scores a document it did not match.
///
/// Only probabilistic combinations consult defaults; every other operator
/// contributes `Constant(0.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultScore {
    /// The same score for every document.
    Constant(f64),
    /// Indri smoothing of an unmatched term.
    Term {
        /// Field the term was scored in.
        field: String,
        /// Collection frequency of the term.
        ctf: u64,
    },
    /// Geometric mean of the children's defaults.
    Mean(Vec<DefaultScore>),
    /// Weighted geometric mean, weights already normalized.
    Product(Vec<(f64, DefaultScore)>),
    /// Weighted arithmetic mean, weights already normalized.
    Sum(Vec<(f64, DefaultScore)>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_docid() {
        let list: ScoreList = [(1, 0.5), (4, 2.0), (9, 1.0)].into_iter().collect();
        assert_eq!(list.score_of(4), Some(2.0));
        assert_eq!(list.score_of(5), None);
        assert_eq!(list.docids().collect::<Vec<_>>(), vec![1, 4, 9]);
    }

    #[test]
    fn push_keeps_order() {
        let mut list = ScoreList::new();
        assert!(list.is_empty());
        list.push(3, 1.5);
        list.push(7, 0.25);
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.entries()[1],
            ScoreEntry {
                docid: 7,
                score: 0.25
            }
        );
    }
}
