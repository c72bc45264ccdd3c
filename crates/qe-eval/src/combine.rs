//! Score-list combinations for `#AND`, `#OR`, `#SUM` and the probabilistic
//! operators.
//!
//! Boolean combinations only see documents that matched; probabilistic ones
//! fill gaps from each child's default score, supplied by the caller.

use std::{cmp::Ordering, collections::BTreeMap};

use qe_index::DocId;

use crate::{EvalError, ScoreList};

/// Documents matched by every list; the score is the minimum, or 1 when
/// `unranked`.
pub fn and(mut lists: Vec<ScoreList>, unranked: bool) -> ScoreList {
    lists.sort_by_key(ScoreList::len);
    let Some((shortest, rest)) = lists.split_first() else {
        return ScoreList::new();
    };
    let mut cursors = vec![0usize; rest.len()];
    let mut result = ScoreList::new();

    'documents: for entry in shortest.entries() {
        let mut score = entry.score;
        for (list, cursor) in rest.iter().zip(cursors.iter_mut()) {
            loop {
                let Some(other) = list.entries().get(*cursor) else {
                    break 'documents;
                };
                match other.docid.cmp(&entry.docid) {
                    Ordering::Less => *cursor += 1,
                    Ordering::Greater => continue 'documents,
                    Ordering::Equal => {
                        score = score.min(other.score);
                        break;
                    }
                }
            }
        }
        result.push(entry.docid, if unranked { 1.0 } else { score });
    }
    result
}

/// Folds every entry of every list into one score per document.
fn union(lists: &[ScoreList], fold: impl Fn(f64, f64) -> f64) -> BTreeMap<DocId, f64> {
    let mut scores = BTreeMap::new();
    for entry in lists.iter().flat_map(ScoreList::entries) {
        scores
            .entry(entry.docid)
            .and_modify(|score| *score = fold(*score, entry.score))
            .or_insert(entry.score);
    }
    scores
}

/// Documents matched by any list; the score is the maximum, or 1 when
/// `unranked`.
pub fn or(lists: &[ScoreList], unranked: bool) -> ScoreList {
    union(lists, f64::max)
        .into_iter()
        .map(|(docid, score)| (docid, if unranked { 1.0 } else { score }))
        .collect()
}

/// Documents matched by any list, scored by the sum of their scores.
pub fn sum(lists: &[ScoreList]) -> ScoreList {
    union(lists, |a, b| a + b).into_iter().collect()
}

/// Merges lists so that every document matched by any child gets a score
/// from all children.
///
/// A child that did not match the document contributes `default(child, docid)`;
/// `combine` turns the per-child scores, in child order, into one.
pub fn with_defaults(
    lists: &[ScoreList],
    mut default: impl FnMut(usize, DocId) -> Result<f64, EvalError>,
    combine: impl Fn(&[f64]) -> f64,
) -> Result<ScoreList, EvalError> {
    let mut cursors = vec![0usize; lists.len()];
    let mut scores = vec![0.0; lists.len()];
    let mut result = ScoreList::new();

    loop {
        let next = lists
            .iter()
            .zip(&cursors)
            .filter_map(|(list, &cursor)| list.entries().get(cursor))
            .map(|entry| entry.docid)
            .min();
        let Some(docid) = next else {
            break;
        };

        for (child, (list, cursor)) in lists.iter().zip(cursors.iter_mut()).enumerate() {
            scores[child] = match list.entries().get(*cursor) {
                Some(entry) if entry.docid == docid => {
                    *cursor += 1;
                    entry.score
                }
                _ => default(child, docid)?,
            };
        }
        result.push(docid, combine(&scores));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use qe_index::IndexError;

    use super::*;

    fn scores(entries: &[(DocId, f64)]) -> ScoreList {
        entries.iter().copied().collect()
    }

    #[test]
    fn and_takes_minimum() {
        let result = and(
            vec![
                scores(&[(1, 3.0), (2, 1.0), (5, 4.0)]),
                scores(&[(2, 2.0), (5, 1.5)]),
            ],
            false,
        );
        assert_eq!(result, scores(&[(2, 1.0), (5, 1.5)]));
    }

    #[test]
    fn and_unranked_scores_one() {
        let result = and(vec![scores(&[(1, 3.0)]), scores(&[(1, 7.0)])], true);
        assert_eq!(result, scores(&[(1, 1.0)]));
    }

    #[test]
    fn and_with_empty_child_is_empty() {
        assert!(and(vec![scores(&[(1, 1.0)]), ScoreList::new()], false).is_empty());
        assert!(and(Vec::new(), false).is_empty());
    }

    #[test]
    fn or_takes_maximum() {
        let result = or(&[scores(&[(1, 3.0), (4, 1.0)]), scores(&[(1, 5.0), (2, 2.0)])], false);
        assert_eq!(result, scores(&[(1, 5.0), (2, 2.0), (4, 1.0)]));
    }

    #[test]
    fn or_unranked_scores_one() {
        let result = or(&[scores(&[(3, 2.0)]), scores(&[(1, 5.0)])], true);
        assert_eq!(result, scores(&[(1, 1.0), (3, 1.0)]));
    }

    #[test]
    fn sum_adds_scores() {
        let result = sum(&[scores(&[(1, 0.5), (2, 1.0)]), scores(&[(2, 2.0)])]);
        assert_eq!(result, scores(&[(1, 0.5), (2, 3.0)]));
    }

    #[test]
    fn defaults_fill_missing_children() {
        let lists = [scores(&[(1, 0.5)]), scores(&[(2, 0.25)])];
        let defaults = [0.1, 0.2];
        let result = with_defaults(
            &lists,
            |child, _| Ok(defaults[child]),
            |values| values.iter().product(),
        )
        .unwrap();
        assert_eq!(result, scores(&[(1, 0.5 * 0.2), (2, 0.1 * 0.25)]));
    }

    #[test]
    fn default_errors_propagate() {
        let lists = [scores(&[(1, 0.5)]), ScoreList::new()];
        let result = with_defaults(
            &lists,
            |_, docid| Err(IndexError::UnknownDocument(docid).into()),
            |values| values[0],
        );
        assert!(result.is_err());
    }

    /// Strategy for a docid-ordered list with arbitrary positive scores.
    fn score_list() -> impl Strategy<Value = ScoreList> {
        prop::collection::btree_map(0u32..60, 0.1f64..10.0, 0..20)
            .prop_map(|entries| entries.into_iter().collect())
    }

    fn docids(list: &ScoreList) -> BTreeSet<DocId> {
        list.docids().collect()
    }

    proptest! {
        #[test]
        fn and_is_intersection(lists in prop::collection::vec(score_list(), 1..5)) {
            let expected = lists
                .iter()
                .map(docids)
                .reduce(|a, b| a.intersection(&b).copied().collect())
                .unwrap_or_default();
            let result = and(lists.clone(), false);
            prop_assert_eq!(docids(&result), expected);
            for entry in result.entries() {
                let min = lists
                    .iter()
                    .filter_map(|l| l.score_of(entry.docid))
                    .fold(f64::INFINITY, f64::min);
                prop_assert_eq!(entry.score, min);
            }
        }

        #[test]
        fn or_is_union(lists in prop::collection::vec(score_list(), 1..5)) {
            let expected: BTreeSet<DocId> = lists.iter().flat_map(docids).collect();
            let result = or(&lists, false);
            prop_assert_eq!(docids(&result), expected);
            let ordered: Vec<DocId> = result.docids().collect();
            prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
