//! Inverted-list operators: `#SYN`, `#NEAR/n` and `#WINDOW/n`.
//!
//! Every routine walks its inputs with cursors local to the call and returns
//! a fresh list; inputs are never modified.
//!
//! `#NEAR/n` matches are non-overlapping. Each position of the first list is
//! tried as an anchor; every following list contributes its first unused
//! position after the running position, which must lie within `n`. A match
//! consumes the positions it used, so one position never serves two anchors.

use std::cmp::Ordering;

use qe_index::{DocId, InvertedList};
use qe_query::DEFAULT_FIELD;
use tracing::trace;

use crate::EvalError;

/// Returns the field shared by all lists, or a `FieldMismatch` error.
fn shared_field(operator: &str, lists: &[InvertedList]) -> Result<String, EvalError> {
    let Some(first) = lists.first() else {
        return Ok(DEFAULT_FIELD.to_string());
    };
    if let Some(other) = lists.iter().find(|l| l.field() != first.field()) {
        return Err(EvalError::FieldMismatch {
            operator: operator.to_string(),
            expected: first.field().to_string(),
            found: other.field().to_string(),
        });
    }
    Ok(first.field().to_string())
}

/// Merges lists as if they were one term.
pub fn syn(lists: &[InvertedList]) -> Result<InvertedList, EvalError> {
    let mut result = InvertedList::new(shared_field("#syn", lists)?);
    let mut cursors = vec![0usize; lists.len()];

    loop {
        let next = lists
            .iter()
            .zip(&cursors)
            .filter_map(|(list, &cursor)| list.postings().get(cursor))
            .map(|posting| posting.docid)
            .min();
        let Some(docid) = next else {
            break;
        };

        let mut positions = Vec::new();
        for (list, cursor) in lists.iter().zip(cursors.iter_mut()) {
            if let Some(posting) = list.postings().get(*cursor)
                && posting.docid == docid
            {
                positions.extend_from_slice(&posting.positions);
                *cursor += 1;
            }
        }
        positions.sort_unstable();
        result.append_posting(docid, positions)?;
    }

    trace!(target: "qe::eval", df = result.df(), "merged #syn");
    Ok(result)
}

/// Calls `visit` for every document present in all lists, with the
/// document's positions from each list in argument order.
///
/// Stops as soon as any list other than the first runs out of documents.
fn for_each_common_document(
    lists: &[InvertedList],
    mut visit: impl FnMut(DocId, &[&[u32]]) -> Result<(), EvalError>,
) -> Result<(), EvalError> {
    let Some((first, rest)) = lists.split_first() else {
        return Ok(());
    };
    let mut cursors = vec![0usize; rest.len()];

    'documents: for posting in first.postings() {
        let mut positions: Vec<&[u32]> = Vec::with_capacity(lists.len());
        positions.push(&posting.positions);

        for (list, cursor) in rest.iter().zip(cursors.iter_mut()) {
            loop {
                let Some(other) = list.postings().get(*cursor) else {
                    break 'documents;
                };
                match other.docid.cmp(&posting.docid) {
                    Ordering::Less => *cursor += 1,
                    Ordering::Greater => continue 'documents,
                    Ordering::Equal => {
                        positions.push(&other.positions);
                        break;
                    }
                }
            }
        }

        visit(posting.docid, &positions)?;
    }
    Ok(())
}

/// Anchor positions of ordered, non-overlapping matches within one document.
fn near_positions(positions: &[&[u32]], distance: u32) -> Vec<u32> {
    let Some((anchors, rest)) = positions.split_first() else {
        return Vec::new();
    };
    let mut pointers = vec![0usize; rest.len()];
    let mut matches = Vec::new();

    'anchors: for &anchor in *anchors {
        let mut previous = anchor;
        for (list, pointer) in rest.iter().zip(pointers.iter_mut()) {
            while list.get(*pointer).is_some_and(|&p| p <= previous) {
                *pointer += 1;
            }
            let Some(&next) = list.get(*pointer) else {
                break 'anchors;
            };
            if next - previous > distance {
                continue 'anchors;
            }
            previous = next;
        }

        matches.push(anchor);
        for pointer in &mut pointers {
            *pointer += 1;
        }
    }

    matches
}

/// Ordered proximity: each list follows the previous within `distance`.
pub fn near(lists: &[InvertedList], distance: u32) -> Result<InvertedList, EvalError> {
    let mut result = InvertedList::new(shared_field("#near", lists)?);

    for_each_common_document(lists, |docid, positions| {
        let matches = near_positions(positions, distance);
        if !matches.is_empty() {
            result.append_posting(docid, matches)?;
        }
        Ok(())
    })?;

    trace!(target: "qe::eval", distance, df = result.df(), "merged #near");
    Ok(result)
}

/// First-list positions of unordered windows within one document.
fn window_positions(positions: &[&[u32]], distance: u32) -> Vec<u32> {
    let mut pointers = vec![0usize; positions.len()];
    let mut matches = Vec::new();

    loop {
        let mut first = None;
        let mut min: Option<(usize, u32)> = None;
        let mut max = 0;

        for (index, (list, &pointer)) in positions.iter().zip(&pointers).enumerate() {
            let Some(&position) = list.get(pointer) else {
                return matches;
            };
            if index == 0 {
                first = Some(position);
            }
            if min.is_none_or(|(_, lowest)| position < lowest) {
                min = Some((index, position));
            }
            max = max.max(position);
        }

        let (Some(first), Some((min_index, lowest))) = (first, min) else {
            return matches;
        };

        if max - lowest + 1 > distance {
            pointers[min_index] += 1;
        } else {
            matches.push(first);
            for pointer in &mut pointers {
                *pointer += 1;
            }
        }
    }
}

/// Unordered proximity: one position of every list inside a span of `distance`.
pub fn window(lists: &[InvertedList], distance: u32) -> Result<InvertedList, EvalError> {
    let mut result = InvertedList::new(shared_field("#window", lists)?);

    for_each_common_document(lists, |docid, positions| {
        let matches = window_positions(positions, distance);
        if !matches.is_empty() {
            result.append_posting(docid, matches)?;
        }
        Ok(())
    })?;

    trace!(target: "qe::eval", distance, df = result.df(), "merged #window");
    Ok(result)
}
