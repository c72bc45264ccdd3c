//! TREC run files: writing results and reading initial rankings.
//!
//! A run line is `<qid> Q0 <external-id> <rank> <score> <run-id>`, with the
//! score printed to twelve decimal places. A query with no results gets a
//! single sentinel row naming the document `dummy`, so every query appears
//! in the run.

use std::{
    collections::{BTreeMap, HashMap},
    io::{BufRead, Write},
};

use qe_index::{DocId, IndexReader};
use tracing::debug;

use crate::{EvalError, RankedDocument, ScoreList};

/// External id of the row written for queries without results.
pub const SENTINEL_DOCUMENT: &str = "dummy";

/// Formats one run line.
pub fn format_line(query_id: &str, external_id: &str, rank: usize, score: f64, run_id: &str) -> String {
    format!("{query_id} Q0 {external_id} {rank} {score:.12} {run_id}")
}

/// Writes the ranking for one query, ranks starting at 1.
pub fn write_ranking<W: Write>(
    out: &mut W,
    query_id: &str,
    ranked: &[RankedDocument],
    run_id: &str,
) -> Result<(), EvalError> {
    if ranked.is_empty() {
        writeln!(out, "{}", format_line(query_id, SENTINEL_DOCUMENT, 1, 0.0, run_id))?;
        return Ok(());
    }
    for (index, doc) in ranked.iter().enumerate() {
        writeln!(
            out,
            "{}",
            format_line(query_id, &doc.external_id, index + 1, doc.score, run_id)
        )?;
    }
    Ok(())
}

/// Per-query score lists read from a run file.
#[derive(Debug, Clone, Default)]
pub struct InitialRanking {
    /// Scores keyed by query id, each in docid order.
    queries: HashMap<String, ScoreList>,
}

impl InitialRanking {
    /// Reads a run file, mapping external ids through `index`.
    ///
    /// Each query's lines must be contiguous. Rank and run-id columns are
    /// checked for shape and otherwise ignored; scores are taken as given.
    pub fn read<R: BufRead, I: IndexReader>(reader: R, index: &I) -> Result<Self, EvalError> {
        let mut queries: HashMap<String, BTreeMap<DocId, f64>> = HashMap::new();
        let mut current: Option<String> = None;

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let number = number + 1;
            if line.trim().is_empty() {
                continue;
            }
            let error = |message: String| EvalError::RankingFile {
                line: number,
                message,
            };

            let columns: Vec<&str> = line.split_whitespace().collect();
            let [query_id, _, external_id, rank, score, _] = columns[..] else {
                return Err(error(format!(
                    "expected 6 columns, found {}",
                    columns.len()
                )));
            };
            rank.parse::<usize>()
                .map_err(|_| error(format!("invalid rank '{rank}'")))?;
            let score = score
                .parse::<f64>()
                .map_err(|_| error(format!("invalid score '{score}'")))?;

            if current.as_deref() != Some(query_id) {
                if queries.contains_key(query_id) {
                    return Err(error(format!(
                        "lines for query {query_id} are not contiguous"
                    )));
                }
                current = Some(query_id.to_string());
            }

            let docid = index.internal_id(external_id)?;
            let previous = queries
                .entry(query_id.to_string())
                .or_default()
                .insert(docid, score);
            if previous.is_some() {
                return Err(error(format!(
                    "query {query_id} lists {external_id} twice"
                )));
            }
        }

        let ranking = Self {
            queries: queries
                .into_iter()
                .map(|(query_id, scores)| (query_id, scores.into_iter().collect()))
                .collect(),
        };
        debug!(
            target: "qe::trec",
            queries = ranking.queries.len(),
            "read initial ranking"
        );
        Ok(ranking)
    }

    /// Scores for `query_id`, if the file ranked it.
    pub fn get(&self, query_id: &str) -> Option<&ScoreList> {
        self.queries.get(query_id)
    }

    /// Number of queries in the file.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns true if the file held no rankings.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use qe_index::{Analyzer, Document, IndexError, MemoryIndex};

    use super::*;

    fn index() -> MemoryIndex {
        let docs = [Document::new("a"), Document::new("b"), Document::new("c")];
        MemoryIndex::from_documents(Analyzer::default(), &docs).unwrap()
    }

    fn output(ranked: &[RankedDocument]) -> String {
        let mut out = Vec::new();
        write_ranking(&mut out, "7", ranked, "run-1").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_ranked_lines() {
        let ranked = [
            RankedDocument {
                docid: 1,
                external_id: "b".into(),
                score: 2.5,
            },
            RankedDocument {
                docid: 0,
                external_id: "a".into(),
                score: 0.125,
            },
        ];
        assert_eq!(
            output(&ranked),
            "7 Q0 b 1 2.500000000000 run-1\n7 Q0 a 2 0.125000000000 run-1\n"
        );
    }

    #[test]
    fn empty_ranking_writes_sentinel() {
        assert_eq!(output(&[]), "7 Q0 dummy 1 0.000000000000 run-1\n");
    }

    #[test]
    fn reads_grouped_rankings() {
        let file = "1 Q0 b 1 3.5 run\n1 Q0 a 2 1.0 run\n\n2 Q0 c 1 0.5 run\n";
        let ranking = InitialRanking::read(Cursor::new(file), &index()).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(
            ranking.get("1"),
            Some(&[(0, 1.0), (1, 3.5)].into_iter().collect::<ScoreList>())
        );
        assert!(ranking.get("3").is_none());
    }

    #[test]
    fn rejects_short_lines() {
        let err = InitialRanking::read(Cursor::new("1 Q0 a 1 run\n"), &index()).unwrap_err();
        assert!(matches!(err, EvalError::RankingFile { line: 1, .. }));
    }

    #[test]
    fn rejects_bad_scores() {
        let err = InitialRanking::read(Cursor::new("1 Q0 a 1 high run\n"), &index()).unwrap_err();
        assert!(err.to_string().contains("invalid score"));
    }

    #[test]
    fn rejects_split_query_blocks() {
        let file = "1 Q0 a 1 1.0 r\n2 Q0 b 1 1.0 r\n1 Q0 c 2 0.5 r\n";
        let err = InitialRanking::read(Cursor::new(file), &index()).unwrap_err();
        assert!(matches!(err, EvalError::RankingFile { line: 3, .. }));
    }

    #[test]
    fn rejects_unknown_documents() {
        let err = InitialRanking::read(Cursor::new("1 Q0 zz 1 1.0 r\n"), &index()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Index(IndexError::ExternalIdNotFound(_))
        ));
    }

    #[test]
    fn rejects_repeated_documents() {
        let file = "1 Q0 a 1 1.0 r\n1 Q0 a 2 0.5 r\n";
        let err = InitialRanking::read(Cursor::new(file), &index()).unwrap_err();
        assert!(matches!(err, EvalError::RankingFile { line: 2, .. }));
        assert!(err.to_string().contains("lists a twice"));
    }
}
