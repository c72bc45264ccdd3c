//! Batch evaluation of a query file.
//!
//! Query files hold one `<qid>:<query text>` per line. Queries run in file
//! order and each writes its ranking before the next starts. A query that
//! fails is logged, gets the sentinel row, and does not stop the batch.

use std::io::Write;

use qe_index::IndexReader;
use tracing::{info, warn};

use crate::{
    EvalError, FeedbackParams, InitialRanking, QueryEngine, RankedDocument, ScoreList, feedback,
    trec::write_ranking,
};

/// One line of a query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLine {
    /// Query id, written in the first run column.
    pub id: String,
    /// Query text.
    pub text: String,
}

/// Parses a query file. Blank lines are skipped.
pub fn parse_queries(content: &str) -> Result<Vec<QueryLine>, EvalError> {
    let mut queries = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((id, text)) = line.split_once(':') else {
            return Err(EvalError::QueryFile {
                line: number + 1,
                message: "expected <qid>:<query>".to_string(),
            });
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(EvalError::QueryFile {
                line: number + 1,
                message: "empty query id".to_string(),
            });
        }
        queries.push(QueryLine {
            id: id.to_string(),
            text: text.trim().to_string(),
        });
    }
    Ok(queries)
}

/// Settings shared by every query of a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Run identifier, written in the last column.
    pub run_id: String,
    /// Maximum documents written per query.
    pub limit: usize,
    /// Expand every query with pseudo-relevance feedback.
    pub feedback: Option<FeedbackParams>,
    /// Feedback starts from these rankings instead of running the query.
    pub initial_ranking: Option<InitialRanking>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            run_id: "run-1".to_string(),
            limit: 100,
            feedback: None,
            initial_ranking: None,
        }
    }
}

/// A query the batch could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedQuery {
    /// Query id.
    pub id: String,
    /// Error message.
    pub message: String,
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Queries that produced a ranking.
    pub evaluated: usize,
    /// Queries that failed.
    pub failed: Vec<FailedQuery>,
    /// Expansion records, `<qid>: <learned query>`, when feedback ran.
    pub expansions: Vec<String>,
}

impl BatchSummary {
    /// Returns true if every query succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ranks one query, expanding it when feedback is on.
fn evaluate_query<I: IndexReader>(
    engine: &QueryEngine<'_, I>,
    query: &QueryLine,
    options: &BatchOptions,
) -> Result<(Vec<RankedDocument>, Option<String>), EvalError> {
    let Some(params) = &options.feedback else {
        let results = engine.run(&query.text)?;
        return Ok((engine.rank(&results, options.limit)?, None));
    };

    let initial = match &options.initial_ranking {
        Some(ranking) => ranking.get(&query.id).cloned().unwrap_or_else(ScoreList::new),
        None => engine.run(&query.text)?,
    };
    let expansion = feedback::expand(engine, &query.text, &initial, params)?;
    let record = expansion.record(&query.id, &query.text);
    Ok((engine.rank(&expansion.results, options.limit)?, Some(record)))
}

/// Evaluates `queries` in order, writing a TREC run to `out`.
///
/// Only output failures abort the batch.
pub fn run_batch<I: IndexReader, W: Write>(
    engine: &QueryEngine<'_, I>,
    queries: &[QueryLine],
    options: &BatchOptions,
    out: &mut W,
) -> Result<BatchSummary, EvalError> {
    let mut summary = BatchSummary::default();

    for query in queries {
        match evaluate_query(engine, query, options) {
            Ok((ranked, record)) => {
                info!(
                    target: "qe::batch",
                    query = %query.id,
                    results = ranked.len(),
                    "evaluated"
                );
                write_ranking(out, &query.id, &ranked, &options.run_id)?;
                summary.evaluated += 1;
                summary.expansions.extend(record);
            }
            Err(err) => {
                warn!(target: "qe::batch", query = %query.id, error = %err, "query failed");
                write_ranking(out, &query.id, &[], &options.run_id)?;
                summary.failed.push(FailedQuery {
                    id: query.id.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_lines() {
        let queries = parse_queries("10:apple pie\n\n 11 : #AND(a b)\n").unwrap();
        assert_eq!(
            queries,
            vec![
                QueryLine {
                    id: "10".into(),
                    text: "apple pie".into()
                },
                QueryLine {
                    id: "11".into(),
                    text: "#AND(a b)".into()
                },
            ]
        );
    }

    #[test]
    fn colon_in_text_is_kept() {
        let queries = parse_queries("3:apple.title:pie").unwrap();
        assert_eq!(queries[0].text, "apple.title:pie");
    }

    #[test]
    fn rejects_line_without_id() {
        assert!(matches!(
            parse_queries("1:ok\nno separator\n"),
            Err(EvalError::QueryFile { line: 2, .. })
        ));
        assert!(matches!(
            parse_queries(":text"),
            Err(EvalError::QueryFile { line: 1, .. })
        ));
    }

    #[test]
    fn default_options() {
        let options = BatchOptions::default();
        assert_eq!(options.run_id, "run-1");
        assert_eq!(options.limit, 100);
        assert!(options.feedback.is_none());
    }
}
