//! Pseudo-relevance feedback.
//!
//! The top documents of an initial ranking are assumed relevant. Every stem
//! they contain is scored as a candidate expansion term:
//!
//! ```text
//! score(t) = sum over top docs d of  p(t|d) * score(d) * ln(1 / p(t|C))
//! p(t|d)   = tf(t,d) / (len(d) + mu)            if d contains t
//!          = mu * p(t|C) / (len(d) + mu)        otherwise
//! ```
//!
//! The best terms form a `#WAND` learned query, which is blended with the
//! original query and evaluated in its place. Learned terms are index stems,
//! so the learned query is built as a tree and never analyzed again.

use std::collections::BTreeMap;

use qe_index::{IndexReader, TermVector};
use qe_query::{DEFAULT_FIELD, QueryNode, Weighted};
use tracing::{debug, info};

use crate::{EvalError, QueryEngine, ScoreList, model::collection_probability, rank};

/// Feedback parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackParams {
    /// Number of top documents treated as relevant, `> 0`.
    pub docs: usize,
    /// Number of expansion terms kept, `> 0`.
    pub terms: usize,
    /// Dirichlet prior for term probabilities, `>= 0`.
    pub mu: f64,
    /// Weight of the original query, `0 <= w <= 1`.
    pub orig_weight: f64,
    /// Field expansion terms are drawn from.
    pub field: String,
}

impl FeedbackParams {
    /// Validates and creates feedback parameters for the body field.
    pub fn new(docs: usize, terms: usize, mu: f64, orig_weight: f64) -> Result<Self, EvalError> {
        if docs == 0 {
            return Err(EvalError::invalid("fbDocs", docs, "an integer > 0"));
        }
        if terms == 0 {
            return Err(EvalError::invalid("fbTerms", terms, "an integer > 0"));
        }
        if !(mu.is_finite() && mu >= 0.0) {
            return Err(EvalError::invalid("fbMu", mu, "a finite value >= 0"));
        }
        if !(0.0..=1.0).contains(&orig_weight) {
            return Err(EvalError::invalid(
                "fbOrigWeight",
                orig_weight,
                "a value between 0 and 1",
            ));
        }
        Ok(Self {
            docs,
            terms,
            mu,
            orig_weight,
            field: DEFAULT_FIELD.to_string(),
        })
    }

    /// Draws expansion terms from `field` instead of the body.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            docs: 10,
            terms: 10,
            mu: 0.0,
            orig_weight: 0.5,
            field: DEFAULT_FIELD.to_string(),
        }
    }
}

/// A candidate expansion term and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnedTerm {
    /// The stem, as stored in the index.
    pub term: String,
    /// Feedback score.
    pub score: f64,
}

/// Result of expanding one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The learned `#WAND` query, or `None` when the initial ranking was empty.
    pub learned_query: Option<String>,
    /// The blended query that produced `results`.
    pub expanded_query: Option<String>,
    /// Scores of the expanded query, or the empty initial ranking.
    pub results: ScoreList,
}

impl Expansion {
    /// The line recorded for this query: `<qid>: <learned query>`, or the
    /// original query when nothing was learned.
    pub fn record(&self, query_id: &str, original: &str) -> String {
        format!(
            "{query_id}: {}",
            self.learned_query.as_deref().unwrap_or(original)
        )
    }
}

/// One top-ranked document's contribution data.
struct FeedbackDocument {
    /// Stems of the feedback field.
    vector: TermVector,
    /// Length of the feedback field.
    length: f64,
    /// Score in the initial ranking.
    score: f64,
}

/// Scores every stem of the top `params.docs` documents of `initial` and
/// returns the best `params.terms`, highest first, ties by term.
pub fn learn_terms<I: IndexReader>(
    index: &I,
    initial: &ScoreList,
    params: &FeedbackParams,
) -> Result<Vec<LearnedTerm>, EvalError> {
    let field = params.field.as_str();
    let collection_length = index.field_stats(field).total_term_occurrences;

    let mut documents = Vec::new();
    for doc in rank::rank(index, initial, params.docs)? {
        documents.push(FeedbackDocument {
            vector: index.term_vector(doc.docid, field)?,
            length: index.doc_length(field, doc.docid)? as f64,
            score: doc.score,
        });
    }

    // Stems that could not be parsed back as query terms are skipped.
    let mut candidates: BTreeMap<&str, u64> = BTreeMap::new();
    for entry in documents.iter().flat_map(|d| &d.vector.entries) {
        if !entry.stem.contains(['.', ',']) {
            candidates.insert(&entry.stem, entry.ctf);
        }
    }

    let mut learned = Vec::with_capacity(candidates.len());
    for (term, ctf) in candidates {
        let mle = collection_probability(ctf, collection_length);
        if mle <= 0.0 {
            continue;
        }
        let idf = (1.0 / mle).ln();
        let mut score = 0.0;
        for doc in &documents {
            let denominator = doc.length + params.mu;
            if denominator <= 0.0 {
                continue;
            }
            let weight = doc
                .vector
                .get(term)
                .map_or(params.mu * mle, |e| f64::from(e.tf));
            score += weight / denominator * doc.score * idf;
        }
        learned.push(LearnedTerm {
            term: term.to_string(),
            score,
        });
    }

    learned.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
    learned.truncate(params.terms);
    Ok(learned)
}

/// Formats learned terms as a `#wand` query over `field`.
///
/// This is the text recorded for a query; evaluation uses
/// [`learned_node`], which keeps the stems exactly.
pub fn learned_query(terms: &[LearnedTerm], field: &str) -> String {
    let parts: Vec<String> = terms
        .iter()
        .map(|t| {
            if field == DEFAULT_FIELD {
                format!("{:.4} {}", t.score, t.term)
            } else {
                format!("{:.4} {}.{}", t.score, t.term, field)
            }
        })
        .collect();
    format!("#wand({})", parts.join(" "))
}

/// Builds the learned `#wand` over `field` from index stems.
///
/// Returns `None` when nothing was learned.
pub fn learned_node(terms: &[LearnedTerm], field: &str) -> Option<QueryNode> {
    if terms.is_empty() {
        return None;
    }
    // Weights match the four-decimal text of the recorded query.
    let children = terms
        .iter()
        .map(|t| {
            let weight = (t.score * 1e4).round() / 1e4;
            Weighted::new(weight, QueryNode::term(t.term.as_str(), field))
        })
        .collect();
    Some(QueryNode::Wand(children))
}

/// Expands `query` from the top of `initial` and evaluates the result.
///
/// The expanded tree is the model's default operator around
/// `#wand(w original (1 - w) learned)`, with the original query wrapped in
/// the default operator too. An empty initial ranking leaves nothing to
/// learn from; the query is returned unexpanded with the empty ranking.
pub fn expand<I: IndexReader>(
    engine: &QueryEngine<'_, I>,
    query: &str,
    initial: &ScoreList,
    params: &FeedbackParams,
) -> Result<Expansion, EvalError> {
    if initial.is_empty() {
        debug!(target: "qe::feedback", query, "no documents to learn from");
        return Ok(Expansion {
            learned_query: None,
            expanded_query: None,
            results: ScoreList::new(),
        });
    }

    let terms = learn_terms(engine.index(), initial, params)?;
    let learned = learned_query(&terms, &params.field);
    let dialect = engine.model().dialect();

    let mut blend = Vec::with_capacity(2);
    if let Some(original) = engine.parse(&dialect.wrap(query))? {
        blend.push(Weighted::new(params.orig_weight, original));
    }
    if let Some(node) = learned_node(&terms, &params.field) {
        blend.push(Weighted::new(1.0 - params.orig_weight, node));
    }
    if blend.is_empty() {
        debug!(target: "qe::feedback", query, "expanded query is empty");
        return Ok(Expansion {
            learned_query: Some(learned),
            expanded_query: None,
            results: ScoreList::new(),
        });
    }

    let expanded = dialect.wrap_nodes(vec![QueryNode::Wand(blend)]);
    let expanded_query = expanded.to_query_string();
    info!(
        target: "qe::feedback",
        terms = terms.len(),
        learned = %learned,
        "expanded query"
    );

    let results = engine.evaluate(&expanded)?;
    Ok(Expansion {
        learned_query: Some(learned),
        expanded_query: Some(expanded_query),
        results,
    })
}
