//! Retrieval models.
//!
//! A [`RetrievalModel`] decides how `#SCORE` turns postings into scores, what
//! score a document gets for a term it lacks, and how `#AND`/`#OR` combine
//! their arguments. Parameters are validated once, at construction.

use std::fmt;

use qe_query::QueryDialect;

use crate::EvalError;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation, `k1 >= 0`.
    pub k1: f64,
    /// Length normalization, `0 <= b <= 1`.
    pub b: f64,
    /// Query-term-frequency saturation, `k3 >= 0`.
    pub k3: f64,
}

impl Bm25Params {
    /// Validates and creates BM25 parameters.
    pub fn new(k1: f64, b: f64, k3: f64) -> Result<Self, EvalError> {
        if !(k1.is_finite() && k1 >= 0.0) {
            return Err(EvalError::invalid("k1", k1, "a finite value >= 0"));
        }
        if !(0.0..=1.0).contains(&b) {
            return Err(EvalError::invalid("b", b, "a value between 0 and 1"));
        }
        if !(k3.is_finite() && k3 >= 0.0) {
            return Err(EvalError::invalid("k3", k3, "a finite value >= 0"));
        }
        Ok(Self { k1, b, k3 })
    }

    /// Scores one posting. The query term frequency is always 1.
    pub fn score(&self, idf: f64, tf: f64, doclen: f64, avg_doclen: f64) -> f64 {
        let length_ratio = if avg_doclen > 0.0 {
            doclen / avg_doclen
        } else {
            0.0
        };
        let tf_weight = tf / (tf + self.k1 * ((1.0 - self.b) + self.b * length_ratio));
        let qtf = 1.0;
        let user_weight = (self.k3 + 1.0) * qtf / (self.k3 + qtf);
        idf * tf_weight * user_weight
    }
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            k3: 0.0,
        }
    }
}

/// Robertson-Sparck Jones idf, clamped at zero for very common terms.
pub fn bm25_idf(num_docs: u64, df: usize) -> f64 {
    let n = num_docs as f64;
    let df = df as f64;
    ((n - df + 0.5) / (df + 0.5)).ln().max(0.0)
}

/// Indri (Dirichlet plus Jelinek-Mercer) smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndriParams {
    /// Dirichlet prior, `mu >= 0`.
    pub mu: f64,
    /// Linear interpolation weight, `0 <= lambda <= 1`.
    pub lambda: f64,
}

impl IndriParams {
    /// Validates and creates Indri parameters.
    pub fn new(mu: f64, lambda: f64) -> Result<Self, EvalError> {
        if !(mu.is_finite() && mu >= 0.0) {
            return Err(EvalError::invalid("mu", mu, "a finite value >= 0"));
        }
        if !(0.0..=1.0).contains(&lambda) {
            return Err(EvalError::invalid("lambda", lambda, "a value between 0 and 1"));
        }
        Ok(Self { mu, lambda })
    }

    /// Smoothed term probability; `tf = 0` gives the default score.
    pub fn score(&self, tf: f64, doclen: f64, mle: f64) -> f64 {
        let denominator = doclen + self.mu;
        let smoothed = if denominator > 0.0 {
            (tf + self.mu * mle) / denominator
        } else {
            0.0
        };
        (1.0 - self.lambda) * smoothed + self.lambda * mle
    }
}

impl Default for IndriParams {
    fn default() -> Self {
        Self {
            mu: 2500.0,
            lambda: 0.4,
        }
    }
}

/// Maximum-likelihood collection probability of a term.
pub fn collection_probability(ctf: u64, collection_length: u64) -> f64 {
    if collection_length == 0 {
        0.0
    } else {
        ctf as f64 / collection_length as f64
    }
}

/// A validated retrieval model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalModel {
    /// Exact Boolean match; every match scores 1.
    UnrankedBoolean,
    /// Boolean match scored by term frequency.
    RankedBoolean,
    /// Okapi BM25.
    Bm25(Bm25Params),
    /// Indri query likelihood.
    Indri(IndriParams),
}

impl RetrievalModel {
    /// Creates a BM25 model, validating its parameters.
    pub fn bm25(k1: f64, b: f64, k3: f64) -> Result<Self, EvalError> {
        Ok(Self::Bm25(Bm25Params::new(k1, b, k3)?))
    }

    /// Creates an Indri model, validating its parameters.
    pub fn indri(mu: f64, lambda: f64) -> Result<Self, EvalError> {
        Ok(Self::Indri(IndriParams::new(mu, lambda)?))
    }

    /// The query dialect queries are parsed with under this model.
    pub fn dialect(&self) -> QueryDialect {
        match self {
            Self::UnrankedBoolean | Self::RankedBoolean => QueryDialect::Boolean,
            Self::Bm25(_) => QueryDialect::Bm25,
            Self::Indri(_) => QueryDialect::Indri,
        }
    }

    /// Returns true for the unranked Boolean model.
    pub fn is_unranked(&self) -> bool {
        matches!(self, Self::UnrankedBoolean)
    }
}

impl fmt::Display for RetrievalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrankedBoolean => f.write_str("UnrankedBoolean"),
            Self::RankedBoolean => f.write_str("RankedBoolean"),
            Self::Bm25(p) => write!(f, "BM25(k1={}, b={}, k3={})", p.k1, p.b, p.k3),
            Self::Indri(p) => write!(f, "Indri(mu={}, lambda={})", p.mu, p.lambda),
        }
    }
}
