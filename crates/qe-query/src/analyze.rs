//! Text analysis seam used while parsing query terms.
//!
//! The parser never normalizes terms itself. Every term token is handed to an
//! [`Analyze`] implementation, which is expected to apply the same pipeline the
//! index used at indexing time.

/// Normalizes raw query text into index terms.
pub trait Analyze {
    /// Returns the normalized terms for `text`.
    ///
    /// An empty result means the text carries no indexable term (for example a
    /// stopword), and the parser drops it from the query.
    fn analyze(&self, text: &str) -> Vec<String>;
}

impl<F> Analyze for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn analyze(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Analyzer that only lowercases, for inspecting queries without an index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl Analyze for Lowercase {
    fn analyze(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_lowercase()]
        }
    }
}
