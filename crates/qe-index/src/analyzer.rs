//! Text analysis pipeline shared by indexing and query parsing.
//!
//! Implements a five-stage pipeline:
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `LowerCaser` - converts tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 4. `StopWordFilter` - removes English stopwords from the `stop-words` list
//! 5. `Stemmer` - applies language-specific stemming
//!
//! Removed tokens leave gaps in the position sequence, so proximity
//! operators see the original word distances.

use std::fmt;

use qe_query::Analyze;
use stop_words::LANGUAGE;
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};

use crate::IndexError;

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(IndexError::InvalidLanguage(other.to_string())),
    }
}

/// Builds the tantivy pipeline for the given stemmer language.
pub fn build_analyzer(language: Language) -> TextAnalyzer {
    let stopwords = stop_words::get(LANGUAGE::English)
        .iter()
        .map(|word| word.to_string());

    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(StopWordFilter::remove(stopwords))
        .filter(Stemmer::new(language))
        .build()
}

/// An analyzed token and its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// The normalized term.
    pub term: String,
    /// Word position, counting removed tokens.
    pub position: u32,
}

/// Reusable text analyzer.
///
/// Cloning is cheap relative to analysis; each call works on its own copy of
/// the tantivy pipeline, so a shared `Analyzer` can be used from `&self`.
#[derive(Clone)]
pub struct Analyzer {
    /// The configured pipeline.
    inner: TextAnalyzer,
    /// Stemmer language, kept for display.
    language: Language,
}

impl Analyzer {
    /// Creates an analyzer stemming for `language`.
    pub fn new(language: Language) -> Self {
        Self {
            inner: build_analyzer(language),
            language,
        }
    }

    /// Creates an analyzer from a stemmer language name.
    pub fn from_name(language_name: &str) -> Result<Self, IndexError> {
        Ok(Self::new(parse_language(language_name)?))
    }

    /// Returns the stemmer language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Analyzes `text`, keeping each token's position.
    pub fn tokens(&self, text: &str) -> Vec<AnalyzedToken> {
        let mut analyzer = self.inner.clone();
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            let token = stream.token();
            tokens.push(AnalyzedToken {
                term: token.text.clone(),
                position: u32::try_from(token.position).unwrap_or(u32::MAX),
            });
        }
        tokens
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Analyze for Analyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        self.tokens(text).into_iter().map(|t| t.term).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn terms(text: &str) -> Vec<String> {
        Analyzer::default().analyze(text)
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(parse_language("English").unwrap(), Language::English);
        assert_eq!(parse_language("FRENCH").unwrap(), Language::French);
    }

    #[test]
    fn parse_invalid_language() {
        let err = parse_language("klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn lowercases_and_stems() {
        assert_eq!(terms("Running HANDLING"), vec!["run", "handl"]);
    }

    #[test]
    fn removes_stopwords() {
        assert_eq!(terms("the zebra and the lion"), vec!["zebra", "lion"]);
        assert!(terms("the").is_empty());
    }

    #[test]
    fn stopwords_leave_position_gaps() {
        let tokens = Analyzer::default().tokens("zebra of the lion");
        let positions: Vec<u32> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3]);
    }

    #[test]
    fn removes_long_tokens() {
        let text = format!("zebra {} lion", "z".repeat(50));
        assert_eq!(terms(&text), vec!["zebra", "lion"]);
    }

    #[test]
    fn splits_punctuation() {
        assert_eq!(terms("zebra,lion-tiger"), vec!["zebra", "lion", "tiger"]);
    }

    #[test]
    fn from_invalid_name() {
        let err = Analyzer::from_name("invalid").unwrap_err();
        assert!(matches!(err, IndexError::InvalidLanguage(ref name) if name == "invalid"));
    }
}
