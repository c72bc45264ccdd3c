//! Query lexer (tokenizer).
//!
//! Splits a query string into operators, parentheses and words. Whitespace
//! and commas separate tokens and are discarded; parentheses are tokens of
//! their own.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An operator name with the leading `#` stripped, as written
    /// (e.g. `#NEAR/3` produces `Operator("NEAR/3")`).
    Operator(String),

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// A bare word: a query term, `term.field`, or a weight.
    Word(String),
}

/// A token together with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte position of the token's first character.
    pub position: usize,
}

/// Returns true for characters that end a word or operator.
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || ch == ',' || ch == '(' || ch == ')'
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Spanned>, LexError> {
        self.skip_separators();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let position = self.position;
        let token = match ch {
            '(' => {
                self.advance();
                Token::LParen
            }
            ')' => {
                self.advance();
                Token::RParen
            }
            '#' => {
                self.advance();
                let name = self.read_word();
                if name.is_empty() {
                    return Err(LexError::new(
                        "expected operator name after '#'",
                        position,
                        self.input,
                    ));
                }
                Token::Operator(name)
            }
            _ => Token::Word(self.read_word()),
        };

        Ok(Some(Spanned { token, position }))
    }

    /// Reads characters up to the next delimiter.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if is_delimiter(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    /// Skips whitespace and commas.
    fn skip_separators(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string, keeping token start positions.
pub fn tokenize_spanned(input: &str) -> Result<Vec<Spanned>, LexError> {
    Lexer::new(input).tokenize()
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Ok(tokenize_spanned(input)?
        .into_iter()
        .map(|spanned| spanned.token)
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.into())
    }

    fn op(s: &str) -> Token {
        Token::Operator(s.into())
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize(" , \t").unwrap(), vec![]);
    }

    #[test]
    fn bare_words() {
        assert_eq!(
            tokenize("apple pie.title").unwrap(),
            vec![word("apple"), word("pie.title")]
        );
    }

    #[test]
    fn operator_with_arguments() {
        assert_eq!(
            tokenize("#AND(a, b)").unwrap(),
            vec![op("AND"), Token::LParen, word("a"), word("b"), Token::RParen]
        );
    }

    #[test]
    fn operator_keeps_distance_suffix() {
        assert_eq!(
            tokenize("#near/3 ( a b )").unwrap(),
            vec![
                op("near/3"),
                Token::LParen,
                word("a"),
                word("b"),
                Token::RParen
            ]
        );
    }

    #[test]
    fn weights_are_words() {
        assert_eq!(
            tokenize("#wand(0.5 a 1e-3 b)").unwrap(),
            vec![
                op("wand"),
                Token::LParen,
                word("0.5"),
                word("a"),
                word("1e-3"),
                word("b"),
                Token::RParen
            ]
        );
    }

    #[test]
    fn adjacent_parentheses() {
        assert_eq!(
            tokenize("((a))").unwrap(),
            vec![
                Token::LParen,
                Token::LParen,
                word("a"),
                Token::RParen,
                Token::RParen
            ]
        );
    }

    #[test]
    fn bare_hash_is_an_error() {
        let err = tokenize("a # b").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.message.contains("operator name"));
    }

    #[test]
    fn positions_are_byte_offsets() {
        let spans = tokenize_spanned("é #or(b)").unwrap();
        let positions: Vec<usize> = spans.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 3, 6, 7, 8]);
    }

    proptest! {
        #[test]
        fn words_never_contain_delimiters(input in "[a-z #(),.0-9/]{0,40}") {
            if let Ok(tokens) = tokenize(&input) {
                for token in tokens {
                    if let Token::Word(w) | Token::Operator(w) = token {
                        prop_assert!(!w.is_empty());
                        prop_assert!(!w.chars().any(is_delimiter));
                    }
                }
            }
        }
    }
}
