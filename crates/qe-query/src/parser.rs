//! Query parser.
//!
//! Parses a token stream into a [`QueryNode`] tree using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query     → operator | argument*          (bare queries get the default operator)
//! operator  → OPERATOR "(" arguments ")"
//! arguments → argument*                     (unweighted operators)
//!           | (WEIGHT argument)*            (#WAND, #WSUM)
//! argument  → operator | TERM
//! TERM      → word | word "." field
//! ```
//!
//! Terms are analyzed as they are parsed. A term the analyzer maps to nothing
//! is dropped together with its weight, and an operator left without arguments
//! is dropped from its parent the same way.

use std::{fmt, mem};

use crate::{
    analyze::Analyze,
    ast::{DEFAULT_FIELD, QueryNode, Weighted},
    dialect::QueryDialect,
    error::QueryError,
    lexer::{Token, tokenize_spanned},
};

/// Failure inside the parser, located by token index.
#[derive(Debug)]
enum ParseError {
    /// Malformed syntax.
    Syntax {
        /// Error message.
        message: String,
        /// Index of the offending token, if any.
        token_index: Option<usize>,
    },
    /// Unrecognized `#name`.
    UnknownOperator {
        /// Operator name as written.
        name: String,
        /// Index of the operator token.
        token_index: usize,
    },
}

impl ParseError {
    /// Creates a syntax error.
    fn syntax(message: impl Into<String>, token_index: Option<usize>) -> Self {
        Self::Syntax {
            message: message.into(),
            token_index,
        }
    }

    /// Converts to a [`QueryError`], mapping token indices to byte positions.
    fn into_query_error(self, positions: &[usize], input: &str) -> QueryError {
        let locate = |index: usize| Some(positions.get(index).copied().unwrap_or(input.len()));
        let err = match self {
            Self::Syntax {
                message,
                token_index,
            } => QueryError::syntax(message, token_index.and_then(locate)),
            Self::UnknownOperator { name, token_index } => {
                QueryError::unknown_operator(name, locate(token_index))
            }
        };
        err.with_query(input)
    }
}

/// An operator name resolved against the dialect, before its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatorKind {
    /// `#SYN`
    Syn,
    /// `#NEAR/n`
    Near(u32),
    /// `#WINDOW/n`
    Window(u32),
    /// `#SCORE`
    Score,
    /// `#AND` outside the Indri dialect.
    And,
    /// `#OR`
    Or,
    /// `#SUM`
    Sum,
    /// `#AND` in the Indri dialect.
    IndriAnd,
    /// `#WAND`
    Wand,
    /// `#WSUM`
    Wsum,
}

impl OperatorKind {
    /// Returns true for operators whose arguments are preceded by weights.
    fn is_weighted(self) -> bool {
        matches!(self, Self::Wand | Self::Wsum)
    }

    /// Returns true for operators that merge inverted lists.
    fn takes_inverted_lists(self) -> bool {
        matches!(self, Self::Syn | Self::Near(_) | Self::Window(_))
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syn => f.write_str("#syn"),
            Self::Near(n) => write!(f, "#near/{n}"),
            Self::Window(n) => write!(f, "#window/{n}"),
            Self::Score => f.write_str("#score"),
            Self::And | Self::IndriAnd => f.write_str("#and"),
            Self::Or => f.write_str("#or"),
            Self::Sum => f.write_str("#sum"),
            Self::Wand => f.write_str("#wand"),
            Self::Wsum => f.write_str("#wsum"),
        }
    }
}

/// Arguments collected for one operator.
#[derive(Debug, Default)]
struct Arguments {
    /// Arguments of unweighted operators.
    plain: Vec<QueryNode>,
    /// Arguments of weighted operators.
    weighted: Vec<Weighted>,
}

impl Arguments {
    /// Returns true if no argument survived analysis.
    fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.weighted.is_empty()
    }
}

/// Recursive descent parser for prefix queries.
struct Parser<'a> {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
    /// Decides the implicit operator and the meaning of `#AND`.
    dialect: QueryDialect,
    /// Normalizes term text.
    analyzer: &'a dyn Analyze,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>, dialect: QueryDialect, analyzer: &'a dyn Analyze) -> Self {
        Self {
            tokens,
            position: 0,
            dialect,
            analyzer,
        }
    }

    /// Parses the token stream into an operator tree.
    ///
    /// Returns `None` when nothing indexable is left after analysis.
    fn parse(mut self) -> Result<Option<QueryNode>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        if let Some(Token::Operator(name)) = self.peek().cloned() {
            let node = self.parse_operator(&name)?;
            if let Some(token) = self.peek() {
                return Err(ParseError::syntax(
                    format!("unexpected {} after the query", describe(token)),
                    Some(self.position),
                ));
            }
            return Ok(node);
        }

        let kind = match self.dialect {
            QueryDialect::Boolean => OperatorKind::Or,
            QueryDialect::Bm25 => OperatorKind::Sum,
            QueryDialect::Indri => OperatorKind::IndriAnd,
        };
        let args = self.parse_arguments(kind, None)?;
        build(kind, args)
    }

    /// Parses `OPERATOR "(" arguments ")"`; the current token is the operator.
    fn parse_operator(&mut self, name: &str) -> Result<Option<QueryNode>, ParseError> {
        let start = self.position;
        self.advance(); // consume operator
        let kind = self.resolve(name, start)?;

        if !self.check(&Token::LParen) {
            return Err(ParseError::syntax(
                format!("expected '(' after {kind}"),
                Some(self.position),
            ));
        }
        self.advance(); // consume (

        let args = self.parse_arguments(kind, Some(start))?;
        build(kind, args).map_err(|err| match err {
            ParseError::Syntax { message, .. } => ParseError::syntax(message, Some(start)),
            other => other,
        })
    }

    /// Parses arguments up to the closing parenthesis, or to the end of input
    /// for an implicit operator (`opened_at` is `None`).
    fn parse_arguments(
        &mut self,
        kind: OperatorKind,
        opened_at: Option<usize>,
    ) -> Result<Arguments, ParseError> {
        let mut args = Arguments::default();

        loop {
            match (self.peek(), opened_at) {
                (None, Some(open)) => {
                    return Err(ParseError::syntax(
                        format!("expected closing parenthesis for {kind}"),
                        Some(open),
                    ));
                }
                (None, None) => break,
                (Some(Token::RParen), Some(_)) => {
                    self.advance(); // consume )
                    break;
                }
                (Some(Token::RParen), None) => {
                    return Err(ParseError::syntax(
                        "unexpected closing parenthesis",
                        Some(self.position),
                    ));
                }
                _ => {}
            }

            let weight = if kind.is_weighted() {
                Some(self.parse_weight()?)
            } else {
                None
            };

            let child_start = self.position;
            let Some(child) = self.parse_argument()? else {
                continue;
            };

            if kind.takes_inverted_lists() && !child.is_inverted_list() {
                return Err(ParseError::syntax(
                    format!(
                        "{kind} only accepts terms and #SYN, #NEAR or #WINDOW arguments, found {}",
                        child.operator_name().unwrap_or_default()
                    ),
                    Some(child_start),
                ));
            }

            match weight {
                Some(weight) => args.weighted.push(Weighted::new(weight, child)),
                None => args.plain.push(child),
            }
        }

        Ok(args)
    }

    /// Parses the weight that precedes an argument of `#WAND` or `#WSUM`.
    fn parse_weight(&mut self) -> Result<f64, ParseError> {
        let index = self.position;
        let Some(Token::Word(text)) = self.peek() else {
            return Err(ParseError::syntax(
                "expected a weight before argument",
                Some(index),
            ));
        };

        let Ok(weight) = text.parse::<f64>() else {
            return Err(ParseError::syntax(
                format!("expected a weight before argument, found {text:?}"),
                Some(index),
            ));
        };

        if !weight.is_finite() || weight < 0.0 {
            return Err(ParseError::syntax(
                format!("weight must be a finite non-negative number, found {text}"),
                Some(index),
            ));
        }

        self.advance();
        Ok(weight)
    }

    /// Parses one argument: a nested operator or a term.
    fn parse_argument(&mut self) -> Result<Option<QueryNode>, ParseError> {
        let index = self.position;
        match self.peek().cloned() {
            Some(Token::Operator(name)) => self.parse_operator(&name),
            Some(Token::Word(text)) => {
                self.advance();
                self.parse_term(&text, index)
            }
            Some(Token::LParen) => Err(ParseError::syntax(
                "unexpected opening parenthesis",
                Some(index),
            )),
            Some(Token::RParen) | None => Err(ParseError::syntax(
                "expected an argument after weight",
                Some(index),
            )),
        }
    }

    /// Splits `term.field`, then analyzes the term text.
    fn parse_term(&self, text: &str, index: usize) -> Result<Option<QueryNode>, ParseError> {
        let (raw, field) = match text.split_once('.') {
            Some((raw, field)) if !raw.is_empty() && !field.is_empty() => (raw, field),
            Some(_) => {
                return Err(ParseError::syntax(
                    format!("malformed term {text:?}, expected term or term.field"),
                    Some(index),
                ));
            }
            None => (text, DEFAULT_FIELD),
        };

        Ok(self
            .analyzer
            .analyze(raw)
            .into_iter()
            .next()
            .map(|term| QueryNode::term(term, field)))
    }

    /// Resolves an operator name such as `NEAR/3` for the active dialect.
    fn resolve(&self, name: &str, index: usize) -> Result<OperatorKind, ParseError> {
        let lower = name.to_ascii_lowercase();
        let (base, distance) = match lower.split_once('/') {
            Some((base, distance)) => (base, Some(distance)),
            None => (lower.as_str(), None),
        };

        let kind = match base {
            "syn" => OperatorKind::Syn,
            "score" => OperatorKind::Score,
            "and" if self.dialect == QueryDialect::Indri => OperatorKind::IndriAnd,
            "and" => OperatorKind::And,
            "or" => OperatorKind::Or,
            "sum" => OperatorKind::Sum,
            "wand" => OperatorKind::Wand,
            "wsum" => OperatorKind::Wsum,
            "near" | "window" => {
                let Some(distance) = distance else {
                    return Err(ParseError::syntax(
                        format!("#{name} requires a distance, e.g. #{base}/3"),
                        Some(index),
                    ));
                };
                let distance = distance
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        ParseError::syntax(format!("malformed distance in #{name}"), Some(index))
                    })?;
                return Ok(if base == "near" {
                    OperatorKind::Near(distance)
                } else {
                    OperatorKind::Window(distance)
                });
            }
            _ => {
                return Err(ParseError::UnknownOperator {
                    name: name.to_string(),
                    token_index: index,
                });
            }
        };

        if distance.is_some() {
            return Err(ParseError::syntax(
                format!("#{base} does not take a distance"),
                Some(index),
            ));
        }
        Ok(kind)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Builds the node for an operator from its surviving arguments.
fn build(kind: OperatorKind, args: Arguments) -> Result<Option<QueryNode>, ParseError> {
    if args.is_empty() {
        return Ok(None);
    }

    let Arguments {
        mut plain,
        weighted,
    } = args;
    let node = match kind {
        OperatorKind::Syn => QueryNode::Syn(plain),
        OperatorKind::Near(distance) => QueryNode::Near {
            distance,
            children: plain,
        },
        OperatorKind::Window(distance) => QueryNode::Window {
            distance,
            children: plain,
        },
        OperatorKind::Score => {
            if plain.len() != 1 {
                return Err(ParseError::syntax(
                    format!("#score takes exactly one argument, found {}", plain.len()),
                    None,
                ));
            }
            let Some(child) = plain.pop() else {
                return Ok(None);
            };
            QueryNode::Score(Box::new(child))
        }
        OperatorKind::And => QueryNode::And(plain),
        OperatorKind::Or => QueryNode::Or(plain),
        OperatorKind::Sum => QueryNode::Sum(plain),
        OperatorKind::IndriAnd => QueryNode::IndriAnd(plain),
        OperatorKind::Wand => QueryNode::Wand(weighted),
        OperatorKind::Wsum => QueryNode::Wsum(weighted),
    };
    Ok(Some(node))
}

/// Describes a token for error messages.
fn describe(token: &Token) -> String {
    match token {
        Token::Operator(name) => format!("operator #{name}"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Word(word) => format!("term {word:?}"),
    }
}

/// Parses a query string into an operator tree.
///
/// Queries that start with an operator must consist of exactly that operator;
/// any other query is wrapped in the dialect's default operator. Returns
/// `Ok(None)` when no term survives analysis.
pub fn parse(
    input: &str,
    dialect: QueryDialect,
    analyzer: &dyn Analyze,
) -> Result<Option<QueryNode>, QueryError> {
    let spanned = tokenize_spanned(input).map_err(QueryError::from)?;
    let positions: Vec<usize> = spanned.iter().map(|s| s.position).collect();
    let tokens = spanned.into_iter().map(|s| s.token).collect();

    Parser::new(tokens, dialect, analyzer)
        .parse()
        .map_err(|err| err.into_query_error(&positions, input))
}
