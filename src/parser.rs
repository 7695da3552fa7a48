use crate::Span;
use crate::lexer::{LexerError, Token, TokenKind};
use crate::types::Node;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected token: {found}")]
    UnexpectedToken { found: Token },
    #[error("unexpected tokens at end of input")]
    TrailingTokens(Span),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("{0}")]
    Lexer(#[from] LexerError),
}

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over an owned token sequence. The token grammar
/// is regular, so one token of lookahead and no backtracking suffice.
pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    /// Parses a single expression from the front of the token stream.
    pub fn parse_expr(&mut self) -> ParseResult<Node> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Number(n),
                span,
            }) => Ok(Node::new_number(n, span)),
            Some(Token {
                kind: TokenKind::Symbol(s),
                span,
            }) => Ok(Node::new_symbol(s, span)),
            Some(Token {
                kind: TokenKind::LParen,
                span,
            }) => self.parse_combination(span),
            // A closing paren with no open combination
            Some(found) => Err(ParseError::UnexpectedToken { found }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Parses zero or more sub-expressions up to the matching `)`. The
    /// special forms are not validated here; the evaluator classifies a
    /// combination by its first element and enforces shape lazily.
    fn parse_combination(&mut self, lparen_span: Span) -> ParseResult<Node> {
        let mut items = Vec::new();
        loop {
            match self.tokens.peek() {
                Some(Token {
                    kind: TokenKind::RParen,
                    span,
                }) => {
                    let full_span = lparen_span.merge(*span);
                    self.next_token();
                    return Ok(Node::new_combination(items, full_span));
                }
                Some(_) => items.push(self.parse_expr()?),
                None => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    /// Parses the token stream as exactly one expression; anything left over
    /// is an error.
    pub fn parse(mut self) -> ParseResult<Node> {
        let expr = self.parse_expr()?;

        if let Some(found) = self.next_token() {
            Err(ParseError::TrailingTokens(found.span))
        } else {
            Ok(expr)
        }
    }
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Node> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}
