use logos::Logos;
use std::fmt;
use thiserror::Error;

use crate::Span;

/// Token grammar of the surface syntax: parentheses, numeric literals and
/// symbols, separated by whitespace. There are no strings, comments or quote
/// sugar in this language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")] // Whitespace only separates tokens
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    // Number must win the tie against Symbol so that "-5" lexes as a
    // literal while "-" alone stays a symbol.
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| {
        let slice = lex.slice();
        slice
            .parse::<f64>()
            .map_err(|_| LexerErrorKind::UnexpectedToken(slice.to_string()))
    }, priority = 3)]
    Number(f64),
    #[regex(r"[a-zA-Z+\-!/*_][a-zA-Z0-9+\-!?*_']*", |lex| lex.slice().to_string())]
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Symbol(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    // Placeholder logos produces for unmatched input; tokenize() replaces it
    // with UnexpectedToken carrying the offending slice.
    #[default]
    #[error("unrecognized input")]
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub span: Span,
}

type LexerResult<T> = Result<T, LexerError>;

/// Checks a name against the symbol grammar:
/// `[a-zA-Z+\-!/*_][a-zA-Z0-9+\-!?*_']*`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || "+-!/*_".contains(c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || "+-!?*_'".contains(c))
}

fn is_atom(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Number(_) | TokenKind::Symbol(_))
}

/// Turns raw text into a flat ordered token sequence. Pure; fails on the
/// first input slice matching no token rule.
pub fn tokenize(input: &str) -> LexerResult<Vec<Token>> {
    let tokens: Vec<Token> = TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| {
            let span = Span {
                start: range.start,
                end: range.end,
            };
            match result {
                Ok(kind) => Ok(Token { kind, span }),
                Err(LexerErrorKind::UnexpectedToken(slice)) => Err(LexerError {
                    kind: LexerErrorKind::UnexpectedToken(slice),
                    span,
                }),
                Err(LexerErrorKind::Unrecognized) => Err(LexerError {
                    kind: LexerErrorKind::UnexpectedToken(input[range].to_string()),
                    span,
                }),
            }
        })
        .collect::<LexerResult<_>>()?;

    // Atoms must be delimited by whitespace or parentheses. The scanner
    // maximal-munches, so "2x" or "5-3" arrives as adjacent atom tokens;
    // the joined run is one token matching neither grammar.
    for (i, pair) in tokens.windows(2).enumerate() {
        if is_atom(&pair[0].kind)
            && is_atom(&pair[1].kind)
            && pair[0].span.end == pair[1].span.start
        {
            let mut end = i + 1;
            while end + 1 < tokens.len()
                && is_atom(&tokens[end + 1].kind)
                && tokens[end].span.end == tokens[end + 1].span.start
            {
                end += 1;
            }
            let span = tokens[i].span.merge(tokens[end].span);
            return Err(LexerError {
                kind: LexerErrorKind::UnexpectedToken(input[span.to_range()].to_string()),
                span,
            });
        }
    }

    Ok(tokens)
}
