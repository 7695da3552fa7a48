// Declare modules publicly so they are part of the library interface
pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod source;
pub mod types;

pub use builtins::standard_builtins;
pub use environment::{EnvError, Environment};
pub use evaluator::{EvalError, EvalResult, evaluate, interpret};
pub use lexer::{LexerError, Token, TokenKind, tokenize};
pub use parser::{ParseError, Parser, parse_str};
pub use source::Span;
pub use types::{Expr, Node, Value};
