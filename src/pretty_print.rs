use crate::{EnvError, EvalError, ParseError};
use ariadne::{Label, Report, ReportKind, Source};

impl EvalError {
    pub fn pretty_print(&self, input: &str) {
        let report = match self {
            EvalError::Env(env_error) => match env_error {
                EnvError::UnboundVariable(symbol, span) => {
                    Report::build(ReportKind::Error, ("REPL", span.to_range()))
                        .with_message(format!("Undefined variable `{}`", symbol))
                        .with_label(
                            Label::new(("REPL", span.to_range()))
                                .with_message("This symbol is not defined in the current scope"),
                        )
                }
                EnvError::InvalidIdentifier(name, span) => {
                    Report::build(ReportKind::Error, ("REPL", span.to_range()))
                        .with_message(format!("Invalid identifier `{}`", name))
                        .with_label(
                            Label::new(("REPL", span.to_range()))
                                .with_message("This name does not match the symbol grammar"),
                        )
                }
            },
            EvalError::NotCallable(value, span) => {
                Report::build(ReportKind::Error, ("REPL", span.to_range()))
                    .with_message(format!("Not callable: {}", value))
                    .with_label(
                        Label::new(("REPL", span.to_range()))
                            .with_message("This expression cannot be applied as a function"),
                    )
            }
            EvalError::InvalidDefinition(message, span) => {
                Report::build(ReportKind::Error, ("REPL", span.to_range()))
                    .with_message("Invalid definition")
                    .with_label(Label::new(("REPL", span.to_range())).with_message(message))
            }
            EvalError::InvalidLambda(message, span) => {
                Report::build(ReportKind::Error, ("REPL", span.to_range()))
                    .with_message("Invalid lambda")
                    .with_label(Label::new(("REPL", span.to_range())).with_message(message))
            }
            EvalError::InvalidArguments(message, span) => {
                Report::build(ReportKind::Error, ("REPL", span.to_range()))
                    .with_message("Invalid arguments")
                    .with_label(Label::new(("REPL", span.to_range())).with_message(message))
            }
        };
        report
            .finish()
            .print(("REPL", Source::from(input)))
            .unwrap();
    }
}

impl ParseError {
    pub fn pretty_print(&self, input: &str) {
        let report = match self {
            ParseError::UnexpectedToken { found } => {
                Report::build(ReportKind::Error, ("REPL", found.span.to_range()))
                    .with_message(format!("Unexpected token: {}", found.kind))
                    .with_label(
                        Label::new(("REPL", found.span.to_range()))
                            .with_message("No expression can start here"),
                    )
            }
            ParseError::TrailingTokens(span) => {
                Report::build(ReportKind::Error, ("REPL", span.to_range()))
                    .with_message("Unexpected tokens at end of input")
                    .with_label(
                        Label::new(("REPL", span.to_range()))
                            .with_message("One complete expression was already consumed"),
                    )
            }
            ParseError::UnexpectedEof => {
                let idx = input.len();
                Report::build(ReportKind::Error, ("REPL", idx..idx))
                    .with_message("Unexpected end of input")
                    .with_label(
                        Label::new(("REPL", idx..idx)).with_message("Expression is incomplete"),
                    )
            }
            ParseError::Lexer(lex_err) => {
                Report::build(ReportKind::Error, ("REPL", lex_err.span.to_range()))
                    .with_message("Lexer error")
                    .with_label(
                        Label::new(("REPL", lex_err.span.to_range()))
                            .with_message(lex_err.kind.to_string()),
                    )
            }
        };
        report
            .finish()
            .print(("REPL", Source::from(input)))
            .unwrap();
    }
}
