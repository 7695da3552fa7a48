use std::cell::RefCell;
use std::rc::Rc;

use lisplet::Environment;
use lisplet::builtins::standard_builtins;
use lisplet::evaluator::{evaluate, special_form_identifiers};
use lisplet::lexer::{TokenKind, tokenize};
use lisplet::parser::parse_str;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

struct LispletCompleter {
    env: Rc<RefCell<Environment>>,
}

impl LispletCompleter {
    fn new(env: Rc<RefCell<Environment>>) -> Self {
        LispletCompleter { env }
    }
}

impl rustyline::completion::Completer for LispletCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok((
            pos,
            match tokenize(&line[..pos]) {
                Ok(tokens) => {
                    if let Some(TokenKind::Symbol(prefix)) = tokens.last().map(|t| t.kind.clone()) {
                        self.env
                            .borrow()
                            .get_identifiers()
                            .union(&special_form_identifiers())
                            .filter_map(|id| {
                                if id.starts_with(&prefix) {
                                    Some(id[prefix.len()..].to_string())
                                } else {
                                    None
                                }
                            })
                            .collect()
                    } else {
                        vec![]
                    }
                }
                Err(_) => vec![],
            },
        ))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputHelper {
    #[rustyline(Validator)]
    validator: LispletValidator,
    #[rustyline(Highlighter)]
    highlighter: LispletHighlighter,
    #[rustyline(Completer)]
    completer: LispletCompleter,
}

struct LispletValidator;

// The surface syntax has no strings or comments, so balance checking is a
// bare depth counter. Unclosed parens mean "keep reading".
impl Validator for LispletValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        let mut depth: i32 = 0;

        for (i, c) in input.chars().enumerate() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                }
                _ => {}
            }
        }

        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct LispletHighlighter;

impl Highlighter for LispletHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        let mut stack: Vec<usize> = Vec::new();
        let mut highlighted = String::new();

        for (i, c) in line.chars().enumerate() {
            match c {
                '(' => {
                    stack.push(highlighted.len());
                    highlighted.push(c);
                }
                ')' => {
                    if let Some(matching_pos) = stack.pop() {
                        if matching_pos == pos.saturating_sub(1) || i == pos.saturating_sub(1) {
                            highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c)); // Blue for matching brackets
                            highlighted.replace_range(
                                matching_pos..=matching_pos,
                                &format!("\x1b[1;34m{}\x1b[0m", '('),
                            );
                        } else {
                            highlighted.push(c);
                        }
                    } else {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing brackets
                    }
                }
                _ => {
                    highlighted.push(c);
                }
            }
        }

        std::borrow::Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    println!("Lisplet REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let env = Environment::from_builtins(&standard_builtins());
    let h = InputHelper {
        highlighter: LispletHighlighter,
        validator: LispletValidator,
        completer: LispletCompleter::new(env.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history("lisplet_history.txt").is_err() {
        println!("No previous history.");
    }

    loop {
        let readline = rl.readline("lisplet> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match parse_str(trimmed_input) {
                    Ok(node) => match evaluate(node, env.clone()) {
                        Ok(value) => {
                            println!("{}", value);
                        }
                        Err(e) => {
                            e.pretty_print(trimmed_input);
                        }
                    },
                    Err(parse_err) => {
                        parse_err.pretty_print(trimmed_input);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("lisplet_history.txt")
}
