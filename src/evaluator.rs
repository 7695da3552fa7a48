use crate::environment::{EnvError, Environment};
use crate::parser::parse_str;
use crate::source::Span;
use crate::types::{Closure, Expr, Node, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Env(#[from] EnvError),
    /// Application where the operator position is not a function value.
    #[error("not callable: {0}")]
    NotCallable(Value, Span),
    #[error("invalid definition: {0}")]
    InvalidDefinition(String, Span),
    #[error("invalid lambda: {0}")]
    InvalidLambda(String, Span),
    /// Arity or domain failure reported by a builtin.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String, Span),
}

pub type EvalResult<T = Value> = Result<T, EvalError>;

/// The keywords the evaluator recognizes in a combination's head position.
pub fn special_form_identifiers() -> HashSet<String> {
    ["define", "begin", "lambda"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Evaluates an expression tree within the given environment. Recursive;
/// depth is bounded only by the native call stack.
pub fn evaluate(node: Node, env: Rc<RefCell<Environment>>) -> EvalResult {
    let span = node.span;
    match node.kind {
        Expr::Number(n) => Ok(Value::Number(n)),

        Expr::Symbol(name) => Ok(env.borrow().get(&name, span)?),

        // The head reclassifies a combination: keyword -> special form,
        // anything else -> application.
        Expr::Combination(items) => match items.split_first() {
            Some((first, rest)) => match &first.kind {
                Expr::Symbol(sym) if sym == "define" => evaluate_define(rest, env, span),
                Expr::Symbol(sym) if sym == "begin" => evaluate_begin(rest, env),
                Expr::Symbol(sym) if sym == "lambda" => evaluate_lambda(rest, env, span),
                _ => evaluate_application(first, rest, env, span),
            },
            // Nothing in operator position
            None => Err(EvalError::NotCallable(Value::Nil, span)),
        },
    }
}

/// `(define target value)` — evaluates the value in the current environment
/// and binds it in the current frame only. Returns the bound value.
fn evaluate_define(operands: &[Node], env: Rc<RefCell<Environment>>, span: Span) -> EvalResult {
    if let [target, value_expr] = operands {
        let name = match &target.kind {
            Expr::Symbol(name) => name.clone(),
            other => {
                return Err(EvalError::InvalidDefinition(
                    format!("target must be a symbol, got {}", other),
                    target.span,
                ));
            }
        };
        let value = evaluate(value_expr.clone(), env.clone())?;
        env.borrow_mut().define(name, value.clone(), target.span)?;
        Ok(value)
    } else {
        Err(EvalError::InvalidDefinition(
            "expected a target symbol and a value expression".to_string(),
            span,
        ))
    }
}

/// `(begin e1 ... en)` — evaluates left to right in the current environment,
/// keeping only the last result. Earlier definitions are visible to later
/// expressions. An empty body yields Nil.
fn evaluate_begin(operands: &[Node], env: Rc<RefCell<Environment>>) -> EvalResult {
    let mut result = Value::Nil;
    for expr in operands {
        result = evaluate(expr.clone(), env.clone())?;
    }
    Ok(result)
}

/// `(lambda (p1 ... pn) body)` — produces a closure capturing the current
/// environment by reference, so later mutations of its frame are visible on
/// the next invocation.
fn evaluate_lambda(operands: &[Node], env: Rc<RefCell<Environment>>, span: Span) -> EvalResult {
    if let [params_node, body] = operands {
        let param_items = match &params_node.kind {
            Expr::Combination(items) => items,
            other => {
                return Err(EvalError::InvalidLambda(
                    format!("parameter list must be a combination, got {}", other),
                    params_node.span,
                ));
            }
        };
        let mut params = Vec::with_capacity(param_items.len());
        for item in param_items {
            match &item.kind {
                Expr::Symbol(name) => params.push(name.clone()),
                other => {
                    return Err(EvalError::InvalidLambda(
                        format!("parameter must be a symbol, got {}", other),
                        item.span,
                    ));
                }
            }
        }
        Ok(Value::Closure(Rc::new(Closure {
            params,
            body: body.clone(),
            env,
        })))
    } else {
        Err(EvalError::InvalidLambda(
            "expected a parameter list and a body expression".to_string(),
            span,
        ))
    }
}

fn evaluate_application(
    operator: &Node,
    operands: &[Node],
    env: Rc<RefCell<Environment>>,
    span: Span,
) -> EvalResult {
    let operator_value = evaluate(operator.clone(), env.clone())?;

    match operator_value {
        Value::Builtin(func, _) => {
            let args = evaluate_operands(operands, env)?;
            func(args, span)
        }
        Value::Closure(closure) => {
            // Operands evaluate in the caller's environment; the body runs in
            // a fresh frame parented to the *captured* environment. That
            // parent choice is what makes scoping lexical rather than dynamic.
            let args = evaluate_operands(operands, env)?;
            let call_env = Environment::new_enclosed(closure.env.clone());
            // Positional pairing only: excess params stay unbound, excess
            // args are dropped.
            for (param, arg) in closure.params.iter().zip(args) {
                call_env
                    .borrow_mut()
                    .define(param.clone(), arg, operator.span)?;
            }
            evaluate(closure.body.clone(), call_env)
        }
        value => Err(EvalError::NotCallable(value, operator.span)),
    }
}

fn evaluate_operands(operands: &[Node], env: Rc<RefCell<Environment>>) -> EvalResult<Vec<Value>> {
    let mut evaluated = Vec::with_capacity(operands.len());
    for operand in operands {
        evaluated.push(evaluate(operand.clone(), env.clone())?);
    }
    Ok(evaluated)
}

/// The sole external boundary: builds a root environment from a copy of the
/// host's builtin table, parses one expression, evaluates it, and converts
/// any parse or evaluation failure into its textual message. Never panics.
pub fn interpret(builtins: &HashMap<String, Value>, input: &str) -> Result<Value, String> {
    let env = Environment::from_builtins(builtins);
    let node = parse_str(input).map_err(|e| e.to_string())?;
    evaluate(node, env).map_err(|e| e.to_string())
}
