use crate::environment::Environment;
use crate::evaluator::EvalResult;
use crate::source::Span;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An expression together with the source span it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Expr,
    pub span: Span,
}

impl Node {
    pub fn new(kind: Expr, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn new_number(n: f64, span: Span) -> Self {
        Node::new(Expr::Number(n), span)
    }

    pub fn new_symbol(name: impl Into<String>, span: Span) -> Self {
        Node::new(Expr::Symbol(name.into()), span)
    }

    pub fn new_combination(items: Vec<Node>, span: Span) -> Self {
        Node::new(Expr::Combination(items), span)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// The expression tree produced by the parser and consumed read-only by the
/// evaluator. A combination's head selects a special form (`define`, `begin`,
/// `lambda`) or, failing that, a function application; that classification
/// happens in the evaluator, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Combination(Vec<Node>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Combination(items) => {
                write!(f, "(")?;
                let mut first = true;
                for item in items {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                    first = false;
                }
                write!(f, ")")
            }
        }
    }
}

/// A host-supplied callable: ordered argument values in, one value (or a
/// failure) out. The `Span` is the call site, for error reporting.
pub type BuiltinFn = fn(Vec<Value>, Span) -> EvalResult;

/// Runtime result of evaluation.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    /// Host function plus its name (for display and comparison).
    Builtin(BuiltinFn, String),
    /// User-defined function from a `lambda` form.
    Closure(Rc<Closure>),
    /// The result of an empty `begin`.
    Nil,
}

/// A user-defined function value: parameter names, a single body expression,
/// and the environment captured (by shared reference) at creation.
pub struct Closure {
    pub params: Vec<String>,
    pub body: Node,
    pub env: Rc<RefCell<Environment>>,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Builtin(..) => "builtin",
            Value::Closure(_) => "closure",
            Value::Nil => "nil",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Builtin(_, name) => write!(f, "#<builtin:{}>", name),
            Value::Closure(closure) => {
                write!(f, "#<closure ({})>", closure.params.join(" "))
            }
            Value::Nil => write!(f, "()"),
        }
    }
}

// Debug must not follow the captured environment: a closure stored in the
// frame it captured would recurse forever.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Builtin(_, name) => write!(f, "Builtin({})", name),
            Value::Closure(closure) => write!(f, "Closure({:?})", closure.params),
            Value::Nil => write!(f, "Nil"),
        }
    }
}

// Function pointers and captured environments don't compare structurally:
// builtins compare by name, closures by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Builtin(_, a), Value::Builtin(_, b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}
