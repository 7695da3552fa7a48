use crate::lexer::is_identifier;
use crate::source::Span;
use crate::types::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("undefined variable: {0}")]
    UnboundVariable(String, Span), // Symbol name, span where lookup happened
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String, Span),
}

/// One lexical scope level: a frame of bindings plus a shared reference to
/// the enclosing environment. `Rc<RefCell<...>>` lets closures keep their
/// captured environment alive and see later mutations of its frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    outer: Option<Rc<RefCell<Environment>>>,
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// Creates a new, empty root environment.
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: None,
            bindings: HashMap::new(),
        }))
    }

    /// Creates a root environment whose frame is a copy of the host's
    /// builtin table. Internal `define`s never touch the caller's map.
    pub fn from_builtins(builtins: &HashMap<String, Value>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: None,
            bindings: builtins.clone(),
        }))
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Defines a variable in the *current* frame only, shadowing (never
    /// reassigning) any binding of the same name in an ancestor frame.
    /// Replaces the value if the variable already exists in this frame.
    pub fn define(&mut self, name: String, value: Value, span: Span) -> Result<(), EnvError> {
        if !is_identifier(&name) {
            return Err(EnvError::InvalidIdentifier(name, span));
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    /// Looks up a variable's value, walking the frame chain from innermost
    /// to outermost. `lookup_span` is the location of the reference, used
    /// for error reporting.
    pub fn get(&self, name: &str, lookup_span: Span) -> Result<Value, EnvError> {
        if let Some(value) = self.bindings.get(name) {
            Ok(value.clone())
        } else {
            match &self.outer {
                Some(outer_env_ptr) => outer_env_ptr.borrow().get(name, lookup_span),
                None => Err(EnvError::UnboundVariable(name.to_string(), lookup_span)),
            }
        }
    }

    fn add_identifiers(&self, mut identifiers: HashSet<String>) -> HashSet<String> {
        for identifier in self.bindings.keys() {
            identifiers.insert(identifier.to_string());
        }
        match &self.outer {
            Some(outer_env_ptr) => outer_env_ptr.borrow().add_identifiers(identifiers),
            None => identifiers,
        }
    }

    /// Gets every identifier visible from this environment (REPL completion).
    pub fn get_identifiers(&self) -> HashSet<String> {
        self.add_identifiers(HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn define(env: &Rc<RefCell<Environment>>, name: &str, value: Value) {
        env.borrow_mut()
            .define(name.to_string(), value, Span::default())
            .expect("define should succeed");
    }

    #[test]
    fn test_define_and_get_root() {
        let env = Environment::new();
        define(&env, "x", Value::Number(10.0));

        let result = env.borrow().get("x", Span::default());
        assert_eq!(result, Ok(Value::Number(10.0)));
    }

    #[test]
    fn test_get_unbound_root() {
        let env = Environment::new();
        let result = env.borrow().get("y", Span::default());
        assert!(matches!(result, Err(EnvError::UnboundVariable(s, _)) if s == "y"));
    }

    #[test]
    fn test_unbound_error_message() {
        let env = Environment::new();
        let err = env.borrow().get("y", Span::default()).unwrap_err();
        assert_eq!(err.to_string(), "undefined variable: y");
    }

    #[test]
    fn test_define_rejects_bad_identifier() {
        let env = Environment::new();
        let result = env
            .borrow_mut()
            .define("5x".to_string(), Value::Number(1.0), Span::default());
        assert!(matches!(result, Err(EnvError::InvalidIdentifier(s, _)) if s == "5x"));
    }

    #[test]
    fn test_define_and_get_enclosed() {
        let root_env = Environment::new();
        define(&root_env, "x", Value::Number(10.0));

        let local_env = Environment::new_enclosed(root_env);
        define(&local_env, "y", Value::Number(20.0));

        // Local binding
        let result_y = local_env.borrow().get("y", Span::default());
        assert_eq!(result_y, Ok(Value::Number(20.0)));

        // Root binding reachable through the chain
        let result_x = local_env.borrow().get("x", Span::default());
        assert_eq!(result_x, Ok(Value::Number(10.0)));
    }

    #[test]
    fn test_get_unbound_enclosed() {
        let root_env = Environment::new();
        let local_env = Environment::new_enclosed(root_env);

        let span = Span::new(11, 12);
        let result = local_env.borrow().get("z", span);
        assert_eq!(result, Err(EnvError::UnboundVariable("z".to_string(), span)));
    }

    #[test]
    fn test_shadowing() {
        let root_env = Environment::new();
        define(&root_env, "x", Value::Number(10.0));

        let local_env = Environment::new_enclosed(root_env.clone());
        define(&local_env, "x", Value::Number(50.0)); // Shadow root x

        let inner_env = Environment::new_enclosed(local_env.clone());

        // Inner sees the nearest binding
        assert_eq!(
            inner_env.borrow().get("x", Span::default()),
            Ok(Value::Number(50.0))
        );
        // Root binding untouched
        assert_eq!(
            root_env.borrow().get("x", Span::default()),
            Ok(Value::Number(10.0))
        );
    }

    #[test]
    fn test_from_builtins_copies_table() {
        let mut builtins = HashMap::new();
        builtins.insert("x".to_string(), Value::Number(1.0));

        let env = Environment::from_builtins(&builtins);
        define(&env, "y", Value::Number(2.0));

        // The caller's table is unaffected by definitions in the root frame
        assert_eq!(builtins.len(), 1);
        assert_eq!(env.borrow().get("x", Span::default()), Ok(Value::Number(1.0)));
        assert_eq!(env.borrow().get("y", Span::default()), Ok(Value::Number(2.0)));
    }
}
