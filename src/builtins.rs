//! The standard table of host functions an embedding application typically
//! supplies: arithmetic, combinatorics, trigonometry and basic statistics.
//! The interpreter core never depends on this module; it only sees opaque
//! `Value::Builtin` entries in the root environment.

use crate::evaluator::{EvalError, EvalResult};
use crate::source::Span;
use crate::types::{BuiltinFn, Value};
use std::collections::HashMap;

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr, $span:expr, $name:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::InvalidArguments(
                format!(
                    "'{}' expects exactly {} arguments, got {}",
                    $name,
                    $expected,
                    $args.len()
                ),
                $span,
            ));
        }
    };
    // Variant for minimum number of args
    ($args:expr, min $expected:expr, $span:expr, $name:expr) => {
        if $args.len() < $expected {
            return Err(EvalError::InvalidArguments(
                format!(
                    "'{}' expects at least {} arguments, got {}",
                    $name,
                    $expected,
                    $args.len()
                ),
                $span,
            ));
        }
    };
}

// Extracts a number from a Value or returns an InvalidArguments error
macro_rules! expect_number {
    ($value:expr, $span:expr, $name:expr, $arg_pos:expr) => {
        match $value {
            Value::Number(n) => *n,
            other => {
                return Err(EvalError::InvalidArguments(
                    format!(
                        "'{}' expects a number for argument {}, got {}",
                        $name,
                        $arg_pos,
                        other.type_name()
                    ),
                    $span,
                ));
            }
        }
    };
}

fn domain_error(name: &str, message: &str, span: Span) -> EvalError {
    EvalError::InvalidArguments(format!("'{}': {}", name, message), span)
}

fn fold_numbers<F: Fn(f64, f64) -> f64>(
    args: Vec<Value>,
    span: Span,
    start: f64,
    func: F,
    operator: &str,
) -> EvalResult {
    let mut acc = start;
    for (i, value) in args.iter().enumerate() {
        let num = expect_number!(value, span, operator, i + 1);
        acc = func(acc, num);
    }
    Ok(Value::Number(acc))
}

// Applies a unary f64 function
fn unary<F: Fn(f64) -> f64>(args: Vec<Value>, span: Span, func: F, name: &str) -> EvalResult {
    check_arity!(args, 1, span, name);
    let n = expect_number!(&args[0], span, name, 1);
    Ok(Value::Number(func(n)))
}

pub fn prim_add(args: Vec<Value>, span: Span) -> EvalResult {
    // (+) -> 0
    fold_numbers(args, span, 0.0, |acc, val| acc + val, "+")
}

pub fn prim_mul(args: Vec<Value>, span: Span) -> EvalResult {
    // (*) -> 1
    fold_numbers(args, span, 1.0, |acc, val| acc * val, "*")
}

pub fn prim_sub(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "-");
    let a = expect_number!(&args[0], span, "-", 1);
    let b = expect_number!(&args[1], span, "-", 2);
    Ok(Value::Number(a - b))
}

pub fn prim_div(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "/");
    let a = expect_number!(&args[0], span, "/", 1);
    let b = expect_number!(&args[1], span, "/", 2);
    if b == 0.0 {
        return Err(domain_error("/", "division by zero", span));
    }
    Ok(Value::Number(a / b))
}

pub fn prim_floor(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::floor, "floor")
}

pub fn prim_ceil(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::ceil, "ceil")
}

pub fn prim_sqrt(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::sqrt, "sqrt")
}

pub fn prim_abs(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::abs, "abs")
}

pub fn prim_pow(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "pow");
    let a = expect_number!(&args[0], span, "pow", 1);
    let b = expect_number!(&args[1], span, "pow", 2);
    Ok(Value::Number(a.powf(b)))
}

pub fn prim_sin(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::sin, "sin")
}

pub fn prim_cos(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::cos, "cos")
}

pub fn prim_tan(args: Vec<Value>, span: Span) -> EvalResult {
    unary(args, span, f64::tan, "tan")
}

// A number that carries no fractional part
fn is_integer(n: f64) -> bool {
    n.fract() == 0.0
}

fn factorial_of(n: f64) -> f64 {
    let mut result = 1.0;
    let mut k = n;
    while k > 0.0 {
        result *= k;
        k -= 1.0;
    }
    result
}

pub fn prim_factorial(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "factorial");
    let n = expect_number!(&args[0], span, "factorial", 1);
    if !is_integer(n) {
        return Err(domain_error("factorial", "n must be an integer", span));
    }
    if n < 0.0 {
        return Err(domain_error("factorial", "n must be positive", span));
    }
    Ok(Value::Number(factorial_of(n)))
}

/// Permutations: n! / (n - r)!
pub fn prim_npr(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "npr");
    let n = expect_number!(&args[0], span, "npr", 1);
    let r = expect_number!(&args[1], span, "npr", 2);
    if !is_integer(n) || !is_integer(r) {
        return Err(domain_error("npr", "n and r must be integers", span));
    }
    if n < 0.0 || r < 0.0 {
        return Err(domain_error("npr", "n and r must be positive", span));
    }
    if r > n {
        return Err(domain_error("npr", "r must be less than or equal to n", span));
    }
    Ok(Value::Number(factorial_of(n) / factorial_of(n - r)))
}

/// Combinations: npr(n, r) / r!
pub fn prim_ncr(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "ncr");
    let r = expect_number!(&args[1], span, "ncr", 2);
    // prim_npr re-validates the shared domain conditions
    match prim_npr(args, span)? {
        Value::Number(permutations) => Ok(Value::Number(permutations / factorial_of(r))),
        other => Err(domain_error("ncr", other.type_name(), span)),
    }
}

fn mean_of(nums: &[f64]) -> f64 {
    nums.iter().sum::<f64>() / nums.len() as f64
}

fn numbers_of(args: &[Value], span: Span, name: &str) -> EvalResult<Vec<f64>> {
    let mut nums = Vec::with_capacity(args.len());
    for (i, value) in args.iter().enumerate() {
        nums.push(expect_number!(value, span, name, i + 1));
    }
    Ok(nums)
}

pub fn prim_mean(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, min 1, span, "mean");
    let nums = numbers_of(&args, span, "mean")?;
    Ok(Value::Number(mean_of(&nums)))
}

// Population variance
pub fn prim_variance(args: Vec<Value>, span: Span) -> EvalResult {
    check_arity!(args, min 1, span, "variance");
    let nums = numbers_of(&args, span, "variance")?;
    let mean = mean_of(&nums);
    let variance = nums.iter().map(|n| (n - mean) * (n - mean)).sum::<f64>() / nums.len() as f64;
    Ok(Value::Number(variance))
}

pub fn prim_stddev(args: Vec<Value>, span: Span) -> EvalResult {
    match prim_variance(args, span)? {
        Value::Number(variance) => Ok(Value::Number(variance.sqrt())),
        other => Err(domain_error("stddev", other.type_name(), span)),
    }
}

fn add_builtin(table: &mut HashMap<String, Value>, name: &str, func: BuiltinFn) {
    table.insert(name.to_string(), Value::Builtin(func, name.to_string()));
}

/// The standard builtin table a typical embedding passes to `interpret`.
pub fn standard_builtins() -> HashMap<String, Value> {
    let mut table = HashMap::new();
    add_builtin(&mut table, "+", prim_add);
    add_builtin(&mut table, "-", prim_sub);
    add_builtin(&mut table, "*", prim_mul);
    add_builtin(&mut table, "/", prim_div);
    add_builtin(&mut table, "floor", prim_floor);
    add_builtin(&mut table, "ceil", prim_ceil);
    add_builtin(&mut table, "sqrt", prim_sqrt);
    add_builtin(&mut table, "abs", prim_abs);
    add_builtin(&mut table, "pow", prim_pow);
    add_builtin(&mut table, "sin", prim_sin);
    add_builtin(&mut table, "cos", prim_cos);
    add_builtin(&mut table, "tan", prim_tan);
    add_builtin(&mut table, "factorial", prim_factorial);
    add_builtin(&mut table, "npr", prim_npr);
    add_builtin(&mut table, "ncr", prim_ncr);
    add_builtin(&mut table, "mean", prim_mean);
    add_builtin(&mut table, "variance", prim_variance);
    add_builtin(&mut table, "stddev", prim_stddev);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::interpret;

    fn eval(input: &str) -> Result<Value, String> {
        interpret(&standard_builtins(), input)
    }

    fn assert_number(input: &str, expected: f64) {
        match eval(input) {
            Ok(Value::Number(n)) => {
                assert!(
                    (n - expected).abs() < 1e-9,
                    "Input: '{}', expected {}, got {}",
                    input,
                    expected,
                    n
                );
            }
            other => panic!("Input: '{}', expected a number, got: {:?}", input, other),
        }
    }

    fn assert_fails(input: &str) {
        assert!(eval(input).is_err(), "Input '{}' should fail", input);
    }

    #[test]
    fn test_arithmetic() {
        assert_number("(+ 1 2)", 3.0);
        assert_number("(+ 10 20 30 40)", 100.0);
        assert_number("(+)", 0.0); // Add identity
        assert_number("(* 2 3 4)", 24.0);
        assert_number("(*)", 1.0); // Multiply identity
        assert_number("(- 10 3)", 7.0);
        assert_number("(/ 10 4)", 2.5);
    }

    #[test]
    fn test_arithmetic_arity() {
        assert_fails("(- 1)");
        assert_fails("(- 1 2 3)");
        assert_fails("(/ 1)");
    }

    #[test]
    fn test_division_by_zero() {
        assert_fails("(/ 1 0)");
    }

    #[test]
    fn test_type_errors() {
        assert_fails("(+ 1 (lambda (x) x))");
        assert_fails("(floor (begin))");
    }

    #[test]
    fn test_rounding_and_powers() {
        assert_number("(floor 2.7)", 2.0);
        assert_number("(ceil 2.1)", 3.0);
        assert_number("(pow 2 10)", 1024.0);
        assert_number("(sqrt 16)", 4.0);
        assert_number("(abs -3)", 3.0);
    }

    #[test]
    fn test_trigonometry() {
        assert_number("(sin 0)", 0.0);
        assert_number("(cos 0)", 1.0);
        assert_number("(tan 0)", 0.0);
    }

    #[test]
    fn test_factorial() {
        assert_number("(factorial 0)", 1.0);
        assert_number("(factorial 5)", 120.0);
        assert_fails("(factorial 1.5)"); // n must be an integer
        assert_fails("(factorial -1)"); // n must be positive
    }

    #[test]
    fn test_permutations_and_combinations() {
        assert_number("(npr 5 2)", 20.0);
        assert_number("(ncr 5 2)", 10.0);
        assert_number("(ncr 5 0)", 1.0);
        assert_fails("(npr 2 5)"); // r must be <= n
        assert_fails("(npr 5 1.5)");
        assert_fails("(ncr -5 2)");
    }

    #[test]
    fn test_statistics() {
        assert_number("(mean 1 2 3 4)", 2.5);
        assert_number("(variance 2 4 4 4 5 5 7 9)", 4.0);
        assert_number("(stddev 2 4 4 4 5 5 7 9)", 2.0);
        assert_fails("(mean)");
        assert_fails("(variance)");
    }

    #[test]
    fn test_builtins_compose_with_closures() {
        assert_number(
            "(begin
               (define hypot (lambda (a b) (sqrt (+ (* a a) (* b b)))))
               (hypot 3 4))",
            5.0,
        );
    }
}
