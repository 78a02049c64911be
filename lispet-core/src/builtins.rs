//! The two builtin registries: special forms and functions.
//!
//! Both are fixed at startup and queried by name. Every entry receives its
//! argument forms unevaluated together with the caller's environment; a
//! "function" here is simply a builtin that happens to evaluate all of its
//! arguments uniformly, while a special form picks and chooses.

use std::rc::Rc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interpreter::eval;
use crate::language::{
    LambdaCell, Value, as_number, eq_values, head, is_atom, is_number, is_truthy, tail,
};

/// A host-implemented operation identified by a fixed string key.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub run: BuiltinFn,
}

/// Builtins receive the RAW argument forms; evaluating them is the
/// builtin's own responsibility.
pub type BuiltinFn = fn(&[Value], &mut Environment) -> Result<Value>;

pub static SPECIAL_FORMS: &[Builtin] = &[
    Builtin { name: "quote", run: quote },
    Builtin { name: "and", run: and },
    Builtin { name: "or", run: or },
    Builtin { name: "cond", run: cond },
    Builtin { name: "if", run: if_form },
    Builtin { name: "lambda", run: lambda },
    Builtin { name: "defun", run: defun },
    Builtin { name: "define", run: defun },
    Builtin { name: "let", run: let_form },
    Builtin { name: "set", run: set },
    Builtin { name: "eval", run: eval_form },
];

pub static FUNCTIONS: &[Builtin] = &[
    Builtin { name: "atom", run: atom },
    Builtin { name: "numberp", run: numberp },
    Builtin { name: "eq", run: eq },
    Builtin { name: "car", run: car },
    Builtin { name: "cdr", run: cdr },
    Builtin { name: "cons", run: cons },
    Builtin { name: "list", run: list },
    Builtin { name: "+", run: add },
    Builtin { name: "-", run: sub },
    Builtin { name: "*", run: mul },
    Builtin { name: "/", run: div },
    Builtin { name: "<", run: lt },
    Builtin { name: "<=", run: lte },
    Builtin { name: ">", run: gt },
    Builtin { name: ">=", run: gte },
    Builtin { name: "=", run: num_eq },
];

static INDEX: Lazy<FxHashMap<&'static str, &'static Builtin>> = Lazy::new(|| {
    SPECIAL_FORMS
        .iter()
        .chain(FUNCTIONS.iter())
        .map(|b| (b.name, b))
        .collect()
});

/// Look a builtin up by name across both registries.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    INDEX.get(name).copied()
}

// ============================================================================
// Arity helpers
// ============================================================================

fn exactly(args: &[Value], n: usize, op: &str) -> Result<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(Error::eval(format!(
            "expected {n} argument(s) for {op}, got {}",
            args.len()
        )))
    }
}

fn at_least(args: &[Value], n: usize, op: &str) -> Result<()> {
    if args.len() >= n {
        Ok(())
    } else {
        Err(Error::eval(format!(
            "at least {n} argument(s) required for {op}"
        )))
    }
}

// ============================================================================
// Numeric coercion
// ============================================================================

fn eval_number(form: &Value, env: &mut Environment) -> Result<f64> {
    let value = eval(form, env)?;
    as_number(&value).ok_or_else(|| Error::eval(format!("not a valid number: {value}")))
}

fn eval_numbers(args: &[Value], env: &mut Environment) -> Result<Vec<f64>> {
    args.iter().map(|arg| eval_number(arg, env)).collect()
}

// ============================================================================
// Special forms
// ============================================================================

fn quote(args: &[Value], _env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "quote")?;
    Ok(args[0].clone())
}

/// Short-circuits on the first false value; only nil and boolean false
/// count as false.
fn and(args: &[Value], env: &mut Environment) -> Result<Value> {
    for arg in args {
        if !is_truthy(&eval(arg, env)?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn or(args: &[Value], env: &mut Environment) -> Result<Value> {
    for arg in args {
        if is_truthy(&eval(arg, env)?) {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// First clause whose test is true wins: its last subform's value, or the
/// test's own value for a one-element clause. No match yields false.
fn cond(args: &[Value], env: &mut Environment) -> Result<Value> {
    for clause in args {
        let cells = match clause {
            Value::List(cells) if !cells.elements.is_empty() => cells,
            Value::List(_) | Value::Nil => {
                return Err(Error::eval("a nil clause was specified to cond"));
            }
            other => {
                return Err(Error::eval(format!(
                    "argument to cond was not a list: {other}"
                )));
            }
        };
        let check = eval(&cells.elements[0], env)?;
        if is_truthy(&check) {
            return if cells.elements.len() == 1 {
                Ok(check)
            } else {
                eval(&cells.elements[cells.elements.len() - 1], env)
            };
        }
    }
    Ok(Value::Bool(false))
}

/// `(if test then)` / `(if test then else)`, desugared to `cond`.
fn if_form(args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::eval("if requires 2 or 3 arguments"));
    }
    let then_clause = Value::list(vec![args[0].clone(), args[1].clone()]);
    let else_clause = Value::list(vec![
        Value::symbol("t"),
        args.get(2).cloned().unwrap_or(Value::Nil),
    ]);
    cond(&[then_clause, else_clause], env)
}

fn lambda(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 2, "lambda")?;
    make_closure(&args[0], Some(args[1].clone()), env)
}

/// Binds a named closure in the GLOBAL environment, wherever the defun
/// itself is evaluated. The closure still captures the local scope.
fn defun(args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::eval("defun requires 2 or 3 arguments"));
    }
    let Value::Symbol(name) = &args[0] else {
        return Err(Error::eval(format!(
            "function name must be a symbol: {}",
            args[0]
        )));
    };
    if !matches!(args[1], Value::List(_)) {
        return Err(Error::eval(format!(
            "function parameters must be a list: {}",
            args[1]
        )));
    }
    let closure = make_closure(&args[1], args.get(2).cloned(), env)?;
    env.global().define(*name, closure);
    Ok(Value::Nil)
}

fn make_closure(params_form: &Value, body: Option<Value>, env: &Environment) -> Result<Value> {
    let params = match params_form {
        Value::Nil => Vec::new(),
        Value::List(cells) => {
            let mut params = Vec::with_capacity(cells.elements.len());
            for param in &cells.elements {
                let Value::Symbol(sym) = param else {
                    return Err(Error::eval(format!(
                        "function parameter is not an atom: {param}"
                    )));
                };
                params.push(*sym);
            }
            params
        }
        other => {
            return Err(Error::eval(format!(
                "function parameter list must be a list: {other}"
            )));
        }
    };
    Ok(Value::Lambda(Rc::new(LambdaCell {
        params,
        body,
        env: env.clone(),
    })))
}

/// Bindings are evaluated against the OUTER environment; the body runs in
/// a fresh copy of it extended with the bindings.
fn let_form(args: &[Value], env: &mut Environment) -> Result<Value> {
    at_least(args, 2, "let")?;
    let mut scope = env.child();
    if let Value::List(bindings) = &args[0] {
        for entry in &bindings.elements {
            let pair = match entry {
                Value::List(pair) if pair.elements.len() == 2 => pair,
                other => {
                    return Err(Error::eval(format!(
                        "invalid variable binding statement for let: {other}"
                    )));
                }
            };
            let Value::Symbol(name) = pair.elements[0] else {
                return Err(Error::eval(format!(
                    "invalid variable binding statement for let: {entry}"
                )));
            };
            let value = eval(&pair.elements[1], env)?;
            scope.define(name, value);
        }
    }
    let mut result = Value::Nil;
    for form in &args[1..] {
        result = eval(form, &mut scope)?;
    }
    Ok(result)
}

/// Variadic symbol/value pairs. Every right-hand side is evaluated before
/// any assignment commits, and the commits land in the environment the
/// form was evaluated in - inside a `let` body that is the let frame, not
/// the global one.
fn set(args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.len() % 2 != 0 {
        return Err(Error::eval("odd number of arguments passed to set"));
    }
    let mut pending = Vec::with_capacity(args.len() / 2);
    let mut last = Value::Nil;
    for pair in args.chunks(2) {
        let Value::Symbol(name) = &pair[0] else {
            return Err(Error::eval(format!("not a symbol: {}", pair[0])));
        };
        if is_number(&pair[0]) {
            return Err(Error::eval(format!("not a symbol: {}", pair[0])));
        }
        let value = eval(&pair[1], env)?;
        last = value.clone();
        pending.push((*name, value));
    }
    for (name, value) in pending {
        env.define(name, value);
    }
    Ok(last)
}

/// Evaluates its argument, then evaluates the RESULT again - the
/// data-as-code escape hatch the prelude's `mapcar` and `apply` build on.
fn eval_form(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "eval")?;
    let once = eval(&args[0], env)?;
    eval(&once, env)
}

// ============================================================================
// Functions
// ============================================================================

fn atom(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "atom")?;
    let value = eval(&args[0], env)?;
    Ok(Value::Bool(is_atom(&value)))
}

fn numberp(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "numberp")?;
    let value = eval(&args[0], env)?;
    Ok(Value::Bool(is_number(&value)))
}

fn eq(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 2, "eq")?;
    let a = eval(&args[0], env)?;
    let b = eval(&args[1], env)?;
    Ok(Value::Bool(eq_values(&a, &b)))
}

fn car(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "car")?;
    let value = eval(&args[0], env)?;
    head(&value)
}

fn cdr(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 1, "cdr")?;
    let value = eval(&args[0], env)?;
    tail(&value)
}

/// Prepends onto nil or a list, always building a fresh list; the shared
/// tail is never mutated.
fn cons(args: &[Value], env: &mut Environment) -> Result<Value> {
    exactly(args, 2, "cons")?;
    let first = eval(&args[0], env)?;
    let rest = eval(&args[1], env)?;
    match rest {
        Value::Nil => Ok(Value::list(vec![first])),
        Value::List(cells) => {
            let mut elements = Vec::with_capacity(cells.elements.len() + 1);
            elements.push(first);
            elements.extend_from_slice(&cells.elements);
            Ok(Value::list(elements))
        }
        other => Err(Error::eval(format!(
            "the second argument to cons should be nil or a list: {other}"
        ))),
    }
}

fn list(args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.is_empty() {
        return Ok(Value::Nil);
    }
    let elements = args
        .iter()
        .map(|arg| eval(arg, env))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::list(elements))
}

// ============================================================================
// Arithmetic
// ============================================================================

fn add(args: &[Value], env: &mut Environment) -> Result<Value> {
    let nums = eval_numbers(args, env)?;
    Ok(Value::Number(nums.iter().fold(0.0, |acc, n| acc + n)))
}

fn mul(args: &[Value], env: &mut Environment) -> Result<Value> {
    let nums = eval_numbers(args, env)?;
    Ok(Value::Number(nums.iter().product()))
}

/// The fold subtracts EVERY argument, so the seed is doubled to cancel the
/// first one out - and zero for a single argument, which makes `(- x)`
/// negation.
fn sub(args: &[Value], env: &mut Environment) -> Result<Value> {
    at_least(args, 1, "subtraction")?;
    let nums = eval_numbers(args, env)?;
    let seed = if nums.len() == 1 { 0.0 } else { 2.0 * nums[0] };
    Ok(Value::Number(nums.iter().fold(seed, |acc, n| acc - n)))
}

/// Same seeding scheme as `-`: the fold divides by every argument, so the
/// seed is the square of the first - and one for a single argument, which
/// makes `(/ x)` the reciprocal.
fn div(args: &[Value], env: &mut Environment) -> Result<Value> {
    at_least(args, 1, "division")?;
    let nums = eval_numbers(args, env)?;
    let seed = if nums.len() == 1 {
        1.0
    } else {
        nums[0] * nums[0]
    };
    Ok(Value::Number(nums.iter().fold(seed, |acc, n| acc / n)))
}

// ============================================================================
// Comparisons
// ============================================================================

/// Chained comparison: the accumulator starts at the first value shifted
/// by `offset` (one unit inside the relation for the strict orders, so the
/// seed pair trivially holds), then every adjacent pair must satisfy the
/// relation.
fn chain(
    args: &[Value],
    env: &mut Environment,
    op: &str,
    offset: f64,
    rel: fn(f64, f64) -> bool,
) -> Result<Value> {
    at_least(args, 1, op)?;
    let nums = eval_numbers(args, env)?;
    let mut previous = nums[0] + offset;
    let mut holds = true;
    for &n in &nums {
        holds = holds && rel(previous, n);
        previous = n;
    }
    Ok(Value::Bool(holds))
}

fn lt(args: &[Value], env: &mut Environment) -> Result<Value> {
    chain(args, env, "less than", -1.0, |a, b| a < b)
}

fn lte(args: &[Value], env: &mut Environment) -> Result<Value> {
    chain(args, env, "less than or equal", 0.0, |a, b| a <= b)
}

fn gt(args: &[Value], env: &mut Environment) -> Result<Value> {
    chain(args, env, "greater than", 1.0, |a, b| a > b)
}

fn gte(args: &[Value], env: &mut Environment) -> Result<Value> {
    chain(args, env, "greater than or equal", 0.0, |a, b| a >= b)
}

fn num_eq(args: &[Value], env: &mut Environment) -> Result<Value> {
    chain(args, env, "equal", 0.0, |a, b| a == b)
}
