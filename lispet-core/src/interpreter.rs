//! The evaluator: dispatch, application, and the accessor shorthand.
//!
//! Evaluation is plain recursion guarded by an explicit depth counter, so a
//! runaway user program is reported as `Error::RecursionLimit` instead of
//! taking the host stack down. Callables receive their arguments RAW - the
//! callee decides what to evaluate and in which environment, which is what
//! makes `quote`, `cond`, `let` and friends possible at all.

use std::cell::{Cell, RefCell};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::builtins;
use crate::environment::Environment;
use crate::error::{Error, MAX_EVAL_DEPTH, Result};
use crate::interner::SymbolId;
use crate::language::{LambdaCell, Value, head, tail};

/// `car`/`cdr` composition shorthand: `cadr`, `caddr`, `cdar`, ...
static ACCESSOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^c[ad]+r$").unwrap());

/// Observer callback fired before each evaluation step. Receives the form
/// about to be evaluated and the environment it will be evaluated in; it
/// must never influence the result.
pub type TraceFn = Box<dyn FnMut(&Value, &Environment)>;

thread_local! {
    static TRACE_HOOK: RefCell<Option<TraceFn>> = const { RefCell::new(None) };
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Install (or with `None`, remove) the per-thread trace hook.
pub fn set_trace_hook(hook: Option<TraceFn>) {
    TRACE_HOOK.with(|cell| *cell.borrow_mut() = hook);
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self> {
        EVAL_DEPTH.with(|depth| {
            if depth.get() >= MAX_EVAL_DEPTH {
                return Err(Error::RecursionLimit);
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Evaluate one form against an environment.
pub fn eval(form: &Value, env: &mut Environment) -> Result<Value> {
    TRACE_HOOK.with(|cell| {
        if let Some(hook) = cell.borrow_mut().as_mut() {
            hook(form, env);
        }
    });
    let _guard = DepthGuard::enter()?;

    match form {
        Value::Nil => Ok(Value::Nil),
        // `false` has no printed name and evaluates away to nil.
        Value::Bool(false) => Ok(Value::Nil),
        Value::List(cells) => match cells.elements.split_first() {
            None => Ok(Value::Nil),
            Some((operator, args)) => {
                let target = eval(operator, env)?;
                apply(&target, args, env)
            }
        },
        Value::Symbol(sym) => eval_symbol(*sym, env),
        // Numbers, strings, `t`, closures and builtins self-evaluate.
        other => Ok(other.clone()),
    }
}

/// Apply an evaluated call target to the raw argument forms.
pub fn apply(target: &Value, args: &[Value], env: &mut Environment) -> Result<Value> {
    match target {
        Value::Lambda(cell) => apply_closure(cell, args, env),
        Value::Builtin(builtin) => (builtin.run)(args, env),
        Value::Symbol(sym) => {
            let name = sym.text();
            match builtins::lookup(&name) {
                Some(builtin) => (builtin.run)(args, env),
                None if ACCESSOR.is_match(&name) => apply_accessor(&name, args, env),
                None => Err(Error::eval(format!("unknown function: {name}"))),
            }
        }
        // A quoted (lambda ...) form in call position: evaluate it into a
        // closure, then apply that.
        Value::List(cells) if is_lambda_form(cells.elements.first()) => {
            match eval(target, env)? {
                Value::Lambda(cell) => apply_closure(&cell, args, env),
                other => Err(Error::eval(format!("unknown function: {other}"))),
            }
        }
        other => Err(Error::eval(format!("unknown function: {other}"))),
    }
}

fn is_lambda_form(operator: Option<&Value>) -> bool {
    match operator {
        Some(Value::Symbol(sym)) => sym.with_text(|name| name == "lambda"),
        _ => false,
    }
}

/// Symbol coercion, tried in order: string literal, number, `nil`, `t`,
/// environment binding, known callable name, and finally unbound.
fn eval_symbol(sym: SymbolId, env: &Environment) -> Result<Value> {
    let text = sym.text();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Ok(Value::Str(text.into()));
    }
    if let Ok(n) = text.parse::<f64>() {
        return Ok(Value::Number(n));
    }
    match text.as_str() {
        "nil" => return Ok(Value::Nil),
        "t" => return Ok(Value::Bool(true)),
        _ => {}
    }
    if let Some(value) = env.lookup(sym) {
        return Ok(value);
    }
    // Callable names evaluate to themselves so functions can be passed
    // around by name.
    if builtins::lookup(&text).is_some() || ACCESSOR.is_match(&text) {
        return Ok(Value::Symbol(sym));
    }
    Err(Error::eval(format!("unbound variable: {text}")))
}

/// Call a closure: exact parameter-count match, arguments evaluated in the
/// caller's environment, body evaluated in a fresh copy of the defining
/// environment extended with the parameter bindings.
fn apply_closure(cell: &LambdaCell, args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.len() != cell.params.len() {
        return Err(Error::eval(format!(
            "invalid number of arguments for function (expected {}, got {})",
            cell.params.len(),
            args.len()
        )));
    }
    let Some(body) = &cell.body else {
        return Ok(Value::Nil);
    };
    let mut call_env = cell.env.child();
    for (param, arg) in cell.params.iter().zip(args) {
        let value = eval(arg, env)?;
        call_env.define(*param, value);
    }
    eval(body, &mut call_env)
}

/// Decode a `c[ad]+r` name into its `car`/`cdr` chain, applied right to
/// left to the evaluated single argument.
fn apply_accessor(name: &str, args: &[Value], env: &mut Environment) -> Result<Value> {
    if args.len() != 1 {
        return Err(Error::eval(format!(
            "{name} expects exactly 1 argument, got {}",
            args.len()
        )));
    }
    let mut value = eval(&args[0], env)?;
    for step in name[1..name.len() - 1].chars().rev() {
        value = if step == 'a' {
            head(&value)?
        } else {
            tail(&value)?
        };
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn eval_str(text: &str, env: &mut Environment) -> Result<Value> {
        let forms = read(text).unwrap();
        let mut result = Value::Nil;
        for form in &forms {
            result = eval(form, env)?;
        }
        Ok(result)
    }

    #[test]
    fn accessor_names_decode_right_to_left() {
        let mut env = Environment::new();
        let v = eval_str("(cadr '(1 2 3))", &mut env).unwrap();
        assert_eq!(v.to_string(), "2");
        let v = eval_str("(caddr '(1 2 3))", &mut env).unwrap();
        assert_eq!(v.to_string(), "3");
        let v = eval_str("(cdar '((1 2) 3))", &mut env).unwrap();
        assert_eq!(v.to_string(), "(2)");
        let v = eval_str("(caar '((1 2) 3))", &mut env).unwrap();
        assert_eq!(v.to_string(), "1");
    }

    #[test]
    fn accessor_requires_one_argument() {
        let mut env = Environment::new();
        assert!(eval_str("(cadr)", &mut env).is_err());
        assert!(eval_str("(cadr '(1) '(2))", &mut env).is_err());
    }

    #[test]
    fn builtin_names_evaluate_to_themselves() {
        let mut env = Environment::new();
        assert_eq!(eval_str("car", &mut env).unwrap(), Value::symbol("car"));
        assert_eq!(eval_str("cadr", &mut env).unwrap(), Value::symbol("cadr"));
        assert!(eval_str("cxr", &mut env).is_err());
    }

    #[test]
    fn builtin_values_apply_in_call_position() {
        let mut env = Environment::new();
        let plus = builtins::lookup("+").unwrap();
        let form = Value::list(vec![
            Value::Builtin(plus),
            Value::symbol("1"),
            Value::symbol("2"),
        ]);
        assert_eq!(eval(&form, &mut env).unwrap().to_string(), "3");
    }

    #[test]
    fn deep_recursion_reports_the_limit() {
        let mut env = Environment::new();
        eval_str("(defun spin (x) (spin x))", &mut env).unwrap();
        let err = eval_str("(spin 1)", &mut env).unwrap_err();
        assert_eq!(err, Error::RecursionLimit);
        // The counter unwinds; evaluation still works afterwards.
        assert_eq!(eval_str("(+ 1 1)", &mut env).unwrap().to_string(), "2");
    }

    #[test]
    fn trace_hook_observes_forms_without_changing_results() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        set_trace_hook(Some(Box::new(move |form, _env| {
            sink.borrow_mut().push(form.to_string());
        })));

        let mut env = Environment::new();
        let v = eval_str("(+ 1 2)", &mut env).unwrap();
        set_trace_hook(None);

        assert_eq!(v.to_string(), "3");
        let seen = seen.borrow();
        assert!(seen.contains(&"(+ 1 2)".to_string()));
        assert!(seen.contains(&"1".to_string()));
    }
}
