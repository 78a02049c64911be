//! Core value representation and the primitive operations over it.

use std::fmt;
use std::rc::Rc;

use crate::builtins::Builtin;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interner::SymbolId;

// ============================================================================
// Core Type System
// ============================================================================

/// An ordered sequence of values. The empty list and `Nil` are
/// observationally equivalent everywhere except raw storage; both print as
/// `nil` and both evaluate to `Nil`.
#[derive(Clone, Debug, PartialEq)]
pub struct ListValue {
    pub elements: Vec<Value>,
}

/// A user-defined closure: parameter names, an optional body form (`defun`
/// with two arguments produces a bodyless closure that always returns
/// `Nil`), and a live handle to the defining environment. The handle is
/// snapshotted per call, so definitions added to the defining scope after
/// closure creation are visible on later calls - the recursive prelude
/// depends on this.
#[derive(Clone)]
pub struct LambdaCell {
    pub params: Vec<SymbolId>,
    pub body: Option<Value>,
    pub env: Environment,
}

// Environment carries no Debug/PartialEq; compare closures structurally by
// params and body only.
impl fmt::Debug for LambdaCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaCell")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env", &"<environment>")
            .finish()
    }
}

impl PartialEq for LambdaCell {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body
    }
}

/// The universal runtime value.
///
/// The reader emits only `Symbol` and `List`; `Number`, `Str`, `Bool` and
/// `Nil` are produced when the evaluator coerces raw token text, and
/// `Lambda`/`Builtin` only ever arise from evaluation.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    /// Only `true` has a name (`t`). `false` comes out of `cond`/`and`/`or`
    /// misses, prints as `nil`, and evaluates to `Nil`.
    Bool(bool),
    Number(f64),
    /// String literal text including both surrounding double quotes, with
    /// backslash escapes passed through verbatim.
    Str(Rc<str>),
    /// Raw token text, interned.
    Symbol(SymbolId),
    List(Rc<ListValue>),
    Lambda(Rc<LambdaCell>),
    /// A host-implemented operation identified by its fixed name.
    Builtin(&'static Builtin),
}

// Structural equality for tests and the reader round-trip property. The
// `eq` builtin uses `eq_values` below instead, which compares lists by
// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Value {
    /// Build a list value from its elements.
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(ListValue { elements }))
    }

    /// Intern `text` and wrap it as a symbol value.
    pub fn symbol(text: &str) -> Value {
        Value::Symbol(SymbolId::intern(text))
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

/// Canonical textual rendering: `nil` for nil/empty lists/false, `t` for
/// true, parenthesized space-joined lists, literal text for atoms.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", if *b { "t" } else { "nil" }),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(cells) => {
                if cells.elements.is_empty() {
                    return write!(f, "nil");
                }
                write!(f, "(")?;
                for (i, element) in cells.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Value::Lambda(_) => write!(f, "<lambda>"),
            Value::Builtin(b) => write!(f, "<builtin:{}>", b.name),
        }
    }
}

// ============================================================================
// Primitive Operations
// ============================================================================

/// An atom is anything that is not a non-empty list.
pub fn is_atom(value: &Value) -> bool {
    match value {
        Value::List(cells) => cells.elements.is_empty(),
        _ => true,
    }
}

/// Nil and the empty list are the only "empty" values.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::List(cells) => cells.elements.is_empty(),
        _ => false,
    }
}

/// Everything is true except `Nil` and boolean `false`.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Bool(false))
}

/// Numbers, and symbols whose raw text parses as a number, are numeric.
pub fn is_number(value: &Value) -> bool {
    as_number(value).is_some()
}

/// The numeric reading of a value, if it has one.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Symbol(s) => s.with_text(|text| text.parse::<f64>().ok()),
        _ => None,
    }
}

/// First element of a list; `Nil` and the empty list yield `Nil`.
pub fn head(value: &Value) -> Result<Value> {
    match value {
        Value::Nil => Ok(Value::Nil),
        Value::List(cells) => Ok(cells.elements.first().cloned().unwrap_or(Value::Nil)),
        other => Err(Error::eval(format!(
            "argument to car was not a list: {other}"
        ))),
    }
}

/// Remainder of a list as a list; an empty remainder collapses to `Nil`.
pub fn tail(value: &Value) -> Result<Value> {
    match value {
        Value::Nil => Ok(Value::Nil),
        Value::List(cells) => {
            if cells.elements.len() > 1 {
                Ok(Value::list(cells.elements[1..].to_vec()))
            } else {
                Ok(Value::Nil)
            }
        }
        other => Err(Error::eval(format!(
            "argument to cdr was not a list: {other}"
        ))),
    }
}

/// Equality as seen by the `eq` builtin: empty values are all equal, lists
/// and callables compare by identity, and atoms by value - where a symbol
/// with numeric text and an equal number count as the same value.
pub fn eq_values(a: &Value, b: &Value) -> bool {
    if is_empty(a) && is_empty(b) {
        return true;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    match (a, b) {
        (Value::List(x), Value::List(y)) => Rc::ptr_eq(x, y),
        (Value::Lambda(x), Value::Lambda(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => std::ptr::eq(*x, *y),
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        _ => false,
    }
}
