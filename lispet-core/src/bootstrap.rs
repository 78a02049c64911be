//! The self-hosted prelude and the [`Interpreter`] facade that loads it.
//!
//! Everything past the builtin registries is written in the language
//! itself and evaluated into the global environment at startup. The
//! definitions deliberately stay within the seven McCarthy primitives
//! plus `cond`, `defun` and `eval`.

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interpreter::eval;
use crate::language::Value;
use crate::reader::read;

/// Library functions evaluated into every fresh global environment, in
/// order; later definitions may call earlier ones.
pub const PRELUDE: &[&str] = &[
    "(defun null (x) (eq x '()))",
    "(defun not (x) (cond (x '()) (t t)))",
    "(defun append (x y) (cond ((null x) y) (t (cons (car x) (append (cdr x) y)))))",
    "(defun pair (x y) (cond ((and (null x) (null y)) '()) ((and (not (atom x)) (not (atom y))) (cons (list (car x) (car y)) (pair (cdr x) (cdr y))))))",
    "(defun assoc (x y) (cond ((eq (caar y) x) (cadar y)) (t (assoc x (cdr y)))))",
    "(defun maplist (x f) (cond ((null x) '()) (t (cons (f x) (maplist (cdr x) f)))))",
    "(defun len (s) (cond ((null s) 0) (t (+ 1 (len (cdr s))))))",
    "(defun flatten (s) (cond ((null s) nil) ((atom (car s)) (cons (car s) (flatten (cdr s)))) (t (append (flatten (car s)) (flatten (cdr s))))))",
    "(defun equal (x y) (or (and (atom x) (atom y) (eq x y)) (and (not (atom x)) (not (atom y)) (equal (car x) (car y)) (equal (cdr x) (cdr y)))))",
    "(defun member (x y) (and (not (null y)) (or (equal x (car y)) (member x (cdr y)))))",
    "(defun last (e) (cond ((atom e) nil) ((null (cdr e)) (car e)) (t (last (cdr e)))))",
    "(defun qreverse (x y) (cond ((null x) y) (t (qreverse (cdr x) (cons (car x) y)))))",
    "(defun reverse (x) (qreverse x nil))",
    "(defun remove (e l) (cond ((null l) nil) ((equal e (car l)) (remove e (cdr l))) (t (cons (car l) (remove e (cdr l))))))",
    "(defun mapcar (f l) (cond ((null l) nil) (t (cons (eval (list f (list 'quote (car l)))) (mapcar f (cdr l))))))",
    "(defun apply (f args) (cond ((null args) nil) (t (eval (cons f args)))))",
];

/// A global environment preloaded with [`PRELUDE`], plus the top-level
/// read-and-evaluate loop most callers want.
pub struct Interpreter {
    global: Environment,
}

impl Interpreter {
    pub fn new() -> Result<Self> {
        let mut interpreter = Interpreter {
            global: Environment::new(),
        };
        interpreter.load_prelude()?;
        Ok(interpreter)
    }

    /// Discards every definition, user and prelude alike, and reloads
    /// the prelude into a fresh global environment.
    pub fn reset(&mut self) -> Result<()> {
        self.global = Environment::new();
        self.load_prelude()
    }

    /// Reads every form in `text` and evaluates them in order against the
    /// global environment, yielding the last result. Empty input is nil.
    pub fn eval_top_level(&mut self, text: &str) -> Result<Value> {
        let mut result = Value::Nil;
        for form in &read(text)? {
            result = eval(form, &mut self.global)?;
        }
        Ok(result)
    }

    pub fn global_env(&mut self) -> &mut Environment {
        &mut self.global
    }

    fn load_prelude(&mut self) -> Result<()> {
        for form in PRELUDE {
            self.eval_top_level(form).map_err(|err| Error::Bootstrap {
                form: (*form).to_string(),
                source: Box::new(err),
            })?;
        }
        Ok(())
    }
}
