//! Error types at the core boundary.
//!
//! Three kinds reach callers: `Syntax` from the reader, `Eval` (plus the
//! resource-exhaustion `RecursionLimit`) from the evaluator, and the fatal
//! `Bootstrap` wrapper for prelude definitions that fail during reset.
//! Nothing is retried or suppressed internally.

use thiserror::Error;

/// Evaluation depth ceiling; see [`Error::RecursionLimit`].
pub const MAX_EVAL_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed input text. Aborts the current `read` call only.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Semantic failure during evaluation. The global environment keeps
    /// whatever mutations were committed before the failure.
    #[error("eval error: {0}")]
    Eval(String),

    /// A form recursed past [`MAX_EVAL_DEPTH`] nested evaluations. Reported
    /// instead of letting deep user recursion take down the host stack.
    #[error("recursion limit of {MAX_EVAL_DEPTH} nested evaluations exceeded")]
    RecursionLimit,

    /// A prelude definition failed during reset. The standard library is
    /// part of the language; an interpreter that fails here is unusable.
    #[error("bootstrap definition failed: {form}: {source}")]
    Bootstrap {
        form: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax(message.into())
    }

    pub(crate) fn eval(message: impl Into<String>) -> Self {
        Error::Eval(message.into())
    }
}
