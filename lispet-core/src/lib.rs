pub mod bootstrap;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interner;
pub mod interpreter;
pub mod language;
pub mod reader;

// Re-export commonly used items for convenience
pub use bootstrap::{Interpreter, PRELUDE};
pub use builtins::{Builtin, BuiltinFn, lookup};
pub use environment::Environment;
pub use error::{Error, MAX_EVAL_DEPTH, Result};
pub use interner::SymbolId;
pub use interpreter::{TraceFn, apply, eval, set_trace_hook};
pub use language::{LambdaCell, ListValue, Value};
pub use reader::read;
