//! Lexical environments.
//!
//! An environment is a flat symbol-to-value map behind a cheap-clone shared
//! handle. Scoping works by copying: a call or `let` frame starts as a
//! snapshot of the defining/outer frame's bindings, so `set` inside it
//! mutates only that frame and nothing leaks back out when it is dropped.
//! Every frame keeps a handle to the global environment so `defun` can bind
//! there no matter where it is evaluated.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::interner::SymbolId;
use crate::language::Value;

struct EnvState {
    bindings: FxHashMap<SymbolId, Value>,
    /// `None` means this frame IS the global environment.
    global: Option<Environment>,
}

#[derive(Clone)]
pub struct Environment {
    state: Rc<RefCell<EnvState>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a fresh global environment with no bindings.
    pub fn new() -> Self {
        Environment {
            state: Rc::new(RefCell::new(EnvState {
                bindings: FxHashMap::default(),
                global: None,
            })),
        }
    }

    /// Create a child frame: a copy of this frame's bindings sharing the
    /// same global handle.
    pub fn child(&self) -> Self {
        let bindings = self.state.borrow().bindings.clone();
        Environment {
            state: Rc::new(RefCell::new(EnvState {
                bindings,
                global: Some(self.global()),
            })),
        }
    }

    /// The global environment this frame belongs to (itself, at the root).
    pub fn global(&self) -> Environment {
        match &self.state.borrow().global {
            Some(global) => global.clone(),
            None => self.clone(),
        }
    }

    /// Bind `name` in THIS frame, replacing any previous binding.
    pub fn define(&self, name: SymbolId, value: Value) {
        self.state.borrow_mut().bindings.insert(name, value);
    }

    pub fn lookup(&self, name: SymbolId) -> Option<Value> {
        self.state.borrow().bindings.get(&name).cloned()
    }

    /// Number of bindings in this frame; used by the trace hook and tests.
    pub fn len(&self) -> usize {
        self.state.borrow().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().bindings.is_empty()
    }

    /// Snapshot of the bindings in this frame, for diagnostic display.
    pub fn snapshot(&self) -> Vec<(SymbolId, Value)> {
        self.state
            .borrow()
            .bindings
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }
}
