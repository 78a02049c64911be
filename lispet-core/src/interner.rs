//! Global symbol interner.
//!
//! Symbols are the most common value in a running program (every raw token
//! the reader emits is one), so they are interned once and compared as
//! integer keys instead of strings.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::RwLock;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static TABLE: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// Key of a string interned in the global symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(DefaultSymbol);

impl SymbolId {
    /// Intern `text`, returning the same key for the same text every time.
    pub fn intern(text: &str) -> Self {
        let mut table = TABLE.write().unwrap();
        SymbolId(table.get_or_intern(text))
    }

    /// The symbol's text as an owned `String`.
    pub fn text(&self) -> String {
        self.with_text(str::to_string)
    }

    /// Run `f` against the symbol's text without allocating.
    pub fn with_text<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let table = TABLE.read().unwrap();
        let s = table.resolve(self.0).expect("interned symbol is valid");
        f(s)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_text(|s| write!(f, "{s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_key() {
        assert_eq!(SymbolId::intern("quote"), SymbolId::intern("quote"));
    }

    #[test]
    fn different_text_different_key() {
        assert_ne!(SymbolId::intern("car"), SymbolId::intern("cdr"));
    }

    #[test]
    fn text_round_trips() {
        assert_eq!(SymbolId::intern("maplist").text(), "maplist");
    }

    #[test]
    fn display_matches_text() {
        assert_eq!(format!("{}", SymbolId::intern("c[ad]r")), "c[ad]r");
    }
}
