//! The reader: raw text to a forest of list structures.
//!
//! A single left-to-right scan over the character stream. Atoms come out as
//! raw-text symbols; the evaluator owns all coercion to numbers, strings,
//! `nil` and `t`. Parenthesized lists and the `'` quote shorthand are built
//! with one stack of in-progress frames, where a frame remembers whether a
//! `(` or a `'` opened it.

use crate::error::{Error, Result};
use crate::language::Value;

/// Characters that end the token being accumulated. Everything else,
/// tabs included, is token text.
const DELIMITERS: &[char] = ['\'', '"', '(', ')', ' ', '\r', '\n'].as_slice();

enum FrameKind {
    /// Opened by `(`, closed by `)`.
    Paren,
    /// Synthetic frame opened by `'`, pre-seeded with the symbol `quote`;
    /// collapses into its parent as soon as it holds one argument.
    Quote,
}

struct Frame {
    kind: FrameKind,
    elements: Vec<Value>,
}

/// Parse `text` into its top-level forms. Pure and side-effect free.
pub fn read(text: &str) -> Result<Vec<Value>> {
    Reader::default().run(text)
}

#[derive(Default)]
struct Reader {
    top: Vec<Value>,
    frames: Vec<Frame>,
    token: String,
}

impl Reader {
    fn run(mut self, text: &str) -> Result<Vec<Value>> {
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if !DELIMITERS.contains(&c) {
                self.token.push(c);
                continue;
            }
            self.flush_token();
            match c {
                '(' => self.frames.push(Frame {
                    kind: FrameKind::Paren,
                    elements: Vec::new(),
                }),
                ')' => self.close_paren()?,
                '"' => {
                    let literal = read_string_literal(&mut chars)?;
                    self.push_form(Value::symbol(&literal));
                }
                '\'' => self.frames.push(Frame {
                    kind: FrameKind::Quote,
                    elements: vec![Value::symbol("quote")],
                }),
                _ => {} // whitespace: the flush was the whole job
            }
        }
        self.finish()
    }

    /// Turn any accumulated token text into an atom of the current frame.
    fn flush_token(&mut self) {
        if !self.token.is_empty() {
            let atom = Value::symbol(&self.token);
            self.token.clear();
            self.push_form(atom);
        }
    }

    /// Append a completed form to the innermost frame, then collapse every
    /// quote frame it fills. The eager collapse is what lets `''x` nest and
    /// keeps `'` independent of parenthesized lists.
    fn push_form(&mut self, form: Value) {
        let mut form = Some(form);
        while let Some(f) = form.take() {
            match self.frames.last_mut() {
                None => self.top.push(f),
                Some(frame) => {
                    frame.elements.push(f);
                    if matches!(frame.kind, FrameKind::Quote) && frame.elements.len() == 2 {
                        let done = self.frames.pop().map(|q| Value::list(q.elements));
                        form = done;
                    }
                }
            }
        }
    }

    fn close_paren(&mut self) -> Result<()> {
        // A quote opened right before this `)` never received its form;
        // fold whatever it accumulated.
        if let Some(frame) = self.frames.last() {
            if matches!(frame.kind, FrameKind::Quote) && frame.elements.len() < 2 {
                let pending = self.frames.pop().map(|q| Value::list(q.elements));
                if let Some(pending) = pending {
                    self.push_form(pending);
                }
            }
        }
        match self.frames.pop() {
            Some(frame) if matches!(frame.kind, FrameKind::Paren) => {
                self.push_form(Value::list(frame.elements));
                Ok(())
            }
            _ => Err(Error::syntax(
                "unbalanced right paren (unexpected/extra right paren)",
            )),
        }
    }

    fn finish(mut self) -> Result<Vec<Value>> {
        self.flush_token();
        if self
            .frames
            .iter()
            .any(|f| matches!(f.kind, FrameKind::Paren))
        {
            return Err(Error::syntax("unbalanced parens (missing right paren)"));
        }
        // Pending quotes with no following form fold in whatever they hold.
        while let Some(frame) = self.frames.pop() {
            self.push_form(Value::list(frame.elements));
        }
        Ok(self.top)
    }
}

/// Scan a string literal after its opening quote. The returned token keeps
/// both delimiting quotes, and a backslash suppresses the delimiter meaning
/// of exactly the next character while both stay in the token verbatim.
fn read_string_literal(chars: &mut std::str::Chars<'_>) -> Result<String> {
    let mut token = String::from('"');
    let mut escaped = false;
    for c in chars.by_ref() {
        token.push(c);
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Ok(token);
        }
    }
    Err(Error::syntax("unbalanced quotation"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(text: &str) -> Value {
        let mut forms = read(text).unwrap();
        assert_eq!(forms.len(), 1, "expected one form from {text:?}");
        forms.remove(0)
    }

    #[test]
    fn atoms_are_raw_symbols() {
        assert_eq!(read_one("42"), Value::symbol("42"));
        assert_eq!(read_one("foo"), Value::symbol("foo"));
    }

    #[test]
    fn nested_lists() {
        assert_eq!(read_one("(a (b c) d)").to_string(), "(a (b c) d)");
    }

    #[test]
    fn quote_sugar_wraps_the_next_form() {
        assert_eq!(read_one("'a").to_string(), "(quote a)");
        assert_eq!(read_one("'(1 2)").to_string(), "(quote (1 2))");
        assert_eq!(read_one("''x").to_string(), "(quote (quote x))");
    }

    #[test]
    fn quote_folds_inside_lists() {
        assert_eq!(read_one("(a 'b c)").to_string(), "(a (quote b) c)");
        assert_eq!(read_one("(a '\"s\" b)").to_string(), "(a (quote \"s\") b)");
    }

    #[test]
    fn string_token_keeps_quotes_and_escapes() {
        let form = read_one(r#""a\"b""#);
        assert_eq!(form, Value::symbol(r#""a\"b""#));
    }

    #[test]
    fn string_may_contain_delimiters() {
        assert_eq!(read_one(r#""( ) '""#), Value::symbol(r#""( ) '""#));
    }

    #[test]
    fn multiple_top_level_forms() {
        let forms = read("a (b) 'c").unwrap();
        assert_eq!(forms.len(), 3);
        assert_eq!(forms[2].to_string(), "(quote c)");
    }

    #[test]
    fn extra_right_paren_is_a_syntax_error() {
        assert!(matches!(read(")"), Err(Error::Syntax(_))));
        assert!(matches!(read("(a))"), Err(Error::Syntax(_))));
    }

    #[test]
    fn missing_right_paren_is_a_syntax_error() {
        assert!(matches!(read("(+ 1 2"), Err(Error::Syntax(_))));
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = read("\"abc").unwrap_err();
        assert!(matches!(err, Error::Syntax(ref m) if m.contains("quotation")));
    }

    #[test]
    fn dangling_quote_folds_what_it_has() {
        assert_eq!(read("'").unwrap()[0].to_string(), "(quote)");
        assert_eq!(read_one("'x").to_string(), "(quote x)");
    }

    #[test]
    fn empty_list_reads_as_empty_list() {
        assert_eq!(read_one("()"), Value::list(vec![]));
    }
}
