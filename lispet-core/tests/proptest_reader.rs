use lispet::{Value, read};
use proptest::prelude::*;

// ============================================================================
// Strategies for Generating Forms
// ============================================================================

/// Strategy for symbol text that contains no reader delimiters.
fn symbol_text() -> impl Strategy<Value = String> {
    "[a-z+*=<][a-z0-9+*=<.-]{0,8}"
}

/// Strategy for the shapes the reader itself can produce: symbols and
/// non-empty nested lists. Empty lists are excluded because they render
/// as `nil`, which reads back as a symbol.
fn form() -> impl Strategy<Value = Value> {
    let leaf = symbol_text().prop_map(|s| Value::symbol(&s));
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop::collection::vec(inner, 1..6).prop_map(Value::list)
    })
}

proptest! {
    #[test]
    fn rendered_forms_read_back_identically(value in form()) {
        let text = value.to_string();
        let forms = read(&text).expect("rendered form must be readable");
        prop_assert_eq!(forms.len(), 1);
        prop_assert_eq!(&forms[0], &value);
    }

    #[test]
    fn multiple_forms_read_in_order(values in prop::collection::vec(form(), 0..5)) {
        let text = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let forms = read(&text).expect("rendered forms must be readable");
        prop_assert_eq!(forms, values);
    }

    #[test]
    fn arbitrary_text_never_panics(text in "[ a-z0-9'()\"\r\n]{0,64}") {
        let _ = read(&text);
    }
}
