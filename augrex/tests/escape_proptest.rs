//! Property-based tests for literal escaping and plain-pattern compilation

use augrex::{Flags, Pattern, TokenRegistry, compile, escape_literal};
use proptest::prelude::*;

/// Pieces of baseline syntax the dialect leaves untouched
fn plain_piece() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "a", "b", "z", "0", r"\d", r"\w", r"\s", r"\.", r"\(", "[a-z]", r"[^\]x]", "(?:ab)",
        "(?=c)", "(?!d)", "(e)", "+", "*", "?", "+?", "{2}", "{1,3}", "|", "^", "$", ".", "-",
    ])
}

fn plain_pattern() -> impl Strategy<Value = String> {
    prop::collection::vec(plain_piece(), 0..12).prop_map(|pieces| pieces.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_escaped_text_matches_itself(text in "\\PC{0,24}") {
        let pattern = Pattern::new(&escape_literal(&text), "").unwrap();
        let m = pattern.exec(&text).unwrap();
        prop_assert!(m.is_some(), "no match for {:?}", text);
        prop_assert_eq!(m.unwrap().as_str(), text.as_str());
    }

    #[test]
    fn test_escaped_text_is_found_inside_other_text(
        prefix in "[a-z ]{0,8}",
        text in "\\PC{1,16}",
        suffix in "[a-z ]{0,8}",
    ) {
        let pattern = Pattern::new(&escape_literal(&text), "x").unwrap();
        let haystack = format!("{prefix}{text}{suffix}");
        let m = pattern.exec(&haystack).unwrap().unwrap();
        prop_assert_eq!(m.as_str(), text.as_str());
        prop_assert_eq!(&haystack[m.start()..m.start() + text.len()], text.as_str());
    }

    #[test]
    fn test_plain_patterns_compile_unchanged(pattern in plain_pattern()) {
        let compiled = compile(&pattern, Flags::default(), TokenRegistry::builtin()).unwrap();
        prop_assert_eq!(&compiled.rewritten, &pattern);
        prop_assert!(!compiled.context.has_named_capture());
    }
}
