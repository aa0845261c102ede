//! Literal escaping

/// Characters that carry meaning in pattern syntax
const META: &[char] = &[
    '-', '[', ']', '{', '}', '(', ')', '*', '+', '?', '.', ',', '\\', '^', '$', '|', '#',
];

/// Escape `text` so that, embedded in a pattern, it matches only itself
///
/// Metacharacters get a backslash. Whitespace is written as a `\x{..}`
/// escape so that free-spacing mode cannot strip it.
///
/// # Example
/// ```
/// use augrex::escape_literal;
///
/// assert_eq!(escape_literal("1+1"), r"1\+1");
/// assert_eq!(escape_literal("a b"), r"a\x{20}b");
/// ```
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if META.contains(&c) {
            out.push('\\');
            out.push(c);
        } else if c.is_whitespace() {
            out.push_str(&format!("\\x{{{:X}}}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}
