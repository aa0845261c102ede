//! Replacement handling
//!
//! Templates may contain these references:
//! - `$$` a literal dollar sign
//! - `$&` the whole match, `` $` `` the text before it, `$'` the text after it
//! - `$n` / `$nn` a numbered group
//! - `${n}` / `${name}` a numbered or named group
//!
//! A reference that doesn't resolve stays in the output as literal text.

use std::fmt;

use crate::engine::Match;
use crate::error::Result;
use crate::escape::escape_literal;
use crate::pattern::Pattern;

/// A part of a replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text
    Literal(String),
    /// `$&`
    WholeMatch,
    /// `` $` ``
    Before,
    /// `$'`
    After,
    /// `$n` or `$nn`, kept as digits until the group count is known
    Numbered(String),
    /// `${...}`
    Braced(String),
}

/// A parsed replacement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parse a replacement template. Parsing never fails; anything that isn't
    /// a reference is literal text.
    pub fn parse(input: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = input;

        while let Some(dollar) = rest.find('$') {
            literal.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];

            let (part, consumed) = match after.chars().next() {
                Some('$') => (None, 1),
                Some('&') => (Some(TemplatePart::WholeMatch), 1),
                Some('`') => (Some(TemplatePart::Before), 1),
                Some('\'') => (Some(TemplatePart::After), 1),
                Some(c) if c.is_ascii_digit() => {
                    let digits = after
                        .bytes()
                        .take(2)
                        .take_while(u8::is_ascii_digit)
                        .count();
                    (Some(TemplatePart::Numbered(after[..digits].to_string())), digits)
                }
                Some('{') => match braced_reference(after) {
                    Some(inner) => (Some(TemplatePart::Braced(inner.to_string())), inner.len() + 2),
                    None => (Some(TemplatePart::Literal("$".to_string())), 0),
                },
                _ => (Some(TemplatePart::Literal("$".to_string())), 0),
            };

            match part {
                None => literal.push('$'),
                Some(TemplatePart::Literal(text)) => literal.push_str(&text),
                Some(part) => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(part);
                }
            }
            rest = &after[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Template { parts }
    }

    /// The parsed parts
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Render the template for one match
    pub fn render(&self, m: &Match<'_>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::WholeMatch => out.push_str(m.as_str()),
                TemplatePart::Before => out.push_str(m.before()),
                TemplatePart::After => out.push_str(m.after()),
                TemplatePart::Numbered(digits) => render_numbered(&mut out, m, digits),
                TemplatePart::Braced(inner) => render_braced(&mut out, m, inner),
            }
        }
        out
    }
}

/// Content of `{...}` at the start of `text` if it is a valid reference
fn braced_reference(text: &str) -> Option<&str> {
    let close = text.find('}')?;
    let inner = &text[1..close];
    let valid = !inner.is_empty()
        && inner
            .chars()
            .all(|c| c == '$' || c == '_' || c.is_alphanumeric());
    valid.then_some(inner)
}

// The longest prefix naming an existing group wins; leftover digits are
// literal. `$0` never refers to the whole match.
fn render_numbered(out: &mut String, m: &Match<'_>, digits: &str) {
    let count = m.len() - 1;
    for width in (1..=digits.len()).rev() {
        let Ok(n) = digits[..width].parse::<usize>() else {
            continue;
        };
        if (1..=count).contains(&n) {
            out.push_str(m.group(n).unwrap_or_default());
            out.push_str(&digits[width..]);
            return;
        }
    }
    out.push('$');
    out.push_str(digits);
}

fn render_braced(out: &mut String, m: &Match<'_>, inner: &str) {
    let count = m.len() - 1;
    let index = match inner.parse::<usize>() {
        Ok(n) if n <= count => Some(n),
        _ => m.group_index(inner),
    };
    match index {
        Some(n) => out.push_str(m.group(n).unwrap_or_default()),
        None => {
            out.push_str("${");
            out.push_str(inner);
            out.push('}');
        }
    }
}

/// Render `template` for one match
pub fn render(m: &Match<'_>, template: &str) -> String {
    Template::parse(template).render(m)
}

/// What to put in place of each match
pub enum Replacement<'a> {
    /// A template with `$` references
    Template(&'a str),
    /// A function of the match and its ordinal; its output is used verbatim
    Generator(Box<dyn FnMut(&Match<'_>, usize) -> String + 'a>),
}

impl<'a> Replacement<'a> {
    /// Wrap a generator function
    pub fn with<F>(generator: F) -> Self
    where
        F: FnMut(&Match<'_>, usize) -> String + 'a,
    {
        Replacement::Generator(Box::new(generator))
    }
}

impl fmt::Debug for Replacement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Replacement::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

impl<'a> From<&'a str> for Replacement<'a> {
    fn from(template: &'a str) -> Self {
        Replacement::Template(template)
    }
}

/// What to search for
#[derive(Debug, Clone, Copy)]
pub enum SearchTarget<'a> {
    /// A compiled pattern
    Pattern(&'a Pattern),
    /// Literal text, matched exactly
    Literal(&'a str),
}

impl<'a> From<&'a Pattern> for SearchTarget<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        SearchTarget::Pattern(pattern)
    }
}

/// Replace matches of `target` in `text`
///
/// With `replace_all` unset, a pattern target follows its own `g` flag and a
/// literal target replaces only the first occurrence.
///
/// # Example
/// ```
/// use augrex::{replace, Pattern, SearchTarget};
///
/// let date = Pattern::new(r"(?<y>\d{4})-(?<m>\d{2})", "g").unwrap();
/// let out = replace("2024-05", SearchTarget::Pattern(&date), "${m}/${y}".into(), None).unwrap();
/// assert_eq!(out, "05/2024");
/// ```
pub fn replace<'a>(
    text: &str,
    target: SearchTarget<'_>,
    replacement: Replacement<'a>,
    replace_all: Option<bool>,
) -> Result<String> {
    let literal;
    let (pattern, all) = match target {
        SearchTarget::Pattern(pattern) => (pattern, replace_all.unwrap_or(pattern.is_global())),
        SearchTarget::Literal(needle) => {
            literal = Pattern::new(&escape_literal(needle), "")?;
            (&literal, replace_all.unwrap_or(false))
        }
    };

    let mut render_one: Box<dyn FnMut(&Match<'_>, usize) -> String + 'a> = match replacement {
        Replacement::Template(template) => {
            let template = Template::parse(template);
            Box::new(move |m: &Match<'_>, _ordinal: usize| template.render(m))
        }
        Replacement::Generator(generator) => generator,
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (ordinal, m) in pattern.matches(text).enumerate() {
        let m = m?;
        out.push_str(&text[last..m.start()]);
        out.push_str(&render_one(&m, ordinal));
        last = m.end();
        if !all {
            break;
        }
    }
    out.push_str(&text[last..]);
    Ok(out)
}
