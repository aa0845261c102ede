//! Pattern compiler
//!
//! Rewrites dialect syntax into baseline syntax in a single left-to-right
//! pass. At every position the token registry gets the first chance; failing
//! that, a baseline multi-character token (escape, group opener, quantifier)
//! is copied through as a unit so its characters are never reinterpreted;
//! otherwise one character is copied. Scope flips on a bare `[` or `]`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, UsageError};
use crate::flags::Flags;
use crate::token::{CompileContext, Scope, TokenRegistry, in_callback};

/// Baseline multi-character tokens inside a character class (includes octals)
static CLASS_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\\(?:[pP]\{[^}]*\}|x\{[0-9A-Fa-f]+\}|[0-3][0-7]{0,2}|[4-7][0-7]?|x[0-9A-Fa-f]{2}|u[0-9A-Fa-f]{4}|c[A-Za-z]|[\s\S])",
    )
    .expect("class token pattern is valid")
});

/// Baseline multi-character tokens outside character classes (includes
/// octals and backreferences, excludes the classes themselves)
static DEFAULT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\\(?:0(?:[0-3][0-7]{0,2}|[4-7][0-7]?)?|[1-9][0-9]*|[pP]\{[^}]*\}|x\{[0-9A-Fa-f]+\}|x[0-9A-Fa-f]{2}|u[0-9A-Fa-f]{4}|c[A-Za-z]|[\s\S])|\(\?[:=!]|[?*+]\?|\{[0-9]+(?:,[0-9]*)?\}\??)",
    )
    .expect("default token pattern is valid")
});

static QUANTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[?*+]|\{[0-9]+(?:,[0-9]*)?\})\??").expect("quantifier pattern is valid")
});

/// Whether `rest` starts with a quantifier
pub(crate) fn starts_with_quantifier(rest: &str) -> bool {
    QUANTIFIER.is_match(rest)
}

fn baseline_token(rest: &str, scope: Scope) -> Option<&str> {
    let recognizer = if scope == Scope::INSIDE_CLASS {
        &CLASS_TOKEN
    } else {
        &DEFAULT_TOKEN
    };
    recognizer.find(rest).map(|m| m.as_str())
}

/// Output of a compilation
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The pattern in baseline syntax
    pub rewritten: String,
    /// Flags and capture names gathered while compiling
    pub context: CompileContext,
}

/// Compile `pattern` into baseline syntax using the rules in `registry`
///
/// # Example
/// ```
/// use augrex::{compile, Flags, TokenRegistry};
///
/// let compiled = compile("(?<year>\\d{4})", Flags::default(), TokenRegistry::builtin()).unwrap();
/// assert_eq!(compiled.rewritten, "(\\d{4})");
/// assert_eq!(compiled.context.capture_names(), &[Some("year".to_string())]);
/// ```
pub fn compile(pattern: &str, flags: Flags, registry: &TokenRegistry) -> Result<Compiled> {
    if in_callback() {
        return Err(UsageError::ReentrantCompile.into());
    }

    let mut ctx = CompileContext::new(flags);
    let mut output = String::with_capacity(pattern.len());
    let mut scope = Scope::OUTSIDE_CLASS;
    let mut pos = 0;

    while pos < pattern.len() {
        if let Some(hit) = registry.try_at(pattern, pos, scope, &mut ctx)? {
            output.push_str(&hit.output);
            pos += match hit.consumed {
                0 => pattern[pos..].chars().next().map_or(1, char::len_utf8),
                n => n,
            };
            continue;
        }

        if let Some(token) = baseline_token(&pattern[pos..], scope) {
            output.push_str(token);
            pos += token.len();
            continue;
        }

        let Some(c) = pattern[pos..].chars().next() else {
            break;
        };
        match c {
            '[' => scope = Scope::INSIDE_CLASS,
            ']' => scope = Scope::OUTSIDE_CLASS,
            _ => {}
        }
        output.push(c);
        pos += c.len_utf8();
    }

    debug!(
        "compiled `{}` -> `{}` ({} groups, flags `{}`)",
        pattern,
        output,
        ctx.capture_count(),
        ctx.flags()
    );

    Ok(Compiled {
        rewritten: output,
        context: ctx,
    })
}
