//! Pattern flags
//!
//! Flags are single ASCII letters. Some are consumed by the match layer or the
//! baseline engine, the rest only steer the dialect compiler:
//!
//! | flag | meaning                                   | consumed by      |
//! |------|-------------------------------------------|------------------|
//! | `g`  | repeat globally (replace all by default)  | match layer      |
//! | `i`  | case insensitive                          | baseline engine  |
//! | `m`  | `^` and `$` match at line boundaries      | baseline engine  |
//! | `y`  | sticky, matches must start at the cursor  | match layer      |
//! | `n`  | explicit capture, `(...)` doesn't capture | compiler         |
//! | `s`  | dot-all, `.` also matches newlines        | compiler         |
//! | `x`  | free-spacing, whitespace and `#` comments | compiler         |
//!
//! Any other letter is kept as a custom flag so user token rules can key
//! their activation predicates on it.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, SyntaxError};

pub const GLOBAL: char = 'g';
pub const IGNORE_CASE: char = 'i';
pub const MULTILINE: char = 'm';
pub const STICKY: char = 'y';
pub const EXPLICIT_CAPTURE: char = 'n';
pub const DOT_ALL: char = 's';
pub const EXTENDED: char = 'x';

/// A deduplicated set of flag characters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Flags(BTreeSet<char>);

impl Flags {
    /// Parse flags from a string like "gimx". Duplicates are ignored.
    pub fn parse(flags: &str) -> Result<Self> {
        let mut set = Flags::default();
        set.insert_all(flags)?;
        Ok(set)
    }

    /// Check whether a flag is set
    pub fn has(&self, flag: char) -> bool {
        self.0.contains(&flag)
    }

    /// Set a single flag
    pub fn insert(&mut self, flag: char) -> Result<()> {
        if !flag.is_ascii_alphabetic() {
            return Err(SyntaxError::InvalidFlag(flag).into());
        }
        self.0.insert(flag);
        Ok(())
    }

    /// Set every flag in `flags`
    pub fn insert_all(&mut self, flags: &str) -> Result<()> {
        for c in flags.chars() {
            self.insert(c)?;
        }
        Ok(())
    }

    /// Clear a flag
    pub fn remove(&mut self, flag: char) {
        self.0.remove(&flag);
    }

    /// Return a copy with `flag` set or cleared
    pub fn with(&self, flag: char, on: bool) -> Self {
        let mut copy = self.clone();
        if on {
            copy.0.insert(flag);
        } else {
            copy.0.remove(&flag);
        }
        copy
    }

    /// Inline flag group for the flags the baseline engine understands,
    /// e.g. `(?im)`. Empty when neither is set.
    pub fn baseline_prefix(&self) -> String {
        let native: String = [IGNORE_CASE, MULTILINE]
            .into_iter()
            .filter(|f| self.has(*f))
            .collect();
        if native.is_empty() {
            native
        } else {
            format!("(?{})", native)
        }
    }

    /// Whether no flag is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dedups_and_sorts() {
        let flags = Flags::parse("xgix").unwrap();
        assert_eq!(flags.to_string(), "gix");
        assert!(flags.has('x'));
        assert!(!flags.has('m'));
    }

    #[test]
    fn test_parse_rejects_non_letters() {
        assert!(Flags::parse("g-").is_err());
        assert!(Flags::parse("i m").is_err());
    }

    #[test]
    fn test_custom_letters_are_kept() {
        let flags = Flags::parse("z").unwrap();
        assert!(flags.has('z'));
    }

    #[test]
    fn test_baseline_prefix_strips_dialect_flags() {
        assert_eq!(Flags::parse("gnsxy").unwrap().baseline_prefix(), "");
        assert_eq!(Flags::parse("mxi").unwrap().baseline_prefix(), "(?im)");
        assert_eq!(Flags::parse("m").unwrap().baseline_prefix(), "(?m)");
    }

    #[test]
    fn test_with_toggles_copy_only() {
        let flags = Flags::parse("i").unwrap();
        let global = flags.with(GLOBAL, true);
        assert!(global.has('g'));
        assert!(!flags.has('g'));
        assert!(!global.with(GLOBAL, false).has('g'));
    }
}
