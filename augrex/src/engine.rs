//! Match engine
//!
//! Runs a compiled [`Pattern`] against subject text and decorates the
//! baseline engine's result with the dialect's capture names.

use std::ops::Range;
use std::sync::Arc;

use crate::base;
use crate::error::{Result, UsageError};
use crate::pattern::Pattern;

/// A match result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    input: &'t str,
    span: Range<usize>,
    /// Spans of groups 1.., `None` for groups that did not participate
    groups: Vec<Option<Range<usize>>>,
    names: Arc<[Option<String>]>,
}

impl<'t> Match<'t> {
    /// The start position of the match
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// The end position of the match (exclusive)
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// The matched text
    pub fn as_str(&self) -> &'t str {
        &self.input[self.span.clone()]
    }

    /// Whether the match is zero-length
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// The full subject text
    pub fn input(&self) -> &'t str {
        self.input
    }

    /// Text before the match
    pub fn before(&self) -> &'t str {
        &self.input[..self.span.start]
    }

    /// Text after the match
    pub fn after(&self) -> &'t str {
        &self.input[self.span.end..]
    }

    /// Number of groups, counting the whole match as group 0
    pub fn len(&self) -> usize {
        self.groups.len() + 1
    }

    /// Span of a group; 0 is the whole match
    pub fn range(&self, n: usize) -> Option<Range<usize>> {
        match n {
            0 => Some(self.span.clone()),
            n => self.groups.get(n - 1).cloned().flatten(),
        }
    }

    /// Text of a group; 0 is the whole match. `None` if the group did not
    /// participate or doesn't exist.
    pub fn group(&self, n: usize) -> Option<&'t str> {
        self.range(n).map(|range| &self.input[range])
    }

    /// Text of a named group. If several groups share the name, the last one
    /// decides.
    pub fn named_group(&self, name: &str) -> Option<&'t str> {
        let index = self
            .names
            .iter()
            .rposition(|n| n.as_deref() == Some(name))?;
        self.group(index + 1)
    }

    /// Group number of the first group called `name`
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .map(|index| index + 1)
    }

    /// Named groups and their text, in group order
    pub fn named_groups(&self) -> impl Iterator<Item = (&str, Option<&'t str>)> + '_ {
        self.names.iter().enumerate().filter_map(|(i, name)| {
            name.as_deref().map(|name| (name, self.group(i + 1)))
        })
    }
}

impl Pattern {
    /// Find the first match at or after `pos`
    ///
    /// With `sticky` (or the pattern's `y` flag) a match that doesn't start
    /// exactly at `pos` is discarded. A `pos` past the end of `text` never
    /// matches.
    pub fn exec_at<'t>(&self, text: &'t str, pos: usize, sticky: bool) -> Result<Option<Match<'t>>> {
        if pos > text.len() {
            return Ok(None);
        }
        if !text.is_char_boundary(pos) {
            return Err(UsageError::InvalidPosition(pos).into());
        }

        let Some(mut spans) = base::exec_from(self.base(), self.rewritten(), text, pos)? else {
            return Ok(None);
        };
        if spans.is_empty() {
            return Ok(None);
        }
        let Some(span) = spans.remove(0) else {
            return Ok(None);
        };
        if (sticky || self.is_sticky()) && span.start != pos {
            return Ok(None);
        }

        Ok(Some(Match {
            input: text,
            span,
            groups: spans,
            names: self.shared_names(),
        }))
    }

    /// Find the first match in `text`
    pub fn exec<'t>(&self, text: &'t str) -> Result<Option<Match<'t>>> {
        self.exec_at(text, 0, false)
    }

    /// Check if the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.exec(text)?.is_some())
    }

    /// Iterate over successive non-overlapping matches, left to right
    pub fn matches<'p, 't>(&'p self, text: &'t str) -> Matches<'p, 't> {
        Matches {
            pattern: self,
            text,
            cursor: Some(0),
        }
    }

    /// Call `visit` with every match and its ordinal
    pub fn for_each<'t, F>(&self, text: &'t str, mut visit: F) -> Result<()>
    where
        F: FnMut(&Match<'t>, usize),
    {
        for (ordinal, m) in self.matches(text).enumerate() {
            visit(&m?, ordinal);
        }
        Ok(())
    }
}

/// Iterator over the matches of a pattern; each call to
/// [`Pattern::matches`] starts a fresh cursor
#[derive(Debug)]
pub struct Matches<'p, 't> {
    pattern: &'p Pattern,
    text: &'t str,
    cursor: Option<usize>,
}

impl<'t> Iterator for Matches<'_, 't> {
    type Item = Result<Match<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cursor?;
        match self.pattern.exec_at(self.text, pos, false) {
            Ok(Some(m)) => {
                // A zero-length match must still move the cursor forward
                self.cursor = Some(if m.is_empty() {
                    m.end() + self.text[m.end()..].chars().next().map_or(1, char::len_utf8)
                } else {
                    m.end()
                });
                Some(Ok(m))
            }
            Ok(None) => {
                self.cursor = None;
                None
            }
            Err(e) => {
                self.cursor = None;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_group_lookup() {
        let pattern = Pattern::new(r"(?<year>\d{4})-(?<month>\d{2})", "").unwrap();
        let m = pattern.exec("2024-05").unwrap().unwrap();
        assert_eq!(m.named_group("year"), Some("2024"));
        assert_eq!(m.named_group("month"), Some("05"));
        assert_eq!(m.group(0), Some("2024-05"));
        assert_eq!(m.named_group("day"), None);
        assert_eq!(
            m.named_groups().collect::<Vec<_>>(),
            vec![("year", Some("2024")), ("month", Some("05"))]
        );
    }

    #[test]
    fn test_non_participating_group_is_absent() {
        let pattern = Pattern::new("(a)|(b)", "").unwrap();
        let m = pattern.exec("b").unwrap().unwrap();
        assert_eq!(m.group(1), None);
        assert_eq!(m.group(2), Some("b"));
        assert_eq!(m.len(), 3);

        let optional = Pattern::new("x(y)?", "").unwrap();
        let m = optional.exec("x").unwrap().unwrap();
        assert_eq!(m.group(1), None);
    }

    #[test]
    fn test_exec_at_position() {
        let pattern = Pattern::new("a", "").unwrap();
        let m = pattern.exec_at("banana", 2, false).unwrap().unwrap();
        assert_eq!(m.start(), 3);
        assert_eq!(m.before(), "ban");
        assert_eq!(m.after(), "na");
        assert_eq!(pattern.exec_at("banana", 7, false).unwrap(), None);
    }

    #[test]
    fn test_sticky() {
        let pattern = Pattern::new("a", "").unwrap();
        assert_eq!(pattern.exec_at("banana", 2, true).unwrap(), None);
        assert!(pattern.exec_at("banana", 3, true).unwrap().is_some());

        let sticky = Pattern::new("a", "y").unwrap();
        assert_eq!(sticky.exec_at("banana", 0, false).unwrap(), None);
    }

    #[test]
    fn test_invalid_position() {
        let pattern = Pattern::new("a", "").unwrap();
        assert!(matches!(
            pattern.exec_at("éa", 1, false),
            Err(crate::error::RegexError::Usage(UsageError::InvalidPosition(1)))
        ));
    }

    #[test]
    fn test_zero_length_iteration_terminates() {
        let pattern = Pattern::new("a*", "").unwrap();
        let mut seen = Vec::new();
        pattern
            .for_each("bb", |m, ordinal| seen.push((ordinal, m.start(), m.as_str().len())))
            .unwrap();
        assert_eq!(seen, vec![(0, 0, 0), (1, 1, 0), (2, 2, 0)]);
    }

    #[test]
    fn test_iteration_after_non_empty_match() {
        let pattern = Pattern::new("a*", "").unwrap();
        let found: Vec<_> = pattern
            .matches("baac")
            .map(|m| m.unwrap().as_str())
            .collect();
        assert_eq!(found, vec!["", "aa", "", ""]);
    }

    #[test]
    fn test_zero_length_advance_is_char_aligned() {
        let pattern = Pattern::new("", "").unwrap();
        let starts: Vec<_> = pattern
            .matches("éa")
            .map(|m| m.unwrap().start())
            .collect();
        assert_eq!(starts, vec![0, 2, 3]);
    }

    #[test]
    fn test_flags_reach_the_engine() {
        assert!(Pattern::new("abc", "i").unwrap().is_match("xABC").unwrap());
        assert!(Pattern::new("^b", "m").unwrap().is_match("a\nb").unwrap());
        assert!(!Pattern::new("^b", "").unwrap().is_match("a\nb").unwrap());
        assert!(Pattern::new("a.b", "s").unwrap().is_match("a\nb").unwrap());
        assert!(!Pattern::new("a.b", "").unwrap().is_match("a\nb").unwrap());
    }

    #[test]
    fn test_named_backreference_matches() {
        let pattern = Pattern::new(r"(?<w>\w)\k<w>", "").unwrap();
        let m = pattern.exec("abccd").unwrap().unwrap();
        assert_eq!(m.as_str(), "cc");
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let pattern = Pattern::new("(?<x>a)|(?<x>b)", "").unwrap();
        let m = pattern.exec("a").unwrap().unwrap();
        assert_eq!(m.named_group("x"), None);
        assert_eq!(m.group_index("x"), Some(1));
        let m = pattern.exec("b").unwrap().unwrap();
        assert_eq!(m.named_group("x"), Some("b"));
    }
}
