//! Boundary with the baseline engine
//!
//! The baseline is `fancy-regex`: it receives fully rewritten patterns and
//! never sees dialect syntax or dialect flags.

use std::ops::Range;

use crate::error::{RegexError, Result};
use crate::flags::Flags;

/// Group spans of one baseline match; index 0 is the whole match
pub(crate) type Spans = Vec<Option<Range<usize>>>;

/// Compile rewritten pattern text. Only the flags the baseline understands
/// are applied, as a leading inline group.
pub(crate) fn compile(
    rewritten: &str,
    flags: &Flags,
    backtrack_limit: Option<usize>,
) -> Result<fancy_regex::Regex> {
    let text = format!("{}{}", flags.baseline_prefix(), rewritten);
    let mut builder = fancy_regex::RegexBuilder::new(&text);
    if let Some(limit) = backtrack_limit {
        builder.backtrack_limit(limit);
    }
    builder.build().map_err(|e| RegexError::engine(rewritten, e))
}

/// First match at or after `pos`. Errors name `rewritten`, the text
/// [`compile`] was given, not the flag-prefixed form.
pub(crate) fn exec_from(
    regex: &fancy_regex::Regex,
    rewritten: &str,
    text: &str,
    pos: usize,
) -> Result<Option<Spans>> {
    let captures = regex
        .captures_from_pos(text, pos)
        .map_err(|e| RegexError::engine(rewritten, e))?;

    Ok(captures.map(|captures| {
        (0..captures.len())
            .map(|i| captures.get(i).map(|m| m.start()..m.end()))
            .collect()
    }))
}
