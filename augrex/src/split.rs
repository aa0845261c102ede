//! Splitting text on a pattern

use crate::error::Result;
use crate::pattern::Pattern;

/// Split `text` on matches of `pattern`
///
/// Text from captured delimiter groups is interleaved with the segments
/// (groups that did not participate contribute an empty string). A match
/// that makes no progress past the previous delimiter doesn't split. At most
/// `limit` items are returned.
///
/// # Example
/// ```
/// use augrex::{split, Pattern};
///
/// let digits = Pattern::new(r"(\d)", "").unwrap();
/// assert_eq!(split("a1b2c", &digits, None).unwrap(), vec!["a", "1", "b", "2", "c"]);
/// ```
pub fn split<'t>(text: &'t str, pattern: &Pattern, limit: Option<usize>) -> Result<Vec<&'t str>> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut output = Vec::new();
    if limit == 0 {
        return Ok(output);
    }

    let mut last_end = 0;
    let mut last_len = 0;
    for m in pattern.matches(text) {
        let m = m?;
        if m.end() <= last_end {
            continue;
        }
        output.push(&text[last_end..m.start()]);
        if m.start() < text.len() {
            output.extend((1..m.len()).map(|n| m.group(n).unwrap_or_default()));
        }
        last_len = m.as_str().len();
        last_end = m.end();
        if output.len() >= limit {
            break;
        }
    }

    if last_end == text.len() {
        if last_len > 0 || !pattern.matches_empty()? {
            output.push("");
        }
    } else {
        output.push(&text[last_end..]);
    }

    output.truncate(limit);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_on(text: &str, pattern: &str, limit: Option<usize>) -> Vec<String> {
        let pattern = Pattern::new(pattern, "").unwrap();
        split(text, &pattern, limit)
            .unwrap()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(split_on("a,b,,c", ",", None), vec!["a", "b", "", "c"]);
        assert_eq!(split_on("abc", ",", None), vec!["abc"]);
    }

    #[test]
    fn test_split_with_captured_delimiters() {
        assert_eq!(split_on("a1b2c", r"(\d)", None), vec!["a", "1", "b", "2", "c"]);
        assert_eq!(split_on("a1b", r"(\d)|(x)", None), vec!["a", "1", "", "b"]);
    }

    #[test]
    fn test_split_on_empty_matches() {
        assert_eq!(split_on("abc", "", None), vec!["a", "b", "c"]);
        assert_eq!(split_on("abc", "x*", None), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_trailing_delimiter() {
        assert_eq!(split_on("a,b,", ",", None), vec!["a", "b", ""]);
        assert_eq!(split_on("", ",", None), vec![""]);
        assert!(split_on("", "x*", None).is_empty());
    }

    #[test]
    fn test_split_limit() {
        assert_eq!(split_on("a,b,c", ",", Some(2)), vec!["a", "b"]);
        assert_eq!(split_on("a1b2c", r"(\d)", Some(2)), vec!["a", "1"]);
        assert!(split_on("a,b", ",", Some(0)).is_empty());
    }

    #[test]
    fn test_split_ignores_global_flag() {
        let once = Pattern::new(",", "").unwrap();
        let every = Pattern::new(",", "g").unwrap();
        assert_eq!(split("a,b,c", &once, None).unwrap(), split("a,b,c", &every, None).unwrap());
    }
}
