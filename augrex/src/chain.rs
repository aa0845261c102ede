//! Match chains
//!
//! Each stage searches the values produced by the previous stage, so a chain
//! can drill into nested structure: first find the tags, then an attribute
//! inside every tag.

use crate::error::Result;
use crate::pattern::Pattern;

/// Which part of a stage's matches is passed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backref {
    /// A numbered group; 0 is the whole match
    Number(usize),
    /// A named group
    Name(String),
}

impl From<usize> for Backref {
    fn from(n: usize) -> Self {
        Backref::Number(n)
    }
}

impl From<&str> for Backref {
    fn from(name: &str) -> Self {
        Backref::Name(name.to_string())
    }
}

/// One step of a match chain
#[derive(Debug, Clone)]
pub struct ChainStage<'p> {
    pub pattern: &'p Pattern,
    /// Group to extract; the whole match when `None`
    pub backref: Option<Backref>,
}

impl<'p> ChainStage<'p> {
    /// A stage passing on whole matches
    pub fn new(pattern: &'p Pattern) -> Self {
        ChainStage {
            pattern,
            backref: None,
        }
    }

    /// A stage passing on one group of every match
    pub fn group(pattern: &'p Pattern, backref: impl Into<Backref>) -> Self {
        ChainStage {
            pattern,
            backref: Some(backref.into()),
        }
    }
}

/// Run `stages` over `text` and collect what the last stage extracts
///
/// Every stage matches globally regardless of its pattern's flags. The
/// result is empty as soon as one stage finds nothing. With no stages the
/// text itself is returned.
///
/// # Example
/// ```
/// use augrex::{match_chain, ChainStage, Pattern};
///
/// let links = Pattern::new(r#"<a href="([^"]+)">"#, "i").unwrap();
/// let domain = Pattern::new(r"^https?://(?<domain>[^/?#]+)", "").unwrap();
/// let html = r#"<a href="http://x.com/">X</a> <a href="https://y.org/?q">Y</a>"#;
/// let found = match_chain(html, &[
///     ChainStage::group(&links, 1),
///     ChainStage::group(&domain, "domain"),
/// ]).unwrap();
/// assert_eq!(found, vec!["x.com", "y.org"]);
/// ```
pub fn match_chain(text: &str, stages: &[ChainStage<'_>]) -> Result<Vec<String>> {
    let mut values = vec![text.to_string()];

    for stage in stages {
        let mut next = Vec::new();
        for value in &values {
            for m in stage.pattern.matches(value) {
                let m = m?;
                let extracted = match &stage.backref {
                    None => Some(m.as_str()),
                    Some(Backref::Number(n)) => m.group(*n),
                    Some(Backref::Name(name)) => m.named_group(name),
                };
                next.push(extracted.unwrap_or_default().to_string());
            }
        }
        if next.is_empty() {
            return Ok(next);
        }
        values = next;
    }

    Ok(values)
}
