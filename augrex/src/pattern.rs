//! Compiled patterns
//!
//! A [`Pattern`] pairs the baseline engine's compiled form with the capture
//! names the dialect compiler recorded. It holds no cursor state; iteration
//! state lives in the iterators and functions that use it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use once_cell::sync::Lazy;

use crate::base;
use crate::compiler;
use crate::error::{Result, UsageError};
use crate::flags::{self, Flags};
use crate::token::TokenRegistry;

/// A compiled dialect pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    base: Arc<fancy_regex::Regex>,
    source: String,
    rewritten: String,
    flags: Flags,
    capture_names: Arc<[Option<String>]>,
    has_named_capture: bool,
}

impl Pattern {
    /// Compile `source` with `flags` using the built-in dialect rules
    ///
    /// # Example
    /// ```
    /// use augrex::Pattern;
    ///
    /// let date = Pattern::new(r"(?<year>\d{4})-(?<month>\d{2})", "").unwrap();
    /// let m = date.exec("on 2024-05").unwrap().unwrap();
    /// assert_eq!(m.named_group("year"), Some("2024"));
    /// ```
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        Pattern::builder(source).flags(flags).build()
    }

    /// Start configuring a pattern
    pub fn builder(source: &str) -> PatternBuilder<'static> {
        PatternBuilder {
            source: source.to_string(),
            flags: String::new(),
            registry: None,
            backtrack_limit: None,
        }
    }

    /// The dialect source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern as handed to the baseline engine, without flag prefix
    pub fn rewritten(&self) -> &str {
        &self.rewritten
    }

    /// Flags in effect, including those set by a leading mode modifier
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Names of the capturing groups, `None` for unnamed ones
    pub fn capture_names(&self) -> &[Option<String>] {
        &self.capture_names
    }

    /// Whether any group is named
    pub fn has_named_capture(&self) -> bool {
        self.has_named_capture
    }

    /// Number of capturing groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.capture_names.len()
    }

    /// Whether replacements default to every match
    pub fn is_global(&self) -> bool {
        self.flags.has(flags::GLOBAL)
    }

    /// Whether matches must start exactly at the search position
    pub fn is_sticky(&self) -> bool {
        self.flags.has(flags::STICKY)
    }

    /// Copy with the global flag set or cleared
    pub fn with_global(&self, on: bool) -> Self {
        self.with_match_flag(flags::GLOBAL, on)
    }

    /// Copy with the sticky flag set or cleared
    pub fn with_sticky(&self, on: bool) -> Self {
        self.with_match_flag(flags::STICKY, on)
    }

    // `g` and `y` never reach the baseline, so the compiled form is shared
    fn with_match_flag(&self, flag: char, on: bool) -> Self {
        Pattern {
            flags: self.flags.with(flag, on),
            ..self.clone()
        }
    }

    pub(crate) fn base(&self) -> &fancy_regex::Regex {
        &self.base
    }

    pub(crate) fn shared_names(&self) -> Arc<[Option<String>]> {
        Arc::clone(&self.capture_names)
    }

    /// Whether the pattern matches the empty string
    pub(crate) fn matches_empty(&self) -> Result<bool> {
        Ok(base::exec_from(&self.base, &self.rewritten, "", 0)?.is_some())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Builder for [`Pattern`]
#[derive(Debug, Clone)]
pub struct PatternBuilder<'r> {
    source: String,
    flags: String,
    registry: Option<&'r TokenRegistry>,
    backtrack_limit: Option<usize>,
}

impl<'r> PatternBuilder<'r> {
    /// Set the flags, e.g. "gix"
    pub fn flags(mut self, flags: &str) -> Self {
        self.flags = flags.to_string();
        self
    }

    /// Compile with the rules of `registry` instead of the built-ins
    pub fn registry<'s>(self, registry: &'s TokenRegistry) -> PatternBuilder<'s> {
        PatternBuilder {
            source: self.source,
            flags: self.flags,
            registry: Some(registry),
            backtrack_limit: self.backtrack_limit,
        }
    }

    /// Limit the baseline engine's backtracking steps per match attempt
    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        self.backtrack_limit = Some(limit);
        self
    }

    /// Compile the pattern
    pub fn build(&self) -> Result<Pattern> {
        let flags = Flags::parse(&self.flags)?;
        let registry = self.registry.unwrap_or_else(|| TokenRegistry::builtin());
        let compiled = compiler::compile(&self.source, flags, registry)?;
        let (flags, capture_names, has_named_capture) = compiled.context.into_parts();
        let base = base::compile(&compiled.rewritten, &flags, self.backtrack_limit)?;

        Ok(Pattern {
            base: Arc::new(base),
            source: self.source.clone(),
            rewritten: compiled.rewritten,
            flags,
            capture_names: capture_names.into(),
            has_named_capture,
        })
    }
}

/// Something a pattern can be built from
#[derive(Debug, Clone, Copy)]
pub enum PatternInput<'a> {
    /// Dialect source text
    Text(&'a str),
    /// An already compiled pattern
    Compiled(&'a Pattern),
}

impl<'a> From<&'a str> for PatternInput<'a> {
    fn from(text: &'a str) -> Self {
        PatternInput::Text(text)
    }
}

impl<'a> From<&'a Pattern> for PatternInput<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        PatternInput::Compiled(pattern)
    }
}

/// Build a pattern from source text or copy a compiled one
///
/// Flags can't accompany a compiled pattern; use [`Pattern::with_global`]
/// and [`Pattern::with_sticky`] to adjust a copy instead.
pub fn build<'a>(input: impl Into<PatternInput<'a>>, flags: Option<&str>) -> Result<Pattern> {
    match (input.into(), flags) {
        (PatternInput::Compiled(_), Some(_)) => Err(UsageError::FlagsOnCompiledPattern.into()),
        (PatternInput::Compiled(pattern), None) => Ok(pattern.clone()),
        (PatternInput::Text(text), flags) => Pattern::new(text, flags.unwrap_or_default()),
    }
}

type PatternCache = HashMap<(String, String), Arc<Pattern>>;

/// Entries kept by [`cached`] before it starts over
const CACHE_LIMIT: usize = 256;

static CACHE: Lazy<Mutex<PatternCache>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Insert unless `key` is already present, emptying a full cache first
fn insert_bounded(
    cache: &mut PatternCache,
    key: (String, String),
    pattern: Arc<Pattern>,
    limit: usize,
) -> Arc<Pattern> {
    if cache.len() >= limit && !cache.contains_key(&key) {
        debug!("pattern cache full ({} entries), clearing", cache.len());
        cache.clear();
    }
    Arc::clone(cache.entry(key).or_insert(pattern))
}

/// Compile `source` with `flags`, reusing an earlier compilation of the same
/// pair when there is one
///
/// The process-wide cache holds at most 256 patterns; once full, it is
/// emptied before the next new pair is stored. Patterns already handed out
/// stay valid.
pub fn cached(source: &str, flags: &str) -> Result<Arc<Pattern>> {
    let key = (source.to_string(), flags.to_string());
    if let Some(pattern) = CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(pattern));
    }

    // Compile outside the lock; a racing thread at worst compiles twice
    let pattern = Arc::new(Pattern::new(source, flags)?);
    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(insert_bounded(&mut cache, key, pattern, CACHE_LIMIT))
}
