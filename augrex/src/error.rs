//! Error types for the dialect compiler and match layer
//!
//! Errors are categorized by their source: malformed dialect syntax, misuse of
//! the API, or failures reported by the baseline engine.

use thiserror::Error;

/// The main error type
#[derive(Error, Debug)]
pub enum RegexError {
    /// Malformed dialect syntax
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// API misuse
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    /// Errors reported by the baseline engine, with the rewritten pattern attached
    #[error("engine error in `{pattern}`: {source}")]
    Engine {
        /// The rewritten pattern handed to the baseline engine
        pattern: String,
        /// The baseline engine's own error
        #[source]
        source: fancy_regex::Error,
    },
}

/// Specific kinds of dialect syntax errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A named group whose name parses as an integer, e.g. `(?<12>...)`
    #[error("cannot use an integer as capture name: '{0}'")]
    IntegerCaptureName(String),

    /// A flag character that is not an ASCII letter
    #[error("invalid flag '{0}'")]
    InvalidFlag(char),

    /// A dialect construct a token handler could not accept
    #[error("invalid token `{token}` at position {position}")]
    InvalidToken {
        /// The offending token text
        token: String,
        /// Byte offset of the token in the pattern
        position: usize,
    },
}

/// Specific kinds of API misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A pattern was compiled from inside a token handler or activation predicate
    #[error("cannot compile a pattern from within a token handler")]
    ReentrantCompile,

    /// Flags were supplied while re-wrapping an already compiled pattern
    #[error("cannot supply flags when building one pattern from another")]
    FlagsOnCompiledPattern,

    /// A search position that is not a char boundary of the subject
    #[error("position {0} is not a char boundary")]
    InvalidPosition(usize),
}

impl RegexError {
    pub(crate) fn engine(pattern: &str, source: fancy_regex::Error) -> Self {
        RegexError::Engine {
            pattern: pattern.to_string(),
            source,
        }
    }
}

/// Result type alias for dialect operations
pub type Result<T> = std::result::Result<T, RegexError>;
