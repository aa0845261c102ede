//! Augrex Core Library
//!
//! An augmented regex dialect compiled down to `fancy-regex` syntax: named
//! groups and backreferences, inline comments, free-spacing, dot-all and
//! explicit-capture modes, with name-aware matching, replacement, splitting
//! and match chains on top.

mod base;
pub mod chain;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod escape;
pub mod flags;
pub mod pattern;
pub mod replace;
pub mod split;
pub mod token;

pub use chain::{Backref, ChainStage, match_chain};
pub use compiler::{Compiled, compile};
pub use engine::{Match, Matches};
pub use error::{RegexError, Result, SyntaxError, UsageError};
pub use escape::escape_literal;
pub use flags::Flags;
pub use pattern::{Pattern, PatternBuilder, PatternInput, build, cached};
pub use replace::{Replacement, SearchTarget, Template, TemplatePart, render, replace};
pub use split::split;
pub use token::{CompileContext, Scope, TokenHit, TokenMatch, TokenRegistry, TokenRule};
