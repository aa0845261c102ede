//! Token registry for dialect syntax
//!
//! Every piece of syntax beyond what the baseline engine understands is a
//! [`TokenRule`]: a recognizer, a rewrite handler, the scope it applies in and
//! an optional activation predicate. The compiler asks the registry for a rule
//! at each position before falling back to baseline syntax.
//!
//! Rules are tried most-recently-registered first, so a rule registered after
//! the built-ins shadows a built-in recognizing the same text.

use std::cell::Cell;
use std::fmt;

use bitflags::bitflags;
use log::trace;
use once_cell::sync::Lazy;

use crate::compiler::starts_with_quantifier;
use crate::error::{RegexError, Result, SyntaxError};
use crate::flags::{self, Flags};

bitflags! {
    /// Where in a pattern a rule may fire
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Scope: u8 {
        /// Inside a character class `[...]`
        const INSIDE_CLASS = 0b01;
        /// Anywhere outside a character class
        const OUTSIDE_CLASS = 0b10;
    }
}

/// Rewrite handler: receives the recognized token and the compile context,
/// returns the text to emit in its place
pub type Handler = Box<dyn Fn(&TokenMatch<'_>, &mut CompileContext) -> Result<String> + Send + Sync>;

/// Activation predicate, consulted before the recognizer runs
pub type Activation = Box<dyn Fn(&CompileContext) -> bool + Send + Sync>;

/// Mutable state of one compilation, handed to every handler and predicate
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    flags: Flags,
    capture_names: Vec<Option<String>>,
    has_named_capture: bool,
}

impl CompileContext {
    /// Create a context for a compilation starting with `flags`
    pub fn new(flags: Flags) -> Self {
        CompileContext {
            flags,
            capture_names: Vec::new(),
            has_named_capture: false,
        }
    }

    /// The flags in effect, including those set by inline modifiers so far
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Check whether a flag is in effect
    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.has(flag)
    }

    /// Turn on every flag in `flags`
    pub fn set_flags(&mut self, flags: &str) -> Result<()> {
        self.flags.insert_all(flags)
    }

    /// Names of the capturing groups emitted so far; `None` for unnamed groups
    pub fn capture_names(&self) -> &[Option<String>] {
        &self.capture_names
    }

    /// Number of capturing groups emitted so far
    pub fn capture_count(&self) -> usize {
        self.capture_names.len()
    }

    /// Record that a capturing group was emitted
    pub fn push_capture(&mut self, name: Option<String>) {
        if name.is_some() {
            self.has_named_capture = true;
        }
        self.capture_names.push(name);
    }

    /// Position of the first group called `name`, if one was emitted already
    pub fn capture_index(&self, name: &str) -> Option<usize> {
        self.capture_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
    }

    /// Whether any named group was emitted
    pub fn has_named_capture(&self) -> bool {
        self.has_named_capture
    }

    pub(crate) fn into_parts(self) -> (Flags, Vec<Option<String>>, bool) {
        (self.flags, self.capture_names, self.has_named_capture)
    }
}

/// A token recognized at a position of the pattern being compiled
#[derive(Debug, Clone)]
pub struct TokenMatch<'a> {
    pattern: &'a str,
    start: usize,
    end: usize,
    groups: Vec<Option<&'a str>>,
    scope: Scope,
}

impl<'a> TokenMatch<'a> {
    /// The token text
    pub fn as_str(&self) -> &'a str {
        &self.pattern[self.start..self.end]
    }

    /// A capture group of the recognizer (0 is the whole token)
    pub fn group(&self, n: usize) -> Option<&'a str> {
        self.groups.get(n).copied().flatten()
    }

    /// Byte offset of the token in the pattern
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.end
    }

    /// The whole pattern being compiled
    pub fn pattern(&self) -> &'a str {
        self.pattern
    }

    /// Pattern text following the token
    pub fn rest(&self) -> &'a str {
        &self.pattern[self.end..]
    }

    /// Scope the token was recognized in
    pub fn scope(&self) -> Scope {
        self.scope
    }
}

/// A syntax extension rule
pub struct TokenRule {
    source: String,
    recognizer: fancy_regex::Regex,
    handler: Handler,
    scope: Scope,
    activation: Option<Activation>,
}

impl TokenRule {
    /// Create a rule for tokens matching `recognizer`, active outside classes
    ///
    /// The recognizer is anchored at the position being compiled and sees the
    /// pattern text from there on, so `^` means "at this token" and
    /// lookbehind cannot see earlier text. Recognizers without lookaround or
    /// backreferences run on the linear-time engine.
    pub fn new<H>(recognizer: &str, handler: H) -> Result<Self>
    where
        H: Fn(&TokenMatch<'_>, &mut CompileContext) -> Result<String> + Send + Sync + 'static,
    {
        let anchored = format!("^(?:{})", recognizer);
        let compiled =
            fancy_regex::Regex::new(&anchored).map_err(|e| RegexError::engine(recognizer, e))?;
        Ok(TokenRule {
            source: recognizer.to_string(),
            recognizer: compiled,
            handler: Box::new(handler),
            scope: Scope::OUTSIDE_CLASS,
            activation: None,
        })
    }

    /// Restrict the rule to `scope`
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Only try the rule while `predicate` holds
    pub fn activate_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&CompileContext) -> bool + Send + Sync + 'static,
    {
        self.activation = Some(Box::new(predicate));
        self
    }

    fn is_active(&self, scope: Scope, ctx: &CompileContext) -> bool {
        self.scope.intersects(scope) && self.activation.as_ref().is_none_or(|p| p(ctx))
    }
}

impl fmt::Debug for TokenRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRule")
            .field("recognizer", &self.source)
            .field("scope", &self.scope)
            .field("conditional", &self.activation.is_some())
            .finish()
    }
}

/// Output of the rule that fired at a position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHit {
    /// Text to emit
    pub output: String,
    /// Length of the recognized token in bytes (may be zero)
    pub consumed: usize,
}

/// Ordered collection of token rules
#[derive(Debug, Default)]
pub struct TokenRegistry {
    rules: Vec<TokenRule>,
}

static BUILTIN: Lazy<TokenRegistry> = Lazy::new(TokenRegistry::with_builtins);

impl TokenRegistry {
    /// Create an empty registry; patterns compiled with it get no dialect syntax
    pub fn new() -> Self {
        TokenRegistry { rules: Vec::new() }
    }

    /// Create a registry holding the built-in dialect rules
    pub fn with_builtins() -> Self {
        let mut registry = TokenRegistry::new();
        for rule in builtin_rules() {
            registry.register(rule);
        }
        registry
    }

    /// Shared registry with only the built-in rules
    pub fn builtin() -> &'static TokenRegistry {
        &BUILTIN
    }

    /// Append a rule; it takes precedence over every rule registered before it
    pub fn register(&mut self, rule: TokenRule) {
        self.rules.push(rule);
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the rule that fires exactly at `pos` and run its handler
    pub fn try_at(
        &self,
        pattern: &str,
        pos: usize,
        scope: Scope,
        ctx: &mut CompileContext,
    ) -> Result<Option<TokenHit>> {
        let _guard = CallbackGuard::enter();

        for rule in self.rules.iter().rev() {
            if !rule.is_active(scope, ctx) {
                continue;
            }
            let captures = rule
                .recognizer
                .captures(&pattern[pos..])
                .map_err(|e| RegexError::engine(&rule.source, e))?;
            let Some(captures) = captures else {
                continue;
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };

            let token = TokenMatch {
                pattern,
                start: pos,
                end: pos + whole.end(),
                groups: (0..captures.len())
                    .map(|i| captures.get(i).map(|m| m.as_str()))
                    .collect(),
                scope,
            };
            let output = (rule.handler)(&token, ctx)?;
            trace!("token `{}` at {} -> `{}`", token.as_str(), pos, output);
            return Ok(Some(TokenHit {
                output,
                consumed: token.end - token.start,
            }));
        }

        Ok(None)
    }
}

thread_local! {
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running token handlers until dropped
struct CallbackGuard {
    previous: bool,
}

impl CallbackGuard {
    fn enter() -> Self {
        CallbackGuard {
            previous: IN_CALLBACK.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        IN_CALLBACK.with(|flag| flag.set(self.previous));
    }
}

/// Whether a token handler or predicate is running on this thread
pub(crate) fn in_callback() -> bool {
    IN_CALLBACK.with(Cell::get)
}

/// Separator emitted in place of elided syntax, so the tokens on either side
/// don't fuse. Nothing is needed when a quantifier follows.
fn separator(token: &TokenMatch<'_>) -> String {
    if starts_with_quantifier(token.rest()) {
        String::new()
    } else {
        "(?:)".to_string()
    }
}

fn builtin(recognizer: &str, handler: fn(&TokenMatch<'_>, &mut CompileContext) -> Result<String>) -> TokenRule {
    match TokenRule::new(recognizer, handler) {
        Ok(rule) => rule,
        Err(e) => panic!("built-in token `{}` failed to compile: {}", recognizer, e),
    }
}

fn named_group(token: &TokenMatch<'_>, ctx: &mut CompileContext) -> Result<String> {
    let name = token.group(1).unwrap_or_default();
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SyntaxError::IntegerCaptureName(name.to_string()).into());
    }
    ctx.push_capture(Some(name.to_string()));
    Ok("(".to_string())
}

fn builtin_rules() -> Vec<TokenRule> {
    vec![
        // Group opener. Registered first so every `(?...` rule below wins;
        // the remaining `(?` openers pass through uncounted. Explicit capture
        // mode turns a plain group non-capturing.
        builtin(r"\(", |token, ctx| {
            if token.rest().starts_with('?') {
                Ok("(".to_string())
            } else if ctx.has_flag(flags::EXPLICIT_CAPTURE) {
                Ok("(?:".to_string())
            } else {
                ctx.push_capture(None);
                Ok("(".to_string())
            }
        }),
        // Inline comment: (?# ...)
        builtin(r"\(\?#[^)]*\)", |token, _| Ok(separator(token))),
        // Named group opener: (?<name>
        builtin(r"\(\?<([$\w]+)>", named_group),
        // Python-style named group opener: (?P<name>
        builtin(r"\(\?P<([$\w]+)>", named_group),
        // Named backreference: \k<name>
        builtin(r"\\k<([\w$]+)>", |token, ctx| {
            let name = token.group(1).unwrap_or_default();
            match ctx.capture_index(name) {
                Some(index) => {
                    let digit_follows = token.rest().starts_with(|c: char| c.is_ascii_digit());
                    Ok(format!(
                        "\\{}{}",
                        index + 1,
                        if digit_follows { "(?:)" } else { "" }
                    ))
                }
                // Not declared yet: identity escape, matches the text `k<name>`
                None => Ok(format!("k<{}>", name)),
            }
        }),
        // Empty classes: [] matches nothing, [^] matches anything
        builtin(r"\[\^?\]", |token, _| {
            Ok(if token.as_str() == "[]" {
                r"\b\B".to_string()
            } else {
                r"[\s\S]".to_string()
            })
        }),
        // Mode modifier: (?imnsx). Only applied at the very start of the
        // pattern; elsewhere it is left for the baseline.
        builtin(r"\(\?([imnsx]+)\)", |token, ctx| {
            if token.start() > 0 {
                return Ok(token.as_str().to_string());
            }
            ctx.set_flags(token.group(1).unwrap_or_default())?;
            Ok(String::new())
        }),
        // Whitespace and comments in free-spacing mode
        builtin(r"(?:\s+|#.*)+", |token, _| Ok(separator(token)))
            .activate_when(|ctx| ctx.has_flag(flags::EXTENDED)),
        // Dot in dot-all mode
        builtin(r"\.", |_, _| Ok(r"[\s\S]".to_string()))
            .activate_when(|ctx| ctx.has_flag(flags::DOT_ALL)),
        // Literal `[` and set-operation digraphs inside a class, which the
        // baseline would read as a nested class or a set operation
        builtin(r"\[|&&|~~", |token, _| {
            Ok(token.as_str().chars().map(|c| format!("\\{}", c)).collect())
        })
        .scope(Scope::INSIDE_CLASS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(registry: &TokenRegistry, pattern: &str, pos: usize, flags: &str) -> Option<TokenHit> {
        let mut ctx = CompileContext::new(Flags::parse(flags).unwrap());
        registry
            .try_at(pattern, pos, Scope::OUTSIDE_CLASS, &mut ctx)
            .unwrap()
    }

    #[test]
    fn test_builtins_registered() {
        assert_eq!(TokenRegistry::with_builtins().len(), 10);
        assert!(TokenRegistry::new().is_empty());
    }

    #[test]
    fn test_match_must_start_at_position() {
        let registry = TokenRegistry::with_builtins();
        // `(` at 1 would match, but nothing starts at 0
        assert_eq!(run(&registry, "a(b)", 0, ""), None);
        let hit = run(&registry, "a(b)", 1, "").unwrap();
        assert_eq!(hit.output, "(");
        assert_eq!(hit.consumed, 1);
    }

    #[test]
    fn test_recognizer_is_anchored_at_position() {
        let mut registry = TokenRegistry::new();
        registry.register(TokenRule::new("^@+", |_, _| Ok("AT".to_string())).unwrap());
        assert_eq!(run(&registry, "x@@", 0, ""), None);
        let hit = run(&registry, "x@@y", 1, "").unwrap();
        assert_eq!(hit.output, "AT");
        assert_eq!(hit.consumed, 2);
    }

    #[test]
    fn test_python_named_group_records_name() {
        let registry = TokenRegistry::with_builtins();
        let mut ctx = CompileContext::default();
        let hit = registry
            .try_at("(?P<year>\\d)", 0, Scope::OUTSIDE_CLASS, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(hit.output, "(");
        assert_eq!(hit.consumed, 9);
        assert_eq!(ctx.capture_names(), &[Some("year".to_string())]);
    }

    #[test]
    fn test_named_group_records_name() {
        let registry = TokenRegistry::with_builtins();
        let mut ctx = CompileContext::default();
        let hit = registry
            .try_at("(?<year>\\d)", 0, Scope::OUTSIDE_CLASS, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(hit.output, "(");
        assert_eq!(hit.consumed, 8);
        assert_eq!(ctx.capture_names(), &[Some("year".to_string())]);
        assert!(ctx.has_named_capture());
    }

    #[test]
    fn test_integer_name_rejected() {
        let registry = TokenRegistry::with_builtins();
        let mut ctx = CompileContext::default();
        let result = registry.try_at("(?<42>x)", 0, Scope::OUTSIDE_CLASS, &mut ctx);
        assert!(matches!(
            result,
            Err(RegexError::Syntax(SyntaxError::IntegerCaptureName(ref n))) if n == "42"
        ));
    }

    #[test]
    fn test_activation_predicate() {
        let registry = TokenRegistry::with_builtins();
        assert_eq!(run(&registry, ".", 0, ""), None);
        assert_eq!(run(&registry, ".", 0, "s").unwrap().output, r"[\s\S]");
    }

    #[test]
    fn test_scope_filters_rules() {
        let registry = TokenRegistry::with_builtins();
        let mut ctx = CompileContext::default();
        let inside = registry
            .try_at("[a(", 2, Scope::INSIDE_CLASS, &mut ctx)
            .unwrap();
        assert_eq!(inside, None);
        assert!(ctx.capture_names().is_empty());

        let escaped = registry
            .try_at("[[]", 1, Scope::INSIDE_CLASS, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(escaped.output, r"\[");
    }

    #[test]
    fn test_later_rule_shadows_builtin() {
        let mut registry = TokenRegistry::with_builtins();
        registry.register(TokenRule::new(r"\.", |_, _| Ok("DOT".to_string())).unwrap());
        assert_eq!(run(&registry, ".", 0, "s").unwrap().output, "DOT");
    }

    #[test]
    fn test_separator_before_quantifier() {
        let registry = TokenRegistry::with_builtins();
        assert_eq!(run(&registry, "(?#c)*", 0, "").unwrap().output, "");
        assert_eq!(run(&registry, "(?#c)a", 0, "").unwrap().output, "(?:)");
    }

    #[test]
    fn test_guard_resets_after_error() {
        let mut registry = TokenRegistry::new();
        registry.register(TokenRule::new("a", |token, _| {
            Err(SyntaxError::InvalidToken {
                token: token.as_str().to_string(),
                position: token.start(),
            }
            .into())
        })
        .unwrap());
        let mut ctx = CompileContext::default();
        assert!(registry.try_at("a", 0, Scope::OUTSIDE_CLASS, &mut ctx).is_err());
        assert!(!in_callback());
    }
}
