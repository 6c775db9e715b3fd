//! Resumable line tokenizer framework.
//!
//! A language implements [`Language`]: it owns a typed state, and a `scan` step that tries its
//! rules, in precedence order, against the unconsumed rest of the line through a [`Scanner`].
//! The framework drives the steps until the line is consumed:
//!
//! ```text
//! begin_line(state)
//! while the line is not consumed:
//!     scan(scanner, state)          // at most one rule fires
//!     if nothing was consumed:      // progress guarantee
//!         emit one `Text` character
//! end_line(state)                   // per-line normalization
//! ```
//!
//! Every [`Language`] is also a type-erased [`Tokenizer`] (blanket impl), which is what the
//! scheduler, the line cache and the registry work with.

use crate::state::{LexerState, StateValue};
use crate::token::{Token, TokenKind};
use regex::Regex;
use std::sync::OnceLock;

/// A scanner rule: a regex pattern that must match at the current scan position.
///
/// Rules are `const`-constructible so languages can keep them in statics; the regex is compiled
/// on first use. A pattern that fails to compile never matches (and trips a debug assertion).
pub struct Rule {
    pattern: &'static str,
    regex: OnceLock<Option<Regex>>,
}

impl Rule {
    /// Create a rule from an (unanchored) pattern.
    pub const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            regex: OnceLock::new(),
        }
    }

    /// The source pattern.
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Returns `true` if the pattern compiles.
    pub fn is_valid(&self) -> bool {
        self.compiled().is_some()
    }

    fn compiled(&self) -> Option<&Regex> {
        self.regex
            .get_or_init(|| match Regex::new(&format!("^(?:{})", self.pattern)) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern = self.pattern, %err, "scanner rule failed to compile");
                    debug_assert!(false, "invalid scanner rule {:?}: {err}", self.pattern);
                    None
                }
            })
            .as_ref()
    }

    /// Byte length of the match at the start of `haystack`, if any.
    pub fn match_len(&self, haystack: &str) -> Option<usize> {
        self.compiled()?.find(haystack).map(|m| m.end())
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.pattern).finish()
    }
}

/// Cursor over a single line.
///
/// Successful `matches*` calls consume the matched text and remember it as the current match;
/// [`Scanner::emit`] turns the current match into a token.
#[derive(Debug)]
pub struct Scanner<'a> {
    line: &'a str,
    pos: usize,
    current: &'a str,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    /// Start scanning `line`.
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            current: "",
            tokens: Vec::new(),
        }
    }

    /// The whole line.
    pub fn line(&self) -> &'a str {
        self.line
    }

    /// Byte offset of the scan position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed rest of the line.
    pub fn remaining(&self) -> &'a str {
        &self.line[self.pos..]
    }

    /// Returns `true` once the whole line has been consumed.
    pub fn is_done(&self) -> bool {
        self.pos >= self.line.len()
    }

    /// Text of the most recent successful match (empty before the first one).
    pub fn last_match(&self) -> &'a str {
        self.current
    }

    /// Tokens emitted so far.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Try `rule` at the scan position.
    pub fn matches(&mut self, rule: &Rule) -> bool {
        match rule.match_len(self.remaining()) {
            Some(len) => {
                self.advance(len);
                true
            }
            None => false,
        }
    }

    /// Try `rule` at the scan position, requiring `lookahead` to match right after it.
    ///
    /// The lookahead text is not consumed.
    pub fn matches_followed_by(&mut self, rule: &Rule, lookahead: &Rule) -> bool {
        let rest = self.remaining();
        let Some(len) = rule.match_len(rest) else {
            return false;
        };
        if lookahead.match_len(&rest[len..]).is_none() {
            return false;
        }
        self.advance(len);
        true
    }

    /// Try a literal string at the scan position.
    pub fn matches_str(&mut self, literal: &str) -> bool {
        if literal.is_empty() || !self.remaining().starts_with(literal) {
            return false;
        }
        self.advance(literal.len());
        true
    }

    /// Try each literal in order; the first one present at the scan position wins.
    pub fn matches_any(&mut self, literals: &[&str]) -> bool {
        literals.iter().any(|literal| self.matches_str(literal))
    }

    /// Try a single character at the scan position.
    pub fn matches_char(&mut self, ch: char) -> bool {
        if !self.remaining().starts_with(ch) {
            return false;
        }
        self.advance(ch.len_utf8());
        true
    }

    /// Text `rule` would match at the scan position, without consuming it.
    pub fn peek(&self, rule: &Rule) -> Option<&'a str> {
        let rest = self.remaining();
        rule.match_len(rest).map(|len| &rest[..len])
    }

    /// Consume up to `len` bytes (snapped back to a char boundary) as the current match.
    pub fn consume(&mut self, len: usize) -> &'a str {
        let rest = self.remaining();
        let mut len = len.min(rest.len());
        while !rest.is_char_boundary(len) {
            len -= 1;
        }
        self.advance(len);
        self.current
    }

    /// Consume a single character as the current match.
    pub fn consume_char(&mut self) -> bool {
        match self.remaining().chars().next() {
            Some(ch) => {
                self.advance(ch.len_utf8());
                true
            }
            None => false,
        }
    }

    /// Emit the current match as a token of `kind`. Empty matches produce no token.
    pub fn emit(&mut self, kind: TokenKind) {
        if self.current.is_empty() {
            return;
        }
        self.tokens.push(Token::new(kind, self.current));
    }

    /// Append tokens produced elsewhere (an embedded tokenizer) that cover the next `len`
    /// bytes of the line, and consume those bytes.
    pub fn embed(&mut self, len: usize, tokens: Vec<Token>) {
        self.consume(len);
        self.tokens.extend(tokens);
    }

    /// Finish scanning and return the tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn advance(&mut self, len: usize) {
        let start = self.pos;
        self.pos += len;
        self.current = &self.line[start..self.pos];
    }
}

/// A line-oriented language definition with a typed lexer state.
pub trait Language: Send + Sync + 'static {
    /// Per-line carry-over state.
    type State: StateValue;

    /// Registry identifier (e.g. `"javascript"`).
    fn id(&self) -> &'static str;

    /// State before the first line of a document.
    fn initial_state(&self) -> Self::State;

    /// Reset transient per-line flags before scanning a line.
    fn begin_line(&self, _state: &mut Self::State) {}

    /// One rule-evaluation step: try the rules in precedence order and fire at most one.
    ///
    /// A step that consumes nothing is allowed (e.g. a pure mode switch); the framework then
    /// consumes one character as [`TokenKind::Text`].
    fn scan(&self, scanner: &mut Scanner<'_>, state: &mut Self::State);

    /// Normalize the state at end of line (e.g. close unterminated single-line strings).
    fn end_line(&self, _state: &mut Self::State) {}

    /// Tokenize `line`, updating `state` in place from inbound to outbound.
    fn tokenize_line(&self, line: &str, state: &mut Self::State) -> Vec<Token> {
        let mut scanner = Scanner::new(line);

        self.begin_line(state);
        while !scanner.is_done() {
            let before = scanner.position();
            self.scan(&mut scanner, state);
            if scanner.position() == before {
                scanner.consume_char();
                scanner.emit(TokenKind::Text);
            }
        }
        self.end_line(state);

        scanner.into_tokens()
    }
}

/// Tokens of one line plus the state handed to the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens {
    /// Tokens covering the whole line, in order.
    pub tokens: Vec<Token>,
    /// State after the line.
    pub outbound: LexerState,
}

/// Type-erased tokenizer, as stored in the registry and used by the scheduler.
pub trait Tokenizer: Send + Sync {
    /// Registry identifier of the language.
    fn language_id(&self) -> &'static str;

    /// State before the first line of a document.
    fn initial_state(&self) -> LexerState;

    /// Tokenize `line` starting from `inbound`.
    fn tokenize(&self, line: &str, inbound: &LexerState) -> LineTokens;
}

impl<L: Language> Tokenizer for L {
    fn language_id(&self) -> &'static str {
        self.id()
    }

    fn initial_state(&self) -> LexerState {
        LexerState::new(Language::initial_state(self))
    }

    fn tokenize(&self, line: &str, inbound: &LexerState) -> LineTokens {
        let mut state = match inbound.downcast_ref::<L::State>() {
            Some(state) => state.clone(),
            None => {
                tracing::warn!(
                    language = self.id(),
                    ?inbound,
                    "inbound state belongs to another tokenizer; restarting from initial state"
                );
                debug_assert!(false, "lexer state type mismatch for {}", self.id());
                Language::initial_state(self)
            }
        };

        let tokens = self.tokenize_line(line, &mut state);
        LineTokens {
            tokens,
            outbound: LexerState::new(state),
        }
    }
}

/// Fallback tokenizer: the whole line is one [`TokenKind::Text`] token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl PlainText {
    /// Registry identifier of the fallback tokenizer.
    pub const ID: &'static str = "plaintext";
}

impl Language for PlainText {
    type State = ();

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn initial_state(&self) -> Self::State {}

    fn scan(&self, scanner: &mut Scanner<'_>, _state: &mut Self::State) {
        let len = scanner.remaining().len();
        scanner.consume(len);
        scanner.emit(TokenKind::Text);
    }
}
