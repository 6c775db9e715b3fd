//! CSS tokenizer.

use crate::javascript::{BLOCK_COMMENT_BODY, QUOTE, WHITESPACE};
use serde::Serialize;
use typeset_core::{Language, Rule, Scanner, TokenKind};

/// Attribute selector comparators, longest first.
pub const COMPARATORS: &[&str] = &["~=", "|=", "^=", "$=", "*=", "="];

/// Combinators and arithmetic operators.
pub const OPERATORS: &[&str] = &["+", "-", "*", "/", ">", "~"];

static ESCAPE: Rule = Rule::new(r#"\\["':]"#);
static STRING_BODY: Rule = Rule::new(r#"[^"'\\]+"#);
static BARE_VALUE: Rule = Rule::new(r"[a-zA-Z0-9]+");
static CASE_FLAG: Rule = Rule::new(r"[is]");
static CLOSE_BRACKET_AHEAD: Rule = Rule::new(r"\]");
static NAME: Rule = Rule::new(r"[a-zA-Z\-][a-zA-Z0-9\-]*");
static COLON_AHEAD: Rule = Rule::new(r"\s*:");
static AT_RULE: Rule = Rule::new(r"@[a-zA-Z\-][a-zA-Z0-9\-]*");
static HEX_COLOUR: Rule = Rule::new(r"#[0-9a-fA-F]{3}(?:[0-9a-fA-F]{3})?");
static ID_OR_CLASS: Rule = Rule::new(r"[#.][a-zA-Z\-][a-zA-Z0-9\-]*");
static PSEUDO: Rule = Rule::new(r"::?[a-zA-Z\-][a-zA-Z0-9\-]*");
static NUMBER: Rule = Rule::new(r"[0-9]*\.[0-9]+|[0-9]+");
static UNIT: Rule = Rule::new(r"[a-zA-Z%]+");

/// Lexer state carried between CSS lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CssState {
    /// Inside a `/* ... */` comment.
    pub in_block_comment: bool,
    /// On a line that started an at-rule (reset at end of line).
    pub in_at_rule: bool,
    /// Inside a `{ ... }` rule body.
    pub in_rule: bool,
    /// Inside a `[ ... ]` attribute selector.
    pub in_attribute_selector: bool,
    /// The previous token was an attribute comparator.
    pub after_comparator: bool,
    /// Quote character of the open string, if any.
    pub string_opener: Option<char>,
}

/// CSS [`Language`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Css;

impl Css {
    /// Registry identifier.
    pub const ID: &'static str = "css";
}

impl Language for Css {
    type State = CssState;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn initial_state(&self) -> Self::State {
        CssState::default()
    }

    fn scan(&self, scanner: &mut Scanner<'_>, state: &mut Self::State) {
        if state.in_block_comment {
            if scanner.matches_str("*/") {
                state.in_block_comment = false;
            } else {
                scanner.matches(&BLOCK_COMMENT_BODY);
            }
            scanner.emit(TokenKind::Comment);
            return;
        }

        if scanner.matches_char('{') {
            state.in_rule = true;
            scanner.emit(TokenKind::Text);
            return;
        }
        if scanner.matches_char('}') {
            state.in_rule = false;
            scanner.emit(TokenKind::Text);
            return;
        }
        if scanner.matches_char('[') {
            state.in_attribute_selector = true;
            scanner.emit(TokenKind::Text);
            return;
        }
        if scanner.matches_char(']') {
            state.in_attribute_selector = false;
            scanner.emit(TokenKind::Text);
            return;
        }

        if scanner.matches_str("/*") {
            state.in_block_comment = true;
            scanner.emit(TokenKind::Comment);
            return;
        }

        if scanner.matches(&ESCAPE) {
            scanner.emit(TokenKind::Escape);
            return;
        }

        if let Some(opener) = state.string_opener {
            if scanner.matches_char(opener) {
                state.string_opener = None;
            } else if !scanner.matches(&STRING_BODY) {
                scanner.consume_char();
            }
            scanner.emit(TokenKind::String);
            return;
        }

        if scanner.matches(&QUOTE) {
            state.string_opener = scanner.last_match().chars().next();
            state.after_comparator = false;
            scanner.emit(TokenKind::String);
            return;
        }

        // An unquoted attribute value: `[type=text]`.
        if state.after_comparator {
            state.after_comparator = false;
            if scanner.matches(&BARE_VALUE) {
                scanner.emit(TokenKind::String);
                return;
            }
        }

        if state.in_attribute_selector
            && scanner.matches_followed_by(&CASE_FLAG, &CLOSE_BRACKET_AHEAD)
        {
            scanner.emit(TokenKind::Operator);
            return;
        }

        if state.in_rule && scanner.matches_followed_by(&NAME, &COLON_AHEAD) {
            scanner.emit(TokenKind::CallIdentifier);
            return;
        }

        if scanner.matches(&AT_RULE) {
            state.in_at_rule = true;
            scanner.emit(TokenKind::Keyword);
            return;
        }

        if state.in_rule && scanner.matches(&HEX_COLOUR) {
            scanner.emit(TokenKind::Number);
            return;
        }

        if scanner.matches(&ID_OR_CLASS) {
            scanner.emit(TokenKind::Identifier);
            return;
        }

        if scanner.matches(&PSEUDO) {
            scanner.emit(TokenKind::CallIdentifier);
            return;
        }

        if scanner.matches(&NAME) {
            let in_value = state.in_rule || state.in_at_rule || state.in_attribute_selector;
            scanner.emit(if in_value {
                TokenKind::Identifier
            } else {
                TokenKind::Keyword
            });
            return;
        }

        if scanner.matches(&NUMBER) {
            scanner.emit(TokenKind::Number);
            if scanner.matches(&UNIT) {
                scanner.emit(TokenKind::Identifier);
            }
            return;
        }

        if scanner.matches_any(COMPARATORS) {
            state.after_comparator = true;
            scanner.emit(TokenKind::Operator);
            return;
        }

        if scanner.matches_any(OPERATORS) {
            scanner.emit(TokenKind::Operator);
            return;
        }

        if scanner.matches(&WHITESPACE) {
            scanner.emit(TokenKind::Whitespace);
        }
    }

    fn end_line(&self, state: &mut Self::State) {
        state.in_at_rule = false;
    }
}
