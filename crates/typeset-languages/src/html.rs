//! HTML tokenizer.
//!
//! The contents of `<script>` and `<style>` elements are handed to the JavaScript and CSS
//! tokenizers. Their state lives inside [`HtmlState`], so an embedded block that spans several
//! lines resumes exactly where the previous line stopped.

use crate::css::{Css, CssState};
use crate::javascript::{JavaScript, JsState, WHITESPACE};
use serde::Serialize;
use typeset_core::{Language, Rule, Scanner, Token, TokenKind};

static COMMENT_BODY: Rule = Rule::new(r"[^-]+|-");
static ENTITY: Rule = Rule::new(r"&(?:[a-zA-Z0-9]+|#[0-9]+|#[xX][0-9a-fA-F]+);?");
static QUOTED_VALUE_BODY: Rule = Rule::new(r#"[^"'&]+"#);
static BARE_VALUE: Rule = Rule::new(r#"[^>"'&\s]+"#);
static ATTRIBUTE_NAME: Rule = Rule::new(r#"[^=>"'\s/]+"#);
static EQUALS: Rule = Rule::new(r"\s*=\s*");
static TAG_OPEN: Rule = Rule::new(r"</?");
static TAG_NAME: Rule = Rule::new(r#"[^<>"'\s/]+"#);
static TEXT: Rule = Rule::new(r"[^<>&]+");

/// A block of another language embedded in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "language", content = "state")]
pub enum Embedded {
    /// Inside `<script>`.
    JavaScript(JsState),
    /// Inside `<style>`.
    Css(CssState),
}

impl Embedded {
    /// Fresh embedded state for the element `tag_name`, if its contents are another language.
    pub fn for_tag(tag_name: &str) -> Option<Self> {
        match tag_name {
            "script" => Some(Self::JavaScript(JsState::default())),
            "style" => Some(Self::Css(CssState::default())),
            _ => None,
        }
    }

    /// Name of the element whose closing tag ends the block.
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::JavaScript(_) => "script",
            Self::Css(_) => "style",
        }
    }

    fn tokenize(&mut self, segment: &str) -> Vec<Token> {
        match self {
            Self::JavaScript(state) => JavaScript.tokenize_line(segment, state),
            Self::Css(state) => Css.tokenize_line(segment, state),
        }
    }
}

/// Lexer state carried between HTML lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct HtmlState {
    /// Inside `<!-- ... -->`.
    pub in_block_comment: bool,
    /// Between a tag name and its `>`.
    pub in_tag: bool,
    /// The open tag is a closing tag (`</name`).
    pub closing_tag: bool,
    /// Lowercased name of the most recent tag.
    pub tag_name: Option<String>,
    /// Scanning an attribute value.
    pub in_attribute_value: bool,
    /// Quote character of the attribute value, if quoted.
    pub attribute_value_opener: Option<char>,
    /// Embedded language block in progress.
    pub embedded: Option<Embedded>,
}

/// Byte offset of the closing tag `</tag_name` in `text`, ignoring ASCII case.
fn find_closing_tag(text: &str, tag_name: &str) -> Option<usize> {
    let lowered = text.to_ascii_lowercase();
    let needle = format!("</{tag_name}");
    let mut from = 0;

    while let Some(found) = lowered[from..].find(&needle) {
        let start = from + found;
        let after = start + needle.len();
        match lowered[after..].chars().next() {
            None | Some('>' | '/') => return Some(start),
            Some(ch) if ch.is_whitespace() => return Some(start),
            _ => from = after,
        }
    }
    None
}

/// HTML [`Language`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Html;

impl Html {
    /// Registry identifier.
    pub const ID: &'static str = "html";

    /// Tokenize embedded code up to the closing tag. Returns `false` if nothing was consumed.
    fn scan_embedded(&self, scanner: &mut Scanner<'_>, state: &mut HtmlState) -> bool {
        let Some(embedded) = state.embedded.as_mut() else {
            return false;
        };

        let rest = scanner.remaining();
        let end = find_closing_tag(rest, embedded.tag_name());
        let len = end.unwrap_or(rest.len());
        if len > 0 {
            let tokens = embedded.tokenize(&rest[..len]);
            scanner.embed(len, tokens);
        }
        if end.is_some() {
            state.embedded = None;
        }
        len > 0
    }

    fn close_tag(&self, state: &mut HtmlState) {
        state.in_tag = false;
        state.in_attribute_value = false;
        state.attribute_value_opener = None;
        if !state.closing_tag {
            state.embedded = state.tag_name.as_deref().and_then(Embedded::for_tag);
        }
    }

    fn scan_attribute_value(&self, scanner: &mut Scanner<'_>, state: &mut HtmlState) {
        if let Some(opener) = state.attribute_value_opener {
            if scanner.matches_char(opener) {
                state.in_attribute_value = false;
                state.attribute_value_opener = None;
            } else if !scanner.matches(&QUOTED_VALUE_BODY) {
                scanner.consume_char();
            }
            scanner.emit(TokenKind::String);
            return;
        }

        if scanner.matches_char('>') {
            self.close_tag(state);
            scanner.emit(TokenKind::SyntaxSymbol);
            return;
        }
        if scanner.matches(&WHITESPACE) {
            state.in_attribute_value = false;
            scanner.emit(TokenKind::Whitespace);
            return;
        }
        if scanner.matches_char('"') || scanner.matches_char('\'') {
            state.attribute_value_opener = scanner.last_match().chars().next();
            scanner.emit(TokenKind::String);
            return;
        }
        if scanner.matches(&BARE_VALUE) {
            scanner.emit(TokenKind::String);
        }
    }

    fn scan_tag(&self, scanner: &mut Scanner<'_>, state: &mut HtmlState) {
        if scanner.matches_followed_by(&ATTRIBUTE_NAME, &EQUALS) {
            scanner.emit(TokenKind::Identifier);
            scanner.matches(&EQUALS);
            scanner.emit(TokenKind::SyntaxSymbol);
            state.in_attribute_value = true;
            return;
        }
        if scanner.matches(&ATTRIBUTE_NAME) {
            scanner.emit(TokenKind::Identifier);
            return;
        }
        if scanner.matches_str("/>") {
            state.in_tag = false;
            scanner.emit(TokenKind::SyntaxSymbol);
            return;
        }
        if scanner.matches_char('>') {
            self.close_tag(state);
            scanner.emit(TokenKind::SyntaxSymbol);
            return;
        }
        if scanner.matches(&WHITESPACE) {
            scanner.emit(TokenKind::Whitespace);
        }
    }
}

impl Language for Html {
    type State = HtmlState;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn initial_state(&self) -> Self::State {
        HtmlState::default()
    }

    fn scan(&self, scanner: &mut Scanner<'_>, state: &mut Self::State) {
        if self.scan_embedded(scanner, state) {
            return;
        }

        if state.in_block_comment {
            if scanner.matches_str("-->") {
                state.in_block_comment = false;
            } else {
                scanner.matches(&COMMENT_BODY);
            }
            scanner.emit(TokenKind::Comment);
            return;
        }

        if scanner.matches(&ENTITY) {
            scanner.emit(TokenKind::Escape);
            return;
        }

        if state.in_attribute_value {
            self.scan_attribute_value(scanner, state);
            return;
        }

        if state.in_tag {
            self.scan_tag(scanner, state);
            return;
        }

        if scanner.matches_str("<!--") {
            state.in_block_comment = true;
            scanner.emit(TokenKind::Comment);
            return;
        }

        if scanner.matches_followed_by(&TAG_OPEN, &TAG_NAME) {
            state.closing_tag = scanner.last_match() == "</";
            scanner.emit(TokenKind::SyntaxSymbol);
            scanner.matches(&TAG_NAME);
            state.in_tag = true;
            state.tag_name = Some(scanner.last_match().to_ascii_lowercase());
            scanner.emit(TokenKind::Keyword);
            return;
        }

        if scanner.matches(&TEXT) {
            scanner.emit(TokenKind::Text);
        }
    }

    fn end_line(&self, state: &mut Self::State) {
        // Unquoted values stop at whitespace, and a line break is whitespace.
        if state.in_attribute_value && state.attribute_value_opener.is_none() {
            state.in_attribute_value = false;
        }
    }
}
