//! JSON tokenizer.
//!
//! A stack of open brackets decides whether a string is an object key ([`TokenKind::Identifier`])
//! or a value ([`TokenKind::String`]). Comments, single-quoted strings and JavaScript-style
//! numbers are accepted as extensions.

use crate::javascript::{
    BINARY_NUMBER, BLOCK_COMMENT_BODY, HEX_ESCAPE, HEX_NUMBER, IDENTIFIER, LINE_COMMENT,
    LINE_END_ESCAPE, OCTAL_ESCAPE, OCTAL_NUMBER, QUOTE, SINGLE_ESCAPE, UNICODE_ESCAPE, WHITESPACE,
};
use serde::Serialize;
use typeset_core::{Language, Rule, Scanner, TokenKind};

/// Words classified as [`TokenKind::ValueKeyword`].
pub const VALUE_KEYWORDS: &[&str] = &["false", "Infinity", "NaN", "null", "true"];

static STRING_BODY: Rule = Rule::new(r#"[^"'\\]+|."#);
static SIGNED_DECIMAL_NUMBER: Rule =
    Rule::new(r"[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?n?");

/// Kind of an open bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketKind {
    /// `{`
    Object,
    /// `[`
    Array,
    /// `(`
    Expression,
}

impl BracketKind {
    /// Classify a bracket character: its kind and whether it opens.
    pub fn of(bracket: char) -> Option<(Self, bool)> {
        match bracket {
            '{' => Some((Self::Object, true)),
            '}' => Some((Self::Object, false)),
            '[' => Some((Self::Array, true)),
            ']' => Some((Self::Array, false)),
            '(' => Some((Self::Expression, true)),
            ')' => Some((Self::Expression, false)),
            _ => None,
        }
    }
}

/// Lexer state carried between JSON lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct JsonState {
    /// Quote character of the open string, if any.
    pub string_opener: Option<char>,
    /// Open brackets, outermost first.
    pub brackets: Vec<BracketKind>,
    /// The line ended with a `\` inside a string.
    pub newline_escape: bool,
    /// Inside a `/* ... */` comment.
    pub in_block_comment: bool,
    /// The next string is an object key.
    pub in_object_key: bool,
}

impl JsonState {
    /// Innermost open bracket.
    pub fn innermost(&self) -> Option<BracketKind> {
        self.brackets.last().copied()
    }

    fn in_object(&self) -> bool {
        self.innermost() == Some(BracketKind::Object)
    }

    fn string_kind(&self) -> TokenKind {
        if self.in_object_key {
            TokenKind::Identifier
        } else {
            TokenKind::String
        }
    }
}

/// JSON [`Language`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Json {
    /// Registry identifier.
    pub const ID: &'static str = "json";

    fn scan_string(&self, scanner: &mut Scanner<'_>, state: &mut JsonState, opener: char) {
        if scanner.matches(&OCTAL_ESCAPE)
            || scanner.matches(&HEX_ESCAPE)
            || scanner.matches(&UNICODE_ESCAPE)
        {
            scanner.emit(TokenKind::Escape);
            return;
        }
        if scanner.matches(&LINE_END_ESCAPE) {
            state.newline_escape = true;
            scanner.emit(TokenKind::Escape);
            return;
        }
        if scanner.matches(&SINGLE_ESCAPE) {
            scanner.emit(TokenKind::Escape);
            return;
        }

        if scanner.matches_char(opener) {
            state.string_opener = None;
        } else {
            scanner.matches(&STRING_BODY);
        }
        scanner.emit(state.string_kind());
    }
}

impl Language for Json {
    type State = JsonState;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn initial_state(&self) -> Self::State {
        JsonState::default()
    }

    fn begin_line(&self, state: &mut Self::State) {
        state.newline_escape = false;
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

        if let Some(opener) = state.string_opener {
            self.scan_string(scanner, state, opener);
            return;
        }

        if scanner.matches(&QUOTE) {
            state.string_opener = scanner.last_match().chars().next();
            scanner.emit(state.string_kind());
            return;
        }

        if scanner.matches_str("/*") {
            state.in_block_comment = true;
            scanner.emit(TokenKind::Comment);
            return;
        }

        if scanner.matches(&LINE_COMMENT) {
            scanner.emit(TokenKind::Comment);
            return;
        }

        let bracket = scanner.remaining().chars().next().and_then(BracketKind::of);
        if let Some((kind, opening)) = bracket {
            scanner.consume_char();
            scanner.emit(TokenKind::Bracket);
            // Mismatched closers still pop; the stack is only a key/value heuristic.
            if opening {
                state.brackets.push(kind);
            } else {
                state.brackets.pop();
            }
            state.in_object_key = state.in_object();
            return;
        }

        if scanner.last_match() != "."
            && let Some(word) = scanner.peek(&IDENTIFIER)
            && VALUE_KEYWORDS.contains(&word)
        {
            scanner.consume(word.len());
            scanner.emit(TokenKind::ValueKeyword);
            return;
        }

        if scanner.matches(&IDENTIFIER) {
            scanner.emit(TokenKind::Identifier);
            return;
        }

        if scanner.matches(&HEX_NUMBER)
            || scanner.matches(&BINARY_NUMBER)
            || scanner.matches(&OCTAL_NUMBER)
            || scanner.matches(&SIGNED_DECIMAL_NUMBER)
        {
            scanner.emit(TokenKind::Number);
            return;
        }

        if scanner.matches_char(':') {
            state.in_object_key = false;
            scanner.emit(TokenKind::Assignment);
            return;
        }

        if scanner.matches_char(',') {
            if state.in_object() {
                state.in_object_key = true;
            }
            scanner.emit(TokenKind::Separator);
            return;
        }

        if scanner.matches(&WHITESPACE) {
            scanner.emit(TokenKind::Whitespace);
        }
    }

    fn end_line(&self, state: &mut Self::State) {
        if !state.newline_escape {
            state.string_opener = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use typeset_core::{Token, concat_tokens};

    fn tokenize(line: &str, state: &mut JsonState) -> Vec<Token> {
        Json.tokenize_line(line, state)
    }

    #[test]
    fn test_key_and_value() {
        let mut state = JsonState::default();
        let tokens = tokenize(r#"{"a": 1}"#, &mut state);

        use TokenKind::*;
        assert_eq!(
            tokens,
            vec![
                Token::new(Bracket, "{"),
                Token::new(Identifier, "\""),
                Token::new(Identifier, "a"),
                Token::new(Identifier, "\""),
                Token::new(Assignment, ":"),
                Token::new(Whitespace, " "),
                Token::new(Number, "1"),
                Token::new(Bracket, "}"),
            ]
        );
        let key: std::string::String = tokens[1..4].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(key, "\"a\"");
        assert!(state.brackets.is_empty());
    }

    #[test]
    fn test_separator_restores_key_mode() {
        let mut state = JsonState::default();
        let tokens = tokenize(r#"{"a": "x", "b": [true, "y"]}"#, &mut state);

        let kinds_of = |text: &str| -> Vec<TokenKind> {
            tokens
                .iter()
                .filter(|t| t.text == text)
                .map(|t| t.kind)
                .collect()
        };
        assert_eq!(kinds_of("a"), vec![TokenKind::Identifier]);
        assert_eq!(kinds_of("x"), vec![TokenKind::String]);
        assert_eq!(kinds_of("b"), vec![TokenKind::Identifier]);
        // Inside the array strings are values again.
        assert_eq!(kinds_of("y"), vec![TokenKind::String]);
        assert_eq!(kinds_of("true"), vec![TokenKind::ValueKeyword]);
        assert_eq!(kinds_of(","), vec![TokenKind::Separator; 2]);
    }

    #[test]
    fn test_numbers() {
        for literal in ["0x1F", "0b101n", "017", "-12.5e+3", ".5", "42n", "3.", "0"] {
            let mut state = JsonState::default();
            let tokens = tokenize(literal, &mut state);
            assert_eq!(tokens, vec![Token::new(TokenKind::Number, literal)], "{literal}");
        }
    }

    #[test]
    fn test_nested_object_across_lines() {
        let mut state = JsonState::default();
        tokenize("{", &mut state);
        tokenize(r#"  "outer": {"#, &mut state);
        assert_eq!(state.brackets, vec![BracketKind::Object, BracketKind::Object]);
        assert!(state.in_object_key);

        let tokens = tokenize(r#"    "inner": null"#, &mut state);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens.last().unwrap(), &Token::new(TokenKind::ValueKeyword, "null"));
    }

    #[test]
    fn test_unterminated_string_closes_at_end_of_line() {
        let mut state = JsonState::default();
        let tokens = tokenize(r#"["abc"#, &mut state);
        assert_eq!(concat_tokens(&tokens), r#"["abc"#);
        assert_eq!(state.string_opener, None);

        tokenize(r#"["abc\"#, &mut state);
        assert_eq!(state.string_opener, Some('"'));
    }

    #[test]
    fn test_comments_and_stray_closers() {
        let mut state = JsonState::default();
        let tokens = tokenize("]] // trailing", &mut state);
        assert!(state.brackets.is_empty());
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Comment);
    }
}
