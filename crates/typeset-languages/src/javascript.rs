//! JavaScript tokenizer.
//!
//! Strings are tracked as a stack of contexts: entering a `${ ... }` placeholder inside a
//! template string pushes a fresh context, so templates can nest inside placeholders. Template
//! strings and block comments carry over to the next line; single and double quoted strings only
//! do when the line ends with a `\` escape.

use serde::Serialize;
use typeset_core::{Language, Rule, Scanner, TokenKind};

/// Reserved words classified as [`TokenKind::Keyword`].
pub const KEYWORDS: &[&str] = &[
    "as", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "finally", "for", "from", "function",
    "get", "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "package",
    "private", "protected", "public", "return", "set", "switch", "static", "throw", "try",
    "typeof", "var", "void", "while", "with", "yield",
];

/// Words classified as [`TokenKind::ValueKeyword`].
pub const VALUE_KEYWORDS: &[&str] = &[
    "constructor",
    "false",
    "Infinity",
    "NaN",
    "null",
    "super",
    "this",
    "true",
    "undefined",
];

/// Operators, longest first where one is a prefix of another.
pub const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "=", "+=", "++", "+", "-=", "--", "-", "*=", "*", "/=", "/", "%=",
    "%", "**=", "**", "<<=", "<<", "<=", "<", ">>>=", ">>>", ">>=", ">>", ">=", ">", "&&=", "&&",
    "&=", "&", "^=", "^", "||=", "||", "|=", "|", "??=", "??",
];

pub(crate) static BLOCK_COMMENT_BODY: Rule = Rule::new(r"[^*]+|\*");
pub(crate) static LINE_COMMENT: Rule = Rule::new(r"//.*");
pub(crate) static OCTAL_ESCAPE: Rule = Rule::new(r"\\(?:[0-7]{2,3}|[1-7][0-7]{0,2})");
pub(crate) static HEX_ESCAPE: Rule = Rule::new(r"\\x[0-9a-fA-F]{2}");
pub(crate) static UNICODE_ESCAPE: Rule = Rule::new(r"\\u(?:[0-9a-fA-F]{4}|\{[0-9a-fA-F]+\})");
pub(crate) static LINE_END_ESCAPE: Rule = Rule::new(r"\\$");
pub(crate) static SINGLE_ESCAPE: Rule = Rule::new(r#"\\[bfnrtv0'"`$\\]"#);
static STRING_BODY: Rule = Rule::new(r#"[^"'`\\$]+|."#);
pub(crate) static QUOTE: Rule = Rule::new(r#"["']"#);
pub(crate) static HEX_NUMBER: Rule = Rule::new(r"0[xX][0-9a-fA-F]+n?");
pub(crate) static BINARY_NUMBER: Rule = Rule::new(r"0[bB][01]+n?");
pub(crate) static OCTAL_NUMBER: Rule = Rule::new(r"0[oO]?[0-7]+n?");
static DECIMAL_NUMBER: Rule =
    Rule::new(r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?n?");
pub(crate) static IDENTIFIER: Rule = Rule::new(r"[a-zA-Z_$][a-zA-Z0-9_$]*");
static CALL_LOOKAHEAD: Rule = Rule::new(r"\s*\(");
pub(crate) static WHITESPACE: Rule = Rule::new(r"\s+");

/// One level of the string context stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StringContext {
    /// Quote character of the open string, if any.
    pub opener: Option<char>,
    /// The open string is a template string.
    pub in_template_string: bool,
    /// Scanning code inside a `${ ... }` placeholder of this template string.
    pub in_template_placeholder: bool,
}

/// Lexer state carried between JavaScript lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct JsState {
    /// Innermost string context.
    pub current: StringContext,
    /// Enclosing contexts, outermost first.
    pub outer: Vec<StringContext>,
    /// The line ended with a `\` inside a string.
    pub newline_escape: bool,
    /// Inside a `/* ... */` comment.
    pub in_block_comment: bool,
}

impl JsState {
    /// Returns `true` if a string (of any kind) is open at the innermost level.
    pub fn in_string(&self) -> bool {
        self.current.opener.is_some() && !self.current.in_template_placeholder
    }

    /// Nesting depth of template placeholders.
    pub fn placeholder_depth(&self) -> usize {
        self.outer.len()
    }

    fn placeholder_below(&self) -> bool {
        self.outer
            .last()
            .is_some_and(|context| context.in_template_placeholder)
    }

    fn enter_placeholder(&mut self) {
        self.current.in_template_placeholder = true;
        self.outer.push(std::mem::take(&mut self.current));
    }

    fn leave_placeholder(&mut self) {
        if let Some(mut context) = self.outer.pop() {
            context.in_template_placeholder = false;
            self.current = context;
        }
    }
}

/// JavaScript [`Language`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScript;

impl JavaScript {
    /// Registry identifier.
    pub const ID: &'static str = "javascript";

    fn scan_string(&self, scanner: &mut Scanner<'_>, state: &mut JsState, opener: char) {
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

        if state.current.in_template_string && scanner.matches_str("${") {
            state.enter_placeholder();
            scanner.emit(TokenKind::String);
            return;
        }

        if scanner.matches_char(opener) {
            state.current.opener = None;
            state.current.in_template_string = false;
            scanner.emit(TokenKind::String);
            return;
        }

        scanner.matches(&STRING_BODY);
        scanner.emit(TokenKind::String);
    }
}

impl Language for JavaScript {
    type State = JsState;

    fn id(&self) -> &'static str {
        Self::ID
    }

    fn initial_state(&self) -> Self::State {
        JsState::default()
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

        if let Some(opener) = state.current.opener
            && !state.current.in_template_placeholder
        {
            self.scan_string(scanner, state, opener);
            return;
        }

        if state.placeholder_below() && scanner.matches_char('}') {
            state.leave_placeholder();
            scanner.emit(TokenKind::String);
            return;
        }

        if scanner.matches_char('`') {
            state.current.opener = Some('`');
            state.current.in_template_string = true;
            scanner.emit(TokenKind::String);
            return;
        }

        if scanner.matches(&QUOTE) {
            state.current.opener = scanner.last_match().chars().next();
            scanner.emit(TokenKind::String);
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

        // `.this` and `.default` are property accesses, not keywords.
        if scanner.last_match() != "."
            && let Some(word) = scanner.peek(&IDENTIFIER)
        {
            let kind = if KEYWORDS.contains(&word) {
                Some(TokenKind::Keyword)
            } else if VALUE_KEYWORDS.contains(&word) {
                Some(TokenKind::ValueKeyword)
            } else {
                None
            };
            if let Some(kind) = kind {
                scanner.consume(word.len());
                scanner.emit(kind);
                return;
            }
        }

        if scanner.matches_followed_by(&IDENTIFIER, &CALL_LOOKAHEAD) {
            scanner.emit(TokenKind::CallIdentifier);
            return;
        }

        if scanner.matches(&IDENTIFIER) {
            scanner.emit(TokenKind::Identifier);
            return;
        }

        if scanner.matches(&HEX_NUMBER)
            || scanner.matches(&BINARY_NUMBER)
            || scanner.matches(&OCTAL_NUMBER)
            || scanner.matches(&DECIMAL_NUMBER)
        {
            scanner.emit(TokenKind::Number);
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
        if !state.current.in_template_string && !state.newline_escape {
            state.current.opener = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use typeset_core::{Token, Tokenizer, concat_tokens};

    fn tokenize(line: &str, state: &mut JsState) -> Vec<Token> {
        JavaScript.tokenize_line(line, state)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_template_placeholder() {
        let mut state = JsState::default();
        let tokens = tokenize("`a${b}c`", &mut state);

        use TokenKind::*;
        assert_eq!(
            kinds(&tokens),
            vec![String, String, String, Identifier, String, String, String]
        );
        assert_eq!(tokens[3].text, "b");
        assert_eq!(state.current.opener, None);
        assert_eq!(state.placeholder_depth(), 0);
    }

    #[test]
    fn test_nested_template_in_placeholder() {
        let mut state = JsState::default();
        let tokens = tokenize("`x${ `y${z}` }`", &mut state);

        assert_eq!(concat_tokens(&tokens), "`x${ `y${z}` }`");
        let z = tokens.iter().find(|t| t.text == "z").unwrap();
        assert_eq!(z.kind, TokenKind::Identifier);
        assert_eq!(state, JsState::default());
    }

    #[test]
    fn test_keywords_calls_and_operators() {
        let mut state = JsState::default();
        let tokens = tokenize("const x = foo (this.default) >>>= 1;", &mut state);

        let find = |text: &str| tokens.iter().find(|t| t.text == text).unwrap().kind;
        assert_eq!(find("const"), TokenKind::Keyword);
        assert_eq!(find("x"), TokenKind::Identifier);
        assert_eq!(find("foo"), TokenKind::CallIdentifier);
        assert_eq!(find("this"), TokenKind::ValueKeyword);
        // After a `.` a keyword is a plain property name.
        assert_eq!(find("default"), TokenKind::Identifier);
        assert_eq!(find(">>>="), TokenKind::Operator);
        assert_eq!(find("."), TokenKind::Text);
    }

    #[test]
    fn test_numbers() {
        let mut state = JsState::default();
        let line = "n = 1 + 3.14 - 0x1F * 1e3 / 10n % .5 + 0b101 + 0o17 + x1;";
        let tokens = tokenize(line, &mut state);

        let numbers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(
            numbers,
            vec!["1", "3.14", "0x1F", "1e3", "10n", ".5", "0b101", "0o17"]
        );
        assert_eq!(concat_tokens(&tokens), line);
    }

    #[test]
    fn test_minus_before_number_is_an_operator() {
        let mut state = JsState::default();
        let tokens = tokenize("a-1", &mut state);

        use TokenKind::*;
        assert_eq!(kinds(&tokens), vec![Identifier, Operator, Number]);
        assert_eq!(tokens[1].text, "-");
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let mut state = JsState::default();
        let tokens = tokenize("instanceofx in", &mut state);
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "instanceofx"));
        assert_eq!(tokens[2], Token::new(TokenKind::Keyword, "in"));
    }

    #[test]
    fn test_escapes() {
        let mut state = JsState::default();
        let tokens = tokenize(r#""\x41\u{1F600}\101\n\q""#, &mut state);

        let escapes: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Escape)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(escapes, vec![r"\x41", r"\u{1F600}", r"\101", r"\n"]);
        assert_eq!(concat_tokens(&tokens), r#""\x41\u{1F600}\101\n\q""#);
    }

    #[test]
    fn test_quoted_string_closes_at_end_of_line() {
        let mut state = JsState::default();
        tokenize("let s = 'open", &mut state);
        assert_eq!(state.current.opener, None);

        let tokens = tokenize("x", &mut state);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_line_end_escape_continues_string() {
        let mut state = JsState::default();
        tokenize(r#"let s = "open\"#, &mut state);
        assert_eq!(state.current.opener, Some('"'));
        assert!(state.newline_escape);

        let tokens = tokenize(r#"still" + x"#, &mut state);
        assert_eq!(tokens[0], Token::new(TokenKind::String, "still"));
        assert_eq!(tokens[1], Token::new(TokenKind::String, "\""));
        assert!(!state.newline_escape);
        assert_eq!(state.current.opener, None);
    }

    #[test]
    fn test_template_string_spans_lines() {
        let mut state = JsState::default();
        tokenize("let t = `first", &mut state);
        assert!(state.in_string());

        let tokens = tokenize("second` + 1", &mut state);
        assert_eq!(tokens[0], Token::new(TokenKind::String, "second"));
        assert!(!state.in_string());
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let mut state = JsState::default();
        let first = tokenize("a /* b", &mut state);
        assert!(state.in_block_comment);
        assert_eq!(first.last().unwrap().kind, TokenKind::Comment);

        let second = tokenize("c **/ d", &mut state);
        assert!(!state.in_block_comment);
        assert_eq!(concat_tokens(&second), "c **/ d");
        assert_eq!(second.last().unwrap(), &Token::new(TokenKind::Identifier, "d"));
    }

    #[test]
    fn test_line_comment() {
        let mut state = JsState::default();
        let tokens = tokenize("x; // done", &mut state);
        assert_eq!(tokens.last().unwrap(), &Token::new(TokenKind::Comment, "// done"));
    }

    #[test]
    fn test_erased_tokenizer_round_trip() {
        let inbound = Tokenizer::initial_state(&JavaScript);
        let out = JavaScript.tokenize("`open", &inbound);
        assert!(out.outbound.downcast_ref::<JsState>().unwrap().in_string());
        assert_eq!(JavaScript.tokenize("`open", &inbound), out);
    }
}
