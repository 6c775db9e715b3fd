//! Tokens produced by line tokenizers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a [`Token`].
///
/// These are only categories. The UI/theme layer is expected to map them to actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Reserved word of the language (`if`, `return`, tag names, at-rules, ...).
    Keyword,
    /// Plain identifier or name.
    Identifier,
    /// Identifier directly followed by a call (`name(`), or a property-like name.
    CallIdentifier,
    /// String literal content, including its delimiters.
    String,
    /// Escape sequence (inside strings) or entity.
    Escape,
    /// Comment text.
    Comment,
    /// Numeric literal.
    Number,
    /// Operator.
    Operator,
    /// Bracket (`{`, `[`, `(` and their closing counterparts).
    Bracket,
    /// Whitespace run.
    Whitespace,
    /// Unclassified text.
    Text,
    /// Keyword that denotes a value (`true`, `null`, `this`, ...).
    ValueKeyword,
    /// Structural punctuation of a markup language (`<`, `>`, `=`).
    SyntaxSymbol,
    /// Key/value assignment punctuation (`:` in JSON).
    Assignment,
    /// Element separator (`,` in JSON).
    Separator,
}

impl TokenKind {
    /// Stable name of the kind, as used by theme layers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::CallIdentifier => "callIdentifier",
            Self::String => "string",
            Self::Escape => "escape",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Operator => "operator",
            Self::Bracket => "bracket",
            Self::Whitespace => "whitespace",
            Self::Text => "text",
            Self::ValueKeyword => "valueKeyword",
            Self::SyntaxSymbol => "syntaxSymbol",
            Self::Assignment => "assignment",
            Self::Separator => "separator",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified fragment of a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Semantic category.
    pub kind: TokenKind,
    /// Source text covered by the token.
    pub text: String,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Length of the token text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Concatenate token texts; for any tokenized line this reproduces the line exactly.
pub fn concat_tokens(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_serde() {
        let json = serde_json::to_string(&TokenKind::CallIdentifier).unwrap();
        assert_eq!(json, "\"callIdentifier\"");
        assert_eq!(TokenKind::ValueKeyword.to_string(), "valueKeyword");
    }

    #[test]
    fn test_concat_tokens() {
        let tokens = vec![
            Token::new(TokenKind::Keyword, "let"),
            Token::new(TokenKind::Whitespace, " "),
            Token::new(TokenKind::Identifier, "é"),
        ];
        assert_eq!(concat_tokens(&tokens), "let é");
        assert_eq!(tokens[2].char_len(), 1);
    }
}
