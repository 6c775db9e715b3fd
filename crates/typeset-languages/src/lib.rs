//! `typeset-languages` - Line tokenizers for `typeset-core`.
//!
//! Each language is a [`Language`](typeset_core::Language) with its own carry-over state:
//!
//! - [`JavaScript`] - keywords, operators, numbers, nested template strings
//! - [`Css`] - selectors, rule bodies, at-rules, attribute selectors
//! - [`Html`] - tags, attributes, entities, with `<script>` and `<style>` delegated to
//!   [`JavaScript`] and [`Css`]
//! - [`Json`] - keys vs. values by bracket nesting, plus comments and JavaScript-style numbers
//!
//! [`builtin_registry`] returns a registry with all of them under their usual identifiers.
//!
//! ```rust
//! use typeset_core::TokenKind;
//!
//! let registry = typeset_languages::builtin_registry();
//! let tokenizer = registry.resolve("js");
//! let line = tokenizer.tokenize("const x = 1;", &tokenizer.initial_state());
//!
//! assert_eq!(line.tokens[0].kind, TokenKind::Keyword);
//! assert_eq!(line.tokens[0].text, "const");
//! ```

#![warn(missing_docs)]

pub mod css;
pub mod html;
pub mod javascript;
pub mod json;

pub use css::{Css, CssState};
pub use html::{Embedded, Html, HtmlState};
pub use javascript::{JavaScript, JsState, StringContext};
pub use json::{BracketKind, Json, JsonState};

use typeset_core::TokenizerRegistry;

/// Add the built-in languages to `registry`.
///
/// | identifiers          | language       |
/// |----------------------|----------------|
/// | `javascript`, `js`   | [`JavaScript`] |
/// | `css`                | [`Css`]        |
/// | `html`, `htm`        | [`Html`]       |
/// | `json`               | [`Json`]       |
pub fn register_builtins(registry: &mut TokenizerRegistry) {
    registry.register_language::<JavaScript>(JavaScript::ID);
    registry.register_language::<JavaScript>("js");
    registry.register_language::<Css>(Css::ID);
    registry.register_language::<Html>(Html::ID);
    registry.register_language::<Html>("htm");
    registry.register_language::<Json>(Json::ID);
}

/// A new registry holding the built-in languages.
pub fn builtin_registry() -> TokenizerRegistry {
    let mut registry = TokenizerRegistry::new();
    register_builtins(&mut registry);
    registry
}
