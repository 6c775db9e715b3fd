//! Tokenizer registry.
//!
//! Maps language identifiers to tokenizer factories. A registry is an ordinary value owned by
//! whoever builds editors from it; there is no process-wide registry.

use crate::tokenizer::{Language, PlainText, Tokenizer};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Produces a tokenizer for one editor instance.
pub type TokenizerFactory = Arc<dyn Fn() -> Arc<dyn Tokenizer> + Send + Sync>;

/// Language identifier -> tokenizer factory.
///
/// Identifiers are matched case-insensitively. Unknown identifiers resolve to [`PlainText`].
#[derive(Clone, Default)]
pub struct TokenizerRegistry {
    factories: FxHashMap<String, TokenizerFactory>,
}

impl TokenizerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `language_id`.
    pub fn register<F>(&mut self, language_id: impl AsRef<str>, factory: F)
    where
        F: Fn() -> Arc<dyn Tokenizer> + Send + Sync + 'static,
    {
        self.factories
            .insert(normalize_id(language_id.as_ref()), Arc::new(factory));
    }

    /// Register a [`Language`] constructed through `Default`.
    pub fn register_language<L>(&mut self, language_id: impl AsRef<str>)
    where
        L: Language + Default,
    {
        self.register(language_id, || Arc::new(L::default()) as Arc<dyn Tokenizer>);
    }

    /// Returns `true` if a factory is registered for `language_id`.
    pub fn contains(&self, language_id: &str) -> bool {
        self.factories.contains_key(&normalize_id(language_id))
    }

    /// Registered identifiers, sorted.
    pub fn language_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Build the tokenizer for `language_id`, or the plain-text fallback.
    pub fn resolve(&self, language_id: &str) -> Arc<dyn Tokenizer> {
        match self.factories.get(&normalize_id(language_id)) {
            Some(factory) => factory(),
            None => {
                tracing::debug!(language_id, "no tokenizer registered; using plain text");
                Arc::new(PlainText)
            }
        }
    }
}

impl fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizerRegistry")
            .field("languages", &self.language_ids())
            .finish()
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}
