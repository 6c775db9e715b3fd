//! Line tokenization cache.
//!
//! Memoizes `tokenize(text, inbound)` results keyed by a hash of the line text and a value
//! fingerprint of the inbound state. The cache is purely an optimization: any entry may be evicted at any time
//! and a miss is recovered by tokenizing again.
//!
//! Both halves of the key are only hashes; each entry also keeps the text and inbound state it
//! was computed from, and a lookup whose stored text or state differs by value is a miss.

use crate::state::LexerState;
use crate::token::Token;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

/// Default number of cached lines per editor.
pub const DEFAULT_CACHE_CAPACITY: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    text_hash: u64,
    fingerprint: u64,
}

impl CacheKey {
    fn new(text: &str, inbound: &LexerState) -> Self {
        Self {
            text_hash: FxBuildHasher.hash_one(text),
            fingerprint: inbound.fingerprint(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    text: Box<str>,
    inbound: LexerState,
    tokens: Arc<[Token]>,
    outbound: LexerState,
    last_used: u64,
}

/// A cache hit.
#[derive(Debug, Clone)]
pub struct CachedLine {
    /// Shared, immutable token list.
    pub tokens: Arc<[Token]>,
    /// Independent copy of the outbound state.
    pub outbound: LexerState,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries currently stored.
    pub entries: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that missed (including fingerprint collisions).
    pub misses: u64,
    /// Entries dropped by eviction.
    pub evictions: u64,
}

/// Bounded `(text, inbound state) -> (tokens, outbound state)` memoization.
///
/// When an insertion would exceed the capacity, the least recently used quarter of the entries
/// is evicted in one batch.
#[derive(Debug)]
pub struct LineCache {
    entries: FxHashMap<CacheKey, CacheEntry>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl LineCache {
    /// Create a cache holding at most `capacity` lines (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity: capacity.max(1),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters since creation (or the last [`LineCache::clear`]).
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }

    /// Look up the result of tokenizing `text` from `inbound`.
    pub fn lookup(&mut self, text: &str, inbound: &LexerState) -> Option<CachedLine> {
        self.clock += 1;
        let key = CacheKey::new(text, inbound);

        let Some(entry) = self.entries.get_mut(&key) else {
            self.stats.misses += 1;
            return None;
        };

        if *entry.text != *text || entry.inbound != *inbound {
            tracing::warn!(
                target: "typeset::cache",
                text_hash = key.text_hash,
                fingerprint = key.fingerprint,
                "cache key collision between distinct lines"
            );
            self.stats.misses += 1;
            return None;
        }

        entry.last_used = self.clock;
        self.stats.hits += 1;
        Some(CachedLine {
            tokens: entry.tokens.clone(),
            outbound: entry.outbound.clone(),
        })
    }

    /// Store the result of tokenizing `text` from `inbound`.
    pub fn store(
        &mut self,
        text: &str,
        inbound: &LexerState,
        tokens: Arc<[Token]>,
        outbound: &LexerState,
    ) {
        self.clock += 1;
        let key = CacheKey::new(text, inbound);

        if let Some(existing) = self.entries.get(&key)
            && *existing.text == *text
            && existing.inbound == *inbound
        {
            debug_assert!(
                *existing.tokens == *tokens && existing.outbound == *outbound,
                "tokenization is not referentially transparent for {text:?}"
            );
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict();
        }

        self.entries.insert(
            key,
            CacheEntry {
                text: text.into(),
                inbound: inbound.clone(),
                tokens,
                outbound: outbound.clone(),
                last_used: self.clock,
            },
        );
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    fn evict(&mut self) {
        let target = (self.capacity / 4).max(1);
        let mut ages: Vec<u64> = self.entries.values().map(|e| e.last_used).collect();
        ages.sort_unstable();
        let cutoff = ages[target.min(ages.len()) - 1];

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.last_used > cutoff);
        let evicted = before - self.entries.len();
        self.stats.evictions += evicted as u64;

        tracing::trace!(
            target: "typeset::cache",
            evicted,
            remaining = self.entries.len(),
            "evicted least recently used lines"
        );
    }
}

impl Default for LineCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
    struct Mode(u8);

    fn tokens(text: &str) -> Arc<[Token]> {
        vec![Token::new(TokenKind::Text, text)].into()
    }

    #[test]
    fn test_hit_requires_equal_state() {
        let mut cache = LineCache::new(8);
        let a = LexerState::new(Mode(0));
        let b = LexerState::new(Mode(1));

        cache.store("x", &a, tokens("x"), &b);

        let hit = cache.lookup("x", &LexerState::new(Mode(0))).unwrap();
        assert_eq!(hit.outbound, b);
        assert!(cache.lookup("x", &b).is_none());
        assert!(cache.lookup("y", &a).is_none());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 2, 1));
    }

    #[test]
    fn test_hit_shares_tokens_but_not_state() {
        let mut cache = LineCache::new(8);
        let inbound = LexerState::new(Mode(0));
        cache.store("x", &inbound, tokens("x"), &inbound);

        let first = cache.lookup("x", &inbound).unwrap();
        let mut second = cache.lookup("x", &inbound).unwrap();
        assert!(Arc::ptr_eq(&first.tokens, &second.tokens));

        second.outbound.downcast_mut::<Mode>().unwrap().0 = 9;
        assert_eq!(first.outbound, inbound);
        assert_eq!(cache.lookup("x", &inbound).unwrap().outbound, inbound);
    }

    #[test]
    fn test_key_collision_with_other_text_is_a_miss() {
        let mut cache = LineCache::new(8);
        let state = LexerState::new(Mode(0));
        cache.store("y", &state, tokens("y"), &state);

        // Re-file the entry for "y" under the key of "x".
        let entry = cache.entries.remove(&CacheKey::new("y", &state)).unwrap();
        cache.entries.insert(CacheKey::new("x", &state), entry);

        assert!(cache.lookup("x", &state).is_none());
        assert_eq!(cache.stats().misses, 1);

        cache.store("x", &state, tokens("x"), &state);
        assert_eq!(*cache.lookup("x", &state).unwrap().tokens, *tokens("x"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_drops_least_recently_used() {
        let mut cache = LineCache::new(4);
        let state = LexerState::new(Mode(0));

        for text in ["a", "b", "c", "d"] {
            cache.store(text, &state, tokens(text), &state);
        }
        // Touch "a" so "b" becomes the oldest.
        assert!(cache.lookup("a", &state).is_some());

        cache.store("e", &state, tokens("e"), &state);

        assert_eq!(cache.len(), 4);
        assert!(cache.lookup("b", &state).is_none());
        assert!(cache.lookup("a", &state).is_some());
        assert!(cache.lookup("e", &state).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = LineCache::default();
        let state = LexerState::unit();
        cache.store("a", &state, tokens("a"), &state);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
