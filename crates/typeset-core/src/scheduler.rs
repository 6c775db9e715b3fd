//! Render scheduler.
//!
//! Owns the current line list and turns a new list of line texts into a patch script, deciding
//! per line whether to reuse the previous rendering, tokenize it (through the line cache), or
//! emit a cheap placeholder.
//!
//! Lines are aligned with their previous rendering through [`diff_lines`], so a line that only
//! moved (because lines were inserted or removed above it) keeps its tokens and identity.
//!
//! Lines inside the lazy window (the visible range plus padding) and lines above it are always
//! tokenized; lines below it become placeholders until they are scrolled into view. A reused line
//! whose inbound state changed is marked dirty. Dirty lines are re-tokenized as soon as they are
//! no longer below the window, so the state flowing into the window is always current. Lines
//! below the window stay dirty until they are needed.

use crate::cache::{CacheStats, LineCache};
use crate::diff::{DiffStats, LineDiff, diff_lines};
use crate::line::{Line, LineId, LinePatch, PatchStats, build_patches};
use crate::state::LexerState;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How aggressively a render pass refreshes lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Tokenize every line; no reuse and no placeholders.
    Full,
    /// Reuse every aligned line; only new lines are tokenized.
    #[default]
    Partial,
    /// Re-tokenize every visible line; reuse the rest.
    ForceVisible,
    /// Re-tokenize visible lines that are dirty; reuse the rest.
    ForceVisibleAndDirty,
}

impl RenderMode {
    fn strength(self) -> u8 {
        match self {
            Self::Partial => 0,
            Self::ForceVisible => 1,
            Self::ForceVisibleAndDirty => 2,
            Self::Full => 3,
        }
    }

    /// The stronger of two requested modes.
    ///
    /// `Full` dominates everything, `ForceVisibleAndDirty` dominates `ForceVisible`, and
    /// `Partial` is the weakest.
    pub fn merge(self, other: Self) -> Self {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }

    fn reuses(self, visible: bool, dirty: bool) -> bool {
        match self {
            Self::Full => false,
            Self::Partial => true,
            Self::ForceVisible => !visible,
            Self::ForceVisibleAndDirty => !visible || dirty,
        }
    }
}

/// Inclusive range of line indices rendered at full fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineWindow {
    /// First line of the window.
    pub first: usize,
    /// Last line of the window (inclusive).
    pub last: usize,
}

impl LineWindow {
    /// Window covering exactly `first..=last`.
    pub fn new(first: usize, last: usize) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Window covering the visible lines `first..=last` plus `padding` lines on each side.
    pub fn around(first: usize, last: usize, padding: usize) -> Self {
        let window = Self::new(first, last);
        Self {
            first: window.first.saturating_sub(padding),
            last: window.last.saturating_add(padding),
        }
    }

    /// Window covering every line.
    pub fn everything() -> Self {
        Self {
            first: 0,
            last: usize::MAX,
        }
    }

    /// Returns `true` if line `index` is inside the window.
    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }

    /// Returns `true` if line `index` comes after the window.
    pub fn is_below(&self, index: usize) -> bool {
        index > self.last
    }

    /// Returns `true` if line `index` comes before the window.
    pub fn is_above(&self, index: usize) -> bool {
        index < self.first
    }
}

/// Per-strategy counts of one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Dirty lines up to the end of the window re-tokenized in place.
    pub render_dirty: usize,
    /// Lines kept from the previous pass.
    pub reused: usize,
    /// Reused lines marked dirty because their inbound state changed.
    pub marked_stale: usize,
    /// Lines served from the line cache.
    pub cache_hits: usize,
    /// Lines emitted as placeholders.
    pub placeholders: usize,
    /// Lines run through the tokenizer.
    pub tokenized: usize,
}

/// Result of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Patch script transforming the previous line list into the current one.
    pub patches: Vec<LinePatch>,
    /// Per-strategy counts.
    pub stats: RenderStats,
    /// Diff counts between the previous and current line texts.
    pub diff: DiffStats,
}

impl RenderOutcome {
    /// Returns `true` if the patch script changes nothing.
    pub fn is_noop(&self) -> bool {
        self.patches.iter().all(LinePatch::is_keep)
    }
}

/// Incremental renderer for one document.
pub struct RenderScheduler {
    tokenizer: Arc<dyn Tokenizer>,
    cache: LineCache,
    lines: Vec<Line>,
    next_id: u64,
}

impl RenderScheduler {
    /// Create a scheduler with an empty line list.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, cache_capacity: usize) -> Self {
        Self {
            tokenizer,
            cache: LineCache::new(cache_capacity),
            lines: Vec::new(),
            next_id: 0,
        }
    }

    /// The tokenizer lines are rendered with.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Current line list.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of dirty lines in the current list.
    pub fn dirty_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_dirty()).count()
    }

    /// Line cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Mark every line from `index` onwards dirty.
    pub fn mark_dirty_from(&mut self, index: usize) {
        for line in self.lines.iter_mut().skip(index) {
            line.mark_dirty();
        }
    }

    /// Forget the current line list and the cache; the next pass inserts every line.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.cache.clear();
    }

    /// Render `texts` (one entry per line) for the given window and mode.
    pub fn render<S: AsRef<str>>(
        &mut self,
        texts: &[S],
        window: LineWindow,
        mode: RenderMode,
    ) -> RenderOutcome {
        let previous = std::mem::take(&mut self.lines);
        let previous_ids: Vec<LineId> = previous.iter().map(Line::id).collect();

        let entries = {
            let old: Vec<&str> = previous.iter().map(Line::text).collect();
            let new: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
            diff_lines(&old, &new)
        };
        let aligned = align(&entries, texts.len());
        let mut slots: Vec<Option<Line>> = previous.into_iter().map(Some).collect();

        let mut stats = RenderStats::default();
        let mut inbound = self.tokenizer.initial_state();
        let mut lines = Vec::with_capacity(texts.len());

        for (index, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            let visible = window.contains(index);
            let old = aligned[index].and_then(|p| slots[p].take());

            let line = match old {
                Some(mut old) if mode.reuses(visible, old.dirty) => {
                    if old.inbound_fingerprint != inbound.fingerprint() {
                        old.dirty = true;
                        stats.marked_stale += 1;
                    }
                    if old.dirty && !window.is_below(index) {
                        stats.render_dirty += 1;
                        self.tokenize_line(text, &inbound, &mut stats)
                    } else {
                        stats.reused += 1;
                        old
                    }
                }
                _ if mode != RenderMode::Full && window.is_below(index) => {
                    stats.placeholders += 1;
                    self.placeholder(text, &inbound)
                }
                _ => self.tokenize_line(text, &inbound, &mut stats),
            };

            inbound = line.outbound_state.clone();
            lines.push(line);
        }

        let patches = build_patches(&previous_ids, &lines, &entries);
        self.lines = lines;

        let diff = DiffStats::from_entries(&entries);
        log_pass(mode, window, &stats, &diff, &patches);

        RenderOutcome {
            patches,
            stats,
            diff,
        }
    }

    fn tokenize_line(&mut self, text: &str, inbound: &LexerState, stats: &mut RenderStats) -> Line {
        let (tokens, outbound) = match self.cache.lookup(text, inbound) {
            Some(hit) => {
                stats.cache_hits += 1;
                (hit.tokens, hit.outbound)
            }
            None => {
                stats.tokenized += 1;
                let out = self.tokenizer.tokenize(text, inbound);
                let tokens: Arc<[Token]> = out.tokens.into();
                self.cache.store(text, inbound, tokens.clone(), &out.outbound);
                (tokens, out.outbound)
            }
        };

        Line {
            id: self.fresh_id(),
            text: text.to_string(),
            inbound_fingerprint: inbound.fingerprint(),
            tokens,
            outbound_state: outbound,
            dirty: false,
        }
    }

    fn placeholder(&mut self, text: &str, inbound: &LexerState) -> Line {
        let tokens: Arc<[Token]> = if text.is_empty() {
            Arc::new([])
        } else {
            Arc::new([Token::new(TokenKind::Text, text)])
        };

        Line {
            id: self.fresh_id(),
            text: text.to_string(),
            inbound_fingerprint: inbound.fingerprint(),
            tokens,
            outbound_state: inbound.clone(),
            dirty: true,
        }
    }

    fn fresh_id(&mut self) -> LineId {
        self.next_id += 1;
        LineId(self.next_id)
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("language", &self.tokenizer.language_id())
            .field("lines", &self.lines.len())
            .field("cache", &self.cache.stats())
            .finish()
    }
}

/// For each current line, the index of the previous line it is `Same` as.
fn align(entries: &[LineDiff], current_len: usize) -> Vec<Option<usize>> {
    let mut aligned = vec![None; current_len];
    let mut p = 0;
    let mut c = 0;

    for entry in entries {
        if *entry == LineDiff::Same {
            aligned[c] = Some(p);
        }
        if entry.consumes_previous() {
            p += 1;
        }
        if entry.consumes_current() {
            c += 1;
        }
    }

    aligned
}

fn log_pass(
    mode: RenderMode,
    window: LineWindow,
    stats: &RenderStats,
    diff: &DiffStats,
    patches: &[LinePatch],
) {
    tracing::debug!(
        target: "typeset::render",
        ?mode,
        window_first = window.first,
        window_last = window.last,
        render_dirty = stats.render_dirty,
        reused = stats.reused,
        marked_stale = stats.marked_stale,
        cache_hits = stats.cache_hits,
        placeholders = stats.placeholders,
        tokenized = stats.tokenized,
        "render pass"
    );

    let patch = PatchStats::from_patches(patches);
    tracing::debug!(
        target: "typeset::patch",
        same = diff.same,
        added = diff.added,
        removed = diff.removed,
        modified = diff.modified,
        keep = patch.keep,
        insert = patch.insert,
        remove = patch.remove,
        replace = patch.replace,
        "line patch"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::apply_patches;
    use crate::tokenizer::{Language, Scanner};
    use serde::Serialize;

    /// `{` and `}` track nesting depth; everything else is plain text.
    #[derive(Default)]
    struct Braces;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    struct Depth(u32);

    impl Language for Braces {
        type State = Depth;

        fn id(&self) -> &'static str {
            "braces"
        }

        fn initial_state(&self) -> Self::State {
            Depth(0)
        }

        fn scan(&self, scanner: &mut Scanner<'_>, state: &mut Self::State) {
            if scanner.matches_str("{") {
                state.0 += 1;
                scanner.emit(TokenKind::Bracket);
            } else if scanner.matches_str("}") {
                state.0 = state.0.saturating_sub(1);
                scanner.emit(TokenKind::Bracket);
            }
        }
    }

    fn scheduler() -> RenderScheduler {
        RenderScheduler::new(Arc::new(Braces), 64)
    }

    fn depth(line: &Line) -> u32 {
        line.outbound_state().downcast_ref::<Depth>().unwrap().0
    }

    #[test]
    fn test_initial_render_inserts_every_line() {
        let mut s = scheduler();
        let out = s.render(&["a", "{", "b"], LineWindow::everything(), RenderMode::Partial);

        assert_eq!(out.patches.len(), 3);
        assert!(out.patches.iter().all(|p| matches!(p.op, crate::line::PatchOp::Insert(_))));
        assert_eq!(out.stats.tokenized, 3);
        assert_eq!(depth(&s.lines()[2]), 1);
    }

    #[test]
    fn test_lines_below_window_are_placeholders() {
        let mut s = scheduler();
        let texts = ["{", "a", "b", "c"];
        let out = s.render(&texts, LineWindow::new(0, 1), RenderMode::Partial);

        assert_eq!(out.stats.placeholders, 2);
        let third = &s.lines()[2];
        assert!(third.is_dirty());
        assert_eq!(third.tokens(), &[Token::new(TokenKind::Text, "b")]);
        // Placeholders pass their inbound state through.
        assert_eq!(depth(third), 1);
    }

    #[test]
    fn test_full_mode_tokenizes_everything() {
        let mut s = scheduler();
        s.render(&["a", "b"], LineWindow::new(0, 0), RenderMode::Partial);
        let out = s.render(&["a", "b"], LineWindow::new(0, 0), RenderMode::Full);

        assert_eq!(out.stats.placeholders, 0);
        assert_eq!(out.stats.reused, 0);
        assert_eq!(s.dirty_count(), 0);
    }

    #[test]
    fn test_partial_render_keeps_moved_lines() {
        let mut s = scheduler();
        s.render(&["a", "b", "c"], LineWindow::everything(), RenderMode::Partial);
        let before: Vec<LineId> = s.lines().iter().map(Line::id).collect();

        let out = s.render(&["a", "x", "b", "c"], LineWindow::everything(), RenderMode::Partial);
        let after: Vec<LineId> = s.lines().iter().map(Line::id).collect();

        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[1]);
        assert_eq!(after[3], before[2]);
        assert_eq!(out.stats.reused, 3);
        assert_eq!(out.stats.tokenized, 1);
        assert_eq!(out.diff.added, 1);
    }

    #[test]
    fn test_state_change_marks_following_lines() {
        let mut s = scheduler();
        s.render(&["a", "b", "c"], LineWindow::new(0, 0), RenderMode::Full);

        // Opening a brace on line 0 changes the inbound state of every following line.
        let out = s.render(&["{", "b", "c"], LineWindow::new(0, 1), RenderMode::Partial);

        // Line 1 is visible: re-tokenized with the new state.
        assert_eq!(out.stats.render_dirty, 1);
        assert_eq!(depth(&s.lines()[1]), 1);
        assert!(!s.lines()[1].is_dirty());
        // Line 2 is off screen: kept, but flagged.
        assert!(s.lines()[2].is_dirty());
        assert_eq!(out.stats.marked_stale, 2);
    }

    #[test]
    fn test_force_visible_and_dirty_refreshes_window() {
        let mut s = scheduler();
        let texts = ["{", "a", "b", "c", "d"];
        s.render(&texts, LineWindow::new(0, 1), RenderMode::Partial);
        assert_eq!(s.dirty_count(), 3);

        let out = s.render(&texts, LineWindow::new(0, 3), RenderMode::ForceVisibleAndDirty);
        assert_eq!(out.stats.render_dirty, 2);
        // Clean visible lines are rebuilt from the cache.
        assert_eq!(out.stats.cache_hits, 2);
        assert_eq!(s.dirty_count(), 1);
        assert!(s.lines()[4].is_dirty());

        let patches = PatchStats::from_patches(&out.patches);
        assert_eq!(patches.replace, 4);
        assert_eq!(patches.keep, 1);
    }

    #[test]
    fn test_force_visible_retokenizes_clean_visible_lines() {
        let mut s = scheduler();
        let texts = ["a", "b", "c"];
        s.render(&texts, LineWindow::everything(), RenderMode::Partial);

        let out = s.render(&texts, LineWindow::new(1, 1), RenderMode::ForceVisible);
        assert_eq!(out.stats.reused, 2);
        assert_eq!(out.stats.cache_hits, 1);
        assert_eq!(PatchStats::from_patches(&out.patches).replace, 1);
    }

    #[test]
    fn test_identical_rerender_is_noop() {
        let mut s = scheduler();
        s.render(&["a", "{", "}"], LineWindow::everything(), RenderMode::Partial);
        let out = s.render(&["a", "{", "}"], LineWindow::everything(), RenderMode::Partial);

        assert!(out.is_noop());
        assert_eq!(out.stats.reused, 3);
    }

    #[test]
    fn test_patches_reproduce_current_lines() {
        let mut s = scheduler();
        let mut surface: Vec<String> = Vec::new();
        let edits: [&[&str]; 4] = [
            &["a", "b", "c", "d"],
            &["a", "c", "d", "e"],
            &["x", "a", "c", "d", "e"],
            &["x"],
        ];

        for texts in edits {
            let out = s.render(texts, LineWindow::everything(), RenderMode::Partial);
            apply_patches(&mut surface, &out.patches, |line| line.text().to_string());
            assert_eq!(surface, texts);
        }
    }

    #[test]
    fn test_cache_serves_repeated_lines() {
        let mut s = scheduler();
        let out = s.render(&["same", "same", "same"], LineWindow::everything(), RenderMode::Full);

        assert_eq!(out.stats.tokenized, 1);
        assert_eq!(out.stats.cache_hits, 2);
        let ids: Vec<LineId> = s.lines().iter().map(Line::id).collect();
        assert_ne!(ids[0], ids[1]);
        assert!(Arc::ptr_eq(&s.lines()[0].shared_tokens(), &s.lines()[1].shared_tokens()));
    }

    #[test]
    fn test_mode_merge() {
        use RenderMode::*;
        assert_eq!(Partial.merge(ForceVisible), ForceVisible);
        assert_eq!(ForceVisible.merge(ForceVisibleAndDirty), ForceVisibleAndDirty);
        assert_eq!(ForceVisibleAndDirty.merge(ForceVisible), ForceVisibleAndDirty);
        assert_eq!(Partial.merge(Full), Full);
        assert_eq!(Full.merge(Partial), Full);
    }

    #[test]
    fn test_window_around_saturates() {
        let window = LineWindow::around(2, 5, 10);
        assert_eq!(window, LineWindow { first: 0, last: 15 });
        assert!(window.is_below(16));
        assert!(!LineWindow::everything().is_below(usize::MAX));
        assert!(LineWindow::new(3, 4).is_above(2));
        assert!(!window.is_above(0));
    }

    #[test]
    fn test_dirty_lines_above_window_are_refreshed() {
        let mut s = scheduler();
        let texts = ["a", "b", "c", "d", "e", "f"];
        s.render(&texts, LineWindow::new(0, 0), RenderMode::Partial);
        assert_eq!(s.dirty_count(), 5);

        // Open a brace on the first line, then scroll to the bottom.
        let texts = ["{", "b", "c", "d", "e", "f"];
        s.render(&texts, LineWindow::new(0, 0), RenderMode::Partial);
        let out = s.render(&texts, LineWindow::new(4, 5), RenderMode::Partial);

        // The placeholders above the window feed the window, so they are tokenized too.
        assert_eq!(out.stats.render_dirty, 5);
        assert_eq!(s.dirty_count(), 0);
        assert_eq!(depth(&s.lines()[5]), 1);
    }
}
