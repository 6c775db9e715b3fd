//! Rendered lines and the patch script handed to a display surface.

use crate::diff::LineDiff;
use crate::state::LexerState;
use crate::token::Token;
use serde::Serialize;
use std::sync::Arc;

/// Identity of a rendered line.
///
/// Every newly produced line gets a fresh id, including lines served from the cache and lines
/// re-tokenized in place; a line reused as-is keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineId(pub u64);

/// One line of the document together with its tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub(crate) id: LineId,
    pub(crate) text: String,
    pub(crate) inbound_fingerprint: u64,
    pub(crate) tokens: Arc<[Token]>,
    pub(crate) outbound_state: LexerState,
    pub(crate) dirty: bool,
}

impl Line {
    /// Line identity.
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Line text (without the newline).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fingerprint of the state the tokens were computed from.
    pub fn inbound_fingerprint(&self) -> u64 {
        self.inbound_fingerprint
    }

    /// Tokens covering the whole line.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Shared handle to the token list.
    pub fn shared_tokens(&self) -> Arc<[Token]> {
        self.tokens.clone()
    }

    /// State handed to the next line.
    pub fn outbound_state(&self) -> &LexerState {
        &self.outbound_state
    }

    /// Returns `true` if the tokens are stale or a placeholder.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the line for re-tokenization.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Operation of a [`LinePatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// The line at `index` is unchanged.
    Keep,
    /// Insert a line at `index`.
    Insert(Line),
    /// Remove the line at `index`.
    Remove,
    /// Replace the line at `index`.
    Replace(Line),
}

/// A single step of a line patch script.
///
/// Steps are applied in order; `index` is the position in the surface's line list at the time
/// the step is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePatch {
    /// Target position.
    pub index: usize,
    /// Operation.
    pub op: PatchOp,
}

impl LinePatch {
    /// Returns `true` for [`PatchOp::Keep`] steps.
    pub fn is_keep(&self) -> bool {
        matches!(self.op, PatchOp::Keep)
    }
}

/// Per-operation counts of a patch script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Kept lines.
    pub keep: usize,
    /// Inserted lines.
    pub insert: usize,
    /// Removed lines.
    pub remove: usize,
    /// Replaced lines.
    pub replace: usize,
}

impl PatchStats {
    /// Count the operations of a patch script.
    pub fn from_patches(patches: &[LinePatch]) -> Self {
        let mut stats = Self::default();
        for patch in patches {
            match patch.op {
                PatchOp::Keep => stats.keep += 1,
                PatchOp::Insert(_) => stats.insert += 1,
                PatchOp::Remove => stats.remove += 1,
                PatchOp::Replace(_) => stats.replace += 1,
            }
        }
        stats
    }
}

/// Turn a diff between the previous and current line lists into a patch script.
///
/// `Same` steps whose line identity changed (re-tokenized with equal text) become replacements.
pub(crate) fn build_patches(
    previous: &[LineId],
    current: &[Line],
    entries: &[LineDiff],
) -> Vec<LinePatch> {
    let mut patches = Vec::with_capacity(entries.len());
    let mut p = 0;
    let mut c = 0;
    let mut index = 0;

    for entry in entries {
        let op = match entry {
            LineDiff::Same if previous[p] == current[c].id => PatchOp::Keep,
            LineDiff::Same | LineDiff::Modified => PatchOp::Replace(current[c].clone()),
            LineDiff::Added => PatchOp::Insert(current[c].clone()),
            LineDiff::Removed => PatchOp::Remove,
        };
        patches.push(LinePatch { index, op });

        if entry.consumes_previous() {
            p += 1;
        }
        if entry.consumes_current() {
            c += 1;
            index += 1;
        }
    }

    patches
}

/// Apply a patch script to a plain list, as a display surface would.
pub fn apply_patches<T>(
    target: &mut Vec<T>,
    patches: &[LinePatch],
    mut make: impl FnMut(&Line) -> T,
) {
    for patch in patches {
        match &patch.op {
            PatchOp::Keep => {}
            PatchOp::Insert(line) => target.insert(patch.index, make(line)),
            PatchOp::Remove => {
                target.remove(patch.index);
            }
            PatchOp::Replace(line) => target[patch.index] = make(line),
        }
    }
}
