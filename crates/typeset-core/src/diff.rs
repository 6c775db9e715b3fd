//! Line diff.
//!
//! A greedy, single forward pass over the previous and current line sequences with one cursor
//! each. It is not a minimal edit script; edits are usually local (one inserted, removed or
//! modified line), which this handles exactly, and the pass never backtracks.
//!
//! At each step:
//!
//! 1. previous exhausted: [`LineDiff::Added`];
//! 2. current exhausted: [`LineDiff::Removed`];
//! 3. heads equal: [`LineDiff::Same`];
//! 4. the previous head occurs later in the current sequence: [`LineDiff::Added`] until the
//!    current cursor reaches its nearest occurrence;
//! 5. the current head occurs later in the previous sequence: [`LineDiff::Removed`] until the
//!    previous cursor reaches its nearest occurrence;
//! 6. otherwise: [`LineDiff::Modified`].

use serde::Serialize;

/// Classification of one diff step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineDiff {
    /// Both heads are equal; consumes one line from each side.
    Same,
    /// A line only present in the current sequence.
    Added,
    /// A line only present in the previous sequence.
    Removed,
    /// The line was edited in place; consumes one line from each side.
    Modified,
}

impl LineDiff {
    /// Returns `true` if this step consumes a previous line.
    pub fn consumes_previous(self) -> bool {
        !matches!(self, Self::Added)
    }

    /// Returns `true` if this step consumes a current line.
    pub fn consumes_current(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// Per-kind counts of a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Unchanged lines.
    pub same: usize,
    /// Inserted lines.
    pub added: usize,
    /// Deleted lines.
    pub removed: usize,
    /// Edited lines.
    pub modified: usize,
}

impl DiffStats {
    /// Count the entries of a diff.
    pub fn from_entries(entries: &[LineDiff]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            match entry {
                LineDiff::Same => stats.same += 1,
                LineDiff::Added => stats.added += 1,
                LineDiff::Removed => stats.removed += 1,
                LineDiff::Modified => stats.modified += 1,
            }
        }
        stats
    }
}

/// Classify `previous` -> `current` line by line.
///
/// The entries are in document order; the number of entries consuming a previous (current)
/// line equals `previous.len()` (`current.len()`).
pub fn diff_lines<T: PartialEq>(previous: &[T], current: &[T]) -> Vec<LineDiff> {
    let mut entries = Vec::with_capacity(previous.len().max(current.len()));
    let mut p = 0;
    let mut c = 0;

    while p < previous.len() || c < current.len() {
        if p >= previous.len() {
            entries.push(LineDiff::Added);
            c += 1;
            continue;
        }
        if c >= current.len() {
            entries.push(LineDiff::Removed);
            p += 1;
            continue;
        }
        if previous[p] == current[c] {
            entries.push(LineDiff::Same);
            p += 1;
            c += 1;
            continue;
        }

        if let Some(found) = find_ahead(&current[c + 1..], &previous[p]) {
            // Lines were inserted before the previous head.
            entries.extend(std::iter::repeat_n(LineDiff::Added, found + 1));
            c += found + 1;
            continue;
        }

        if let Some(found) = find_ahead(&previous[p + 1..], &current[c]) {
            // Lines were deleted before the current head.
            entries.extend(std::iter::repeat_n(LineDiff::Removed, found + 1));
            p += found + 1;
            continue;
        }

        entries.push(LineDiff::Modified);
        p += 1;
        c += 1;
    }

    entries
}

fn find_ahead<T: PartialEq>(haystack: &[T], needle: &T) -> Option<usize> {
    haystack.iter().position(|item| item == needle)
}
