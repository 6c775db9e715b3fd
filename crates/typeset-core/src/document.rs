//! Rope-backed document text.
//!
//! Lines are separated by `\n` only; a trailing newline yields a final empty line, so a document
//! with N newlines has N + 1 lines. Offsets are in characters.

use crate::position::PositionVector;
use ropey::Rope;

/// Document text with O(log N) line access.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Returns `true` if the text equals `text`.
    pub fn has_text(&self, text: &str) -> bool {
        self.rope == text
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` for an empty document.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines (at least one).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of line `index` without its newline.
    pub fn line(&self, index: usize) -> Option<String> {
        if index >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(index).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Every line, without newlines.
    pub fn lines(&self) -> Vec<String> {
        self.rope
            .lines()
            .map(|slice| {
                let mut text = slice.to_string();
                if text.ends_with('\n') {
                    text.pop();
                }
                text
            })
            .collect()
    }

    /// Line containing character offset `index` (clamped to the document).
    pub fn line_of(&self, index: usize) -> usize {
        self.rope.char_to_line(index.min(self.rope.len_chars()))
    }

    /// Line/column of character offset `index` (clamped to the document).
    pub fn position(&self, index: usize) -> PositionVector {
        let index = index.min(self.rope.len_chars());
        let line = self.rope.char_to_line(index);
        PositionVector::new(line, index - self.rope.line_to_char(line))
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
