//! Position model.
//!
//! Conversions between flat character offsets and zero-based `(line, column)` pairs.
//! Every conversion takes the text snapshot it applies to explicitly; there is no implicit
//! "current document".
//!
//! Offsets are counted in characters (Unicode scalar values) and lines are separated by `'\n'`
//! only, consistent with the rest of `typeset-core`.

use serde::{Deserialize, Serialize};

/// A zero-based `(line, column)` position.
///
/// `line()` / `column()` are the one-based projections intended for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PositionVector {
    /// Zero-based line index.
    pub line_index: usize,
    /// Zero-based column index (in characters).
    pub column_index: usize,
}

impl PositionVector {
    /// Create a position from zero-based line and column indices.
    pub fn new(line_index: usize, column_index: usize) -> Self {
        Self {
            line_index,
            column_index,
        }
    }

    /// One-based line number.
    pub fn line(&self) -> usize {
        self.line_index + 1
    }

    /// One-based column number.
    pub fn column(&self) -> usize {
        self.column_index + 1
    }

    /// Convert a character offset in `text` into a position.
    ///
    /// Offsets past the end of `text` are clamped to the end.
    pub fn from_index(text: &str, index: usize) -> Self {
        let mut line_index = 0;
        let mut column_index = 0;

        for ch in text.chars().take(index) {
            if ch == '\n' {
                line_index += 1;
                column_index = 0;
            } else {
                column_index += 1;
            }
        }

        Self {
            line_index,
            column_index,
        }
    }

    /// Convert this position back into a character offset in `text`.
    ///
    /// A column past the end of its line clamps to the end of that line; a line past the last
    /// line clamps to the last line.
    pub fn to_index(&self, text: &str) -> usize {
        let mut offset = 0;
        let mut lines = text.split('\n').enumerate().peekable();

        while let Some((line_index, line)) = lines.next() {
            let line_len = line.chars().count();

            if line_index == self.line_index || lines.peek().is_none() {
                return offset + self.column_index.min(line_len);
            }

            offset += line_len + 1;
        }

        offset
    }
}

/// A character-offset range in a document.
///
/// `start <= end` always holds for values built through [`Selection::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Selection {
    /// Create a selection, swapping the bounds if needed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A collapsed selection (caret) at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns `true` if the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Scroll metrics reported by a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// Vertical scroll offset of the line container.
    pub scroll_top: f32,
    /// Height of the visible area, in the same unit as `scroll_top`.
    pub height: f32,
    /// Height of one rendered line. `None` (or zero) before the first layout.
    pub line_height: Option<f32>,
}

impl Viewport {
    /// Create viewport metrics.
    pub fn new(scroll_top: f32, height: f32, line_height: f32) -> Self {
        Self {
            scroll_top,
            height,
            line_height: Some(line_height),
        }
    }

    /// Zero-based `(first, last)` visible line indices (both inclusive, not clamped to the
    /// document).
    ///
    /// Without a usable line height only the first line is considered visible.
    pub fn visible_line_range(&self) -> (usize, usize) {
        let Some(line_height) = self.line_height.filter(|h| h.is_finite() && *h > 0.0) else {
            return (0, 0);
        };

        let top = self.scroll_top.max(0.0);
        let first = (top / line_height).floor() as usize;
        let last = ((top + self.height.max(0.0)) / line_height).floor() as usize;
        (first, last.max(first))
    }

    /// The visible character range of `text` for these metrics.
    pub fn visible_character_range(&self, text: &str) -> Selection {
        let (first, last) = self.visible_line_range();
        Selection::new(
            PositionVector::new(first, 0).to_index(text),
            PositionVector::new(last, 0).to_index(text),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_counts_lines_and_columns() {
        let text = "ABC\nDEF\nGHI";

        assert_eq!(PositionVector::from_index(text, 0), PositionVector::new(0, 0));
        assert_eq!(PositionVector::from_index(text, 2), PositionVector::new(0, 2));
        assert_eq!(PositionVector::from_index(text, 3), PositionVector::new(0, 3));
        assert_eq!(PositionVector::from_index(text, 4), PositionVector::new(1, 0));
        assert_eq!(PositionVector::from_index(text, 11), PositionVector::new(2, 3));
    }

    #[test]
    fn test_from_index_clamps_past_end() {
        let text = "ab\nc";
        assert_eq!(PositionVector::from_index(text, 99), PositionVector::new(1, 1));
    }

    #[test]
    fn test_to_index_clamps() {
        let text = "ABC\nDE\nF";

        assert_eq!(PositionVector::new(1, 10).to_index(text), 6);
        assert_eq!(PositionVector::new(5, 0).to_index(text), 7);
        assert_eq!(PositionVector::new(5, 3).to_index(text), 8);
        assert_eq!(PositionVector::new(2, 1).to_index(text), 8);
    }

    #[test]
    fn test_round_trip_every_offset() {
        let text = "fn main() {\n\n    你好, 世界\n}\n";
        let len = text.chars().count();

        for index in 0..=len {
            let position = PositionVector::from_index(text, index);
            assert_eq!(position.to_index(text), index, "offset {index}");
        }
    }

    #[test]
    fn test_round_trip_empty_text() {
        assert_eq!(PositionVector::from_index("", 0), PositionVector::default());
        assert_eq!(PositionVector::default().to_index(""), 0);
    }

    #[test]
    fn test_one_based_projection() {
        let position = PositionVector::new(0, 4);
        assert_eq!(position.line(), 1);
        assert_eq!(position.column(), 5);
    }

    #[test]
    fn test_selection_normalizes() {
        let selection = Selection::new(7, 3);
        assert_eq!(selection, Selection { start: 3, end: 7 });
        assert_eq!(selection.len(), 4);
        assert!(Selection::caret(2).is_empty());
    }

    #[test]
    fn test_viewport_without_line_height_covers_first_line() {
        let text = "a\nb\nc";
        let viewport = Viewport {
            scroll_top: 120.0,
            height: 300.0,
            line_height: None,
        };

        assert_eq!(viewport.visible_line_range(), (0, 0));
        assert_eq!(viewport.visible_character_range(text), Selection::new(0, 0));

        let zero = Viewport::new(0.0, 300.0, 0.0);
        assert_eq!(zero.visible_line_range(), (0, 0));
    }

    #[test]
    fn test_viewport_visible_range() {
        let text = "l0\nl1\nl2\nl3\nl4\nl5";
        let viewport = Viewport::new(20.0, 30.0, 10.0);

        assert_eq!(viewport.visible_line_range(), (2, 5));
        assert_eq!(viewport.visible_character_range(text), Selection::new(6, 15));
    }
}
