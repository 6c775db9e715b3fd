//! Editor controller.
//!
//! [`Editor`] wires display-surface events to the render scheduler. It owns the document text,
//! the selection, the scheduler (and through it the line cache), the idle timer and the pending
//! render slot. The display surface is borrowed for the duration of each call.
//!
//! Everything is single-threaded and cooperative: the host calls [`Editor::text_changed`] and
//! [`Editor::scrolled`] from its input handlers, and [`Editor::poll_idle`] from its event loop
//! (any cadence works; the sweep runs once the idle delay has elapsed).

use crate::cache::CacheStats;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::EditorError;
use crate::line::{Line, LinePatch};
use crate::position::{PositionVector, Selection, Viewport};
use crate::registry::TokenizerRegistry;
use crate::scheduler::{LineWindow, RenderMode, RenderScheduler, RenderStats};
use crate::timer::IdleTimer;
use std::time::Instant;

/// The presentation layer an [`Editor`] drives.
pub trait DisplaySurface {
    /// Current raw text.
    fn text(&self) -> String;

    /// Replace the raw text.
    fn replace_text(&mut self, text: &str);

    /// Current primary selection.
    fn selection(&self) -> Selection;

    /// Move the primary selection.
    fn set_selection(&mut self, selection: Selection);

    /// Scroll metrics.
    fn viewport(&self) -> Viewport;

    /// Character range currently on screen.
    fn visible_character_range(&self) -> Selection {
        self.viewport().visible_character_range(&self.text())
    }

    /// Apply a line patch script to the rendered lines.
    fn patch_lines(&mut self, patches: &[LinePatch]);
}

/// Incremental highlighting controller for one document.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    document: Document,
    selection: Selection,
    scheduler: RenderScheduler,
    idle: IdleTimer,
    pending: Option<RenderMode>,
    last_render: Option<RenderStats>,
    torn_down: bool,
}

impl Editor {
    /// Create an editor for `config.language`, resolved once through `registry`.
    pub fn new(registry: &TokenizerRegistry, config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;

        let tokenizer = registry.resolve(&config.language);
        tracing::debug!(
            language = %config.language,
            tokenizer = tokenizer.language_id(),
            "editor created"
        );

        Ok(Self {
            scheduler: RenderScheduler::new(tokenizer, config.cache_capacity),
            idle: IdleTimer::new(config.idle_delay),
            config,
            document: Document::new(),
            selection: Selection::default(),
            pending: None,
            last_render: None,
            torn_down: false,
        })
    }

    /// Settings this editor was created with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Identifier of the tokenizer in use (`"plaintext"` for unknown languages).
    pub fn language_id(&self) -> &'static str {
        self.scheduler.tokenizer().language_id()
    }

    /// Load the surface's current text and render it.
    pub fn attach(&mut self, surface: &mut impl DisplaySurface) -> Result<(), EditorError> {
        self.ensure_live()?;
        self.sync_from(surface);
        self.request_render(RenderMode::Partial);
        self.flush(surface)
    }

    /// Replace the whole document.
    pub fn set_code(
        &mut self,
        surface: &mut impl DisplaySurface,
        code: &str,
    ) -> Result<(), EditorError> {
        self.ensure_live()?;
        surface.replace_text(code);
        self.document.set_text(code);
        self.selection = clamp_selection(surface.selection(), self.document.len_chars());
        self.request_render(RenderMode::Partial);
        self.flush(surface)
    }

    /// The surface's text changed (user input).
    ///
    /// Renders with [`RenderMode::Partial`]. If the lexer state after the cursor line changed,
    /// every line from the cursor on is flagged dirty and the visible lines are re-rendered.
    pub fn text_changed(
        &mut self,
        surface: &mut impl DisplaySurface,
        now: Instant,
    ) -> Result<(), EditorError> {
        self.ensure_live()?;

        self.sync_from(surface);
        let cursor_line = self.cursor_position().line_index;
        let before = self.outbound_fingerprint(cursor_line);

        self.request_render(RenderMode::Partial);
        self.flush(surface)?;

        if self.outbound_fingerprint(cursor_line) != before {
            tracing::trace!(cursor_line, "lexer state changed at cursor");
            self.scheduler.mark_dirty_from(cursor_line);
            self.request_render(RenderMode::ForceVisible);
            self.flush(surface)?;
        }

        self.idle.touch(now);
        Ok(())
    }

    /// The surface scrolled.
    pub fn scrolled(
        &mut self,
        surface: &mut impl DisplaySurface,
        now: Instant,
    ) -> Result<(), EditorError> {
        self.ensure_live()?;
        self.request_render(RenderMode::Partial);
        self.flush(surface)?;
        self.idle.touch(now);
        Ok(())
    }

    /// Run the idle sweep if the idle delay has passed since the last activity.
    ///
    /// Returns `true` if a [`RenderMode::ForceVisibleAndDirty`] pass ran. The sweep runs at most
    /// once per burst of activity.
    pub fn poll_idle(
        &mut self,
        surface: &mut impl DisplaySurface,
        now: Instant,
    ) -> Result<bool, EditorError> {
        self.ensure_live()?;
        if !self.idle.poll(now) {
            return Ok(false);
        }

        tracing::trace!("idle sweep");
        self.request_render(RenderMode::ForceVisibleAndDirty);
        self.flush(surface)?;
        Ok(true)
    }

    /// When the next idle sweep is due, if one is armed.
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle.deadline()
    }

    /// Queue a render pass. Requests made before the next [`Editor::flush`] coalesce into the
    /// strongest mode.
    pub fn request_render(&mut self, mode: RenderMode) {
        self.pending = Some(match self.pending {
            Some(pending) => pending.merge(mode),
            None => mode,
        });
    }

    /// Run the pending render pass, if any.
    pub fn flush(&mut self, surface: &mut impl DisplaySurface) -> Result<(), EditorError> {
        self.ensure_live()?;
        while let Some(mode) = self.pending.take() {
            self.render(surface, mode);
        }
        Ok(())
    }

    /// Stop the idle timer and reject further events.
    pub fn teardown(&mut self) {
        self.idle.cancel();
        self.pending = None;
        self.torn_down = true;
        tracing::debug!(language = self.language_id(), "editor torn down");
    }

    /// Returns `true` after [`Editor::teardown`].
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Current document text.
    pub fn code(&self) -> String {
        self.document.to_string()
    }

    /// Current rendered lines.
    pub fn lines(&self) -> &[Line] {
        self.scheduler.lines()
    }

    /// Number of dirty lines.
    pub fn dirty_count(&self) -> usize {
        self.scheduler.dirty_count()
    }

    /// Current primary selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Move the primary selection.
    pub fn set_selection(
        &mut self,
        surface: &mut impl DisplaySurface,
        selection: Selection,
    ) -> Result<(), EditorError> {
        self.ensure_live()?;

        let len = self.document.len_chars();
        if selection.start > len || selection.end > len {
            return Err(EditorError::InvalidSelection {
                start: selection.start,
                end: selection.end,
                len,
            });
        }

        let selection = Selection::new(selection.start, selection.end);
        surface.set_selection(selection);
        self.selection = selection;
        Ok(())
    }

    /// Line/column of character offset `index` (clamped to the document).
    pub fn position_vector(&self, index: usize) -> PositionVector {
        self.document.position(index)
    }

    /// Line/column of the selection start.
    pub fn cursor_position(&self) -> PositionVector {
        self.position_vector(self.selection.start)
    }

    /// Width of the line-number gutter in digits (at least 3).
    pub fn line_number_width(&self) -> usize {
        let count = self.document.line_count();
        (count.checked_ilog10().unwrap_or(0) as usize + 1).max(3)
    }

    /// Line cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.scheduler.cache_stats()
    }

    /// Counts of the most recent render pass.
    pub fn last_render(&self) -> Option<RenderStats> {
        self.last_render
    }

    fn ensure_live(&self) -> Result<(), EditorError> {
        if self.torn_down {
            return Err(EditorError::TornDown);
        }
        Ok(())
    }

    fn sync_from(&mut self, surface: &impl DisplaySurface) {
        let text = surface.text();
        if !self.document.has_text(&text) {
            self.document.set_text(&text);
        }
        self.selection = clamp_selection(surface.selection(), self.document.len_chars());
    }

    fn outbound_fingerprint(&self, line: usize) -> Option<u64> {
        self.scheduler
            .lines()
            .get(line)
            .map(|line| line.outbound_state().fingerprint())
    }

    fn render(&mut self, surface: &mut impl DisplaySurface, mode: RenderMode) {
        let range = surface.visible_character_range();
        let window = LineWindow::around(
            self.document.line_of(range.start),
            self.document.line_of(range.end),
            self.config.lazy_render_padding,
        );

        let texts = self.document.lines();
        let outcome = self.scheduler.render(&texts, window, mode);
        if !outcome.is_noop() {
            surface.patch_lines(&outcome.patches);
        }
        self.last_render = Some(outcome.stats);
    }
}

fn clamp_selection(selection: Selection, len: usize) -> Selection {
    Selection::new(selection.start.min(len), selection.end.min(len))
}
