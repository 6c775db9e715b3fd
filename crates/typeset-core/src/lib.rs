#![warn(missing_docs)]
//! Typeset Core - Incremental Tokenization and Line Reconciliation Engine
//!
//! # Overview
//!
//! `typeset-core` turns the full text of a document into per-line token streams for syntax
//! highlighting, re-tokenizing only the lines whose text or carried-over lexer state changed.
//! It does not draw anything: a presentation layer implements [`DisplaySurface`] and receives a
//! line patch script (keep / insert / remove / replace) after every render pass.
//!
//! # Core Features
//!
//! - **Resumable Tokenizers**: each line is tokenized from the lexer state left by the previous line
//! - **Line Cache**: `(text, inbound state)` memoization with value comparison
//! - **Line Diff**: greedy kept / added / removed / modified classification
//! - **Lazy Rendering**: off-screen lines get placeholders until they scroll into view
//! - **Idle Sweep**: dirty visible lines are refreshed once input goes quiet
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor Controller (events, idle timer)     │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Render Scheduler (modes, lazy window)      │  ← Line Strategy
//! ├──────────────────────┬──────────────────────┤
//! │  Line Diff           │  Line Cache          │  ← Reconciliation
//! ├──────────────────────┴──────────────────────┤
//! │  Tokenizer Framework (scanner, registry)    │  ← Lexing
//! ├─────────────────────────────────────────────┤
//! │  Position Model / Document (rope)           │  ← Text
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use typeset_core::{
//!     DisplaySurface, Editor, EditorConfig, LinePatch, Selection, TokenizerRegistry, Viewport,
//! };
//!
//! #[derive(Default)]
//! struct Surface {
//!     text: String,
//!     lines: Vec<String>,
//! }
//!
//! impl DisplaySurface for Surface {
//!     fn text(&self) -> String {
//!         self.text.clone()
//!     }
//!     fn replace_text(&mut self, text: &str) {
//!         self.text = text.to_string();
//!     }
//!     fn selection(&self) -> Selection {
//!         Selection::caret(0)
//!     }
//!     fn set_selection(&mut self, _selection: Selection) {}
//!     fn viewport(&self) -> Viewport {
//!         Viewport::new(0.0, 400.0, 20.0)
//!     }
//!     fn patch_lines(&mut self, patches: &[LinePatch]) {
//!         typeset_core::apply_patches(&mut self.lines, patches, |line| line.text().to_string());
//!     }
//! }
//!
//! let registry = TokenizerRegistry::new();
//! let mut editor = Editor::new(&registry, EditorConfig::new("plaintext")).unwrap();
//! let mut surface = Surface::default();
//!
//! editor.attach(&mut surface).unwrap();
//! editor.set_code(&mut surface, "hello\nworld").unwrap();
//!
//! assert_eq!(surface.lines, vec!["hello", "world"]);
//! assert_eq!(editor.line_number_width(), 3);
//! ```
//!
//! # Module Description
//!
//! - [`position`] - Offsets, line/column positions, selections and viewport metrics
//! - [`token`] - Token kinds and tokens
//! - [`state`] - Type-erased lexer state
//! - [`tokenizer`] - Scanner, `Language` trait and plain-text fallback
//! - [`registry`] - Language identifier to tokenizer factory mapping
//! - [`cache`] - Line tokenization cache
//! - [`diff`] - Line diff
//! - [`line`] - Rendered lines and patch scripts
//! - [`scheduler`] - Render modes and the render pass
//! - [`editor`] - Editor controller and the display surface trait
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. Render statistics use the
//! `typeset::render` and `typeset::patch` targets at `debug` level; cache evictions use
//! `typeset::cache` at `trace` level.

pub mod cache;
pub mod config;
pub mod diff;
pub mod document;
pub mod editor;
mod error;
pub mod line;
pub mod position;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod timer;
pub mod token;
pub mod tokenizer;

pub use cache::{CacheStats, CachedLine, DEFAULT_CACHE_CAPACITY, LineCache};
pub use config::{ConfigError, DEFAULT_IDLE_DELAY, DEFAULT_LAZY_RENDER_PADDING, EditorConfig};
pub use diff::{DiffStats, LineDiff, diff_lines};
pub use document::Document;
pub use editor::{DisplaySurface, Editor};
pub use error::EditorError;
pub use line::{Line, LineId, LinePatch, PatchOp, PatchStats, apply_patches};
pub use position::{PositionVector, Selection, Viewport};
pub use registry::{TokenizerFactory, TokenizerRegistry};
pub use scheduler::{LineWindow, RenderMode, RenderOutcome, RenderScheduler, RenderStats};
pub use state::{LexerState, StateValue};
pub use timer::IdleTimer;
pub use token::{Token, TokenKind, concat_tokens};
pub use tokenizer::{Language, LineTokens, PlainText, Rule, Scanner, Tokenizer};
