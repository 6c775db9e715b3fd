use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by [`Editor`](crate::Editor) operations.
pub enum EditorError {
    #[error("selection {start}..{end} is outside the document (length {len})")]
    /// A selection endpoint lies past the end of the document.
    InvalidSelection {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
        /// Document length in characters.
        len: usize,
    },

    #[error("editor has been torn down")]
    /// An event arrived after [`Editor::teardown`](crate::Editor::teardown).
    TornDown,

    #[error(transparent)]
    /// The editor configuration is invalid.
    Config(#[from] ConfigError),
}
