//! Render and construction error types.

use treemark_doc::NodeKind;
use treemark_theme::ThemeError;

/// Failure of a single render call.
///
/// All variants abort the call; no partial output is returned. Silently
/// dropping content would be a worse failure than aborting.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A node's type has no entry in the active handler table.
    #[error("no handler registered for node type `{0}`")]
    UnknownNodeType(NodeKind),

    /// A handler needed ancestor context that no pre-visit hook provided,
    /// e.g. a table cell rendered outside a table.
    #[error("missing required context for `{kind}` node: {detail}")]
    MissingContext {
        /// The node whose handler failed.
        kind: NodeKind,
        /// What was missing.
        detail: &'static str,
    },

    /// A handler was invoked on a node whose payload does not match the
    /// type it was registered for.
    #[error("handler for `{expected}` invoked on `{found}` node")]
    HandlerMismatch {
        expected: NodeKind,
        found: NodeKind,
    },

    /// Palette or theme lookup failed while rendering.
    #[error("theme lookup failed")]
    Theme(#[from] ThemeError),

    /// The injected syntax highlighter failed; the error propagates
    /// unchanged.
    #[error("syntax highlighting failed")]
    Highlight(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RenderError {
    pub(crate) fn missing_context(kind: NodeKind, detail: &'static str) -> Self {
        Self::MissingContext { kind, detail }
    }

    pub(crate) fn mismatch(expected: NodeKind, found: NodeKind) -> Self {
        Self::HandlerMismatch { expected, found }
    }
}

/// Failure at renderer construction, before any render call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The supplied theme failed validation.
    #[error("invalid theme")]
    Theme(#[from] ThemeError),
}
