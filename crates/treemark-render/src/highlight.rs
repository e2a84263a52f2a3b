//! Syntax-highlighting capability.

/// Highlighter injected into the HTML renderer for fenced code blocks.
///
/// Only consulted when a code block declares a language; blocks without one
/// bypass highlighting entirely. The returned markup is inserted verbatim
/// into the output, so implementations are responsible for escaping.
pub trait Highlight {
    /// Mark up `source` for the given language.
    fn highlight(
        &self,
        source: &str,
        language: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}
