//! Backend abstraction for tree-walking renderers.

/// State a renderer threads through the visit stack.
///
/// A backend owns whatever accumulates across a whole render call (theme,
/// options, discovered colors) and declares the per-ancestor transient
/// state the walker creates for every visited node.
pub trait Backend: Sized {
    /// Per-ancestor frame state.
    ///
    /// The walker creates one `Frame` (via `Default`) before a node's
    /// pre-visit hook runs and drops it after the node's main handler
    /// returns. Backends with no per-ancestor state use `()`.
    type Frame: Default;
}
