//! Visit stack: per-ancestor context threaded through the walk.
//!
//! Every node currently open on the walk owns one [`Frame`], pushed when
//! the node is entered and popped when its main handler returns. Frames
//! are strictly nested; siblings never observe each other's frames. The
//! stack lives for exactly one render call.

use treemark_doc::{NodeData, NodeKind};

use crate::Backend;

/// One open ancestor on the walk.
///
/// Holds the ancestor's node payload (so descendants can read attributes
/// like table column metadata without copying) plus the backend-defined
/// transient state its pre-visit hook produced.
pub struct Frame<'a, B: Backend> {
    kind: NodeKind,
    data: &'a NodeData,
    state: B::Frame,
}

impl<'a, B: Backend> Frame<'a, B> {
    pub(crate) fn new(data: &'a NodeData, state: B::Frame) -> Self {
        Self {
            kind: data.kind(),
            data,
            state,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn data(&self) -> &'a NodeData {
        self.data
    }

    pub fn state(&self) -> &B::Frame {
        &self.state
    }
}

/// Ordered ancestor frames, root first.
///
/// During a pre-visit hook the stack holds the node's strict ancestors;
/// during a main handler it additionally holds the node's own frame on
/// top. Push and pop stay walker-internal — handlers can only read.
pub struct VisitStack<'a, B: Backend> {
    frames: Vec<Frame<'a, B>>,
}

impl<'a, B: Backend> VisitStack<'a, B> {
    pub(crate) fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub(crate) fn push(&mut self, frame: Frame<'a, B>) {
        self.frames.push(frame);
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Topmost frame: the current node inside a main handler, the parent
    /// inside a pre-visit hook.
    pub fn top(&self) -> Option<&Frame<'a, B>> {
        self.frames.last()
    }

    /// Frame directly below the top.
    pub fn parent(&self) -> Option<&Frame<'a, B>> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    /// Closest frame of the given kind, searching top-down.
    pub fn nearest(&self, kind: NodeKind) -> Option<&Frame<'a, B>> {
        self.frames.iter().rev().find(|frame| frame.kind() == kind)
    }

    /// All frames, root first.
    pub fn frames(&self) -> &[Frame<'a, B>] {
        &self.frames
    }
}
