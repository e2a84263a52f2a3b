//! Per-renderer handler tables and grouping descriptors.
//!
//! A [`HandlerTable`] maps node kinds to handler functions and is built
//! once at renderer construction; lookups during the walk are plain map
//! hits, never runtime type inspection.

use std::collections::HashMap;

use treemark_doc::{NodeData, NodeKind};

use crate::{Backend, RenderError, VisitStack};

/// Main render function for one node kind.
///
/// Receives the node's payload, the concatenated rendered children (empty
/// string for leaves) and the visit stack including the node's own frame
/// on top. Returns the node's rendered string.
pub type RenderFn<B> =
    fn(&mut B, &NodeData, &str, &VisitStack<'_, B>) -> Result<String, RenderError>;

/// Pre-visit hook for one node kind.
///
/// Runs top-down before any child renders, with the node's own (freshly
/// defaulted) frame state and the stack of strict ancestors. This is the
/// only place a node can compute state its descendants will observe. It
/// produces no output.
pub type PreVisitFn<B> = fn(
    &mut B,
    &NodeData,
    &mut <B as Backend>::Frame,
    &VisitStack<'_, B>,
) -> Result<(), RenderError>;

/// Handler table entry: exactly one render function, at most one
/// pre-visit hook.
pub struct Handler<B: Backend> {
    render: RenderFn<B>,
    pre_visit: Option<PreVisitFn<B>>,
}

impl<B: Backend> Handler<B> {
    pub fn new(render: RenderFn<B>) -> Self {
        Self {
            render,
            pre_visit: None,
        }
    }

    #[must_use]
    pub fn with_pre_visit(mut self, pre_visit: PreVisitFn<B>) -> Self {
        self.pre_visit = Some(pre_visit);
        self
    }

    pub(crate) fn render(&self) -> RenderFn<B> {
        self.render
    }

    pub(crate) fn pre_visit(&self) -> Option<PreVisitFn<B>> {
        self.pre_visit
    }
}

/// Where children whose kind is absent from a grouping descriptor land.
///
/// The source contract only pins down the classified buckets; the
/// placement of unclassified children is policy, so it is explicit and
/// configurable rather than an implicit default. They are never dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackOrder {
    /// After every classified bucket.
    #[default]
    Trailing,
    /// Before every classified bucket.
    Leading,
}

pub(crate) struct BucketSpec<B: Backend> {
    pub(crate) kind: NodeKind,
    pub(crate) order: u32,
    pub(crate) wrap: Option<RenderFn<B>>,
}

/// Child grouping rules for one parent kind.
///
/// Children are partitioned into buckets by kind and serialized in bucket
/// weight order regardless of document order; within a bucket the original
/// relative order is preserved. A bucket may wrap its concatenated output
/// in an envelope (a table's head rows inside a head section).
pub struct GroupSpec<B: Backend> {
    buckets: Vec<BucketSpec<B>>,
    fallback: FallbackOrder,
}

impl<B: Backend> GroupSpec<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            fallback: FallbackOrder::default(),
        }
    }

    /// Declare a bucket for `kind` with the given serialization weight.
    #[must_use]
    pub fn bucket(mut self, kind: NodeKind, order: u32) -> Self {
        self.buckets.push(BucketSpec {
            kind,
            order,
            wrap: None,
        });
        self
    }

    /// Declare a bucket whose concatenated output is passed through `wrap`
    /// before joining the parent's children string.
    #[must_use]
    pub fn bucket_wrapped(mut self, kind: NodeKind, order: u32, wrap: RenderFn<B>) -> Self {
        self.buckets.push(BucketSpec {
            kind,
            order,
            wrap: Some(wrap),
        });
        self
    }

    /// Set the placement of children with no declared bucket.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackOrder) -> Self {
        self.fallback = fallback;
        self
    }

    pub(crate) fn buckets(&self) -> &[BucketSpec<B>] {
        &self.buckets
    }

    pub(crate) fn fallback(&self) -> FallbackOrder {
        self.fallback
    }

    pub(crate) fn position(&self, kind: NodeKind) -> Option<usize> {
        self.buckets.iter().position(|bucket| bucket.kind == kind)
    }
}

impl<B: Backend> Default for GroupSpec<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Node kind → handler mapping plus per-parent grouping descriptors.
pub struct HandlerTable<B: Backend> {
    handlers: HashMap<NodeKind, Handler<B>>,
    groups: HashMap<NodeKind, GroupSpec<B>>,
}

impl<B: Backend> HandlerTable<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Register the handler for a node kind, replacing any previous one.
    pub fn insert(&mut self, kind: NodeKind, handler: Handler<B>) {
        self.handlers.insert(kind, handler);
    }

    /// Attach a grouping descriptor to a parent kind.
    pub fn set_group(&mut self, kind: NodeKind, spec: GroupSpec<B>) {
        self.groups.insert(kind, spec);
    }

    pub fn handler(&self, kind: NodeKind) -> Option<&Handler<B>> {
        self.handlers.get(&kind)
    }

    pub fn group(&self, kind: NodeKind) -> Option<&GroupSpec<B>> {
        self.groups.get(&kind)
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

impl<B: Backend> Default for HandlerTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Backend for Plain {
        type Frame = ();
    }

    fn noop(
        _: &mut Plain,
        _: &NodeData,
        children: &str,
        _: &VisitStack<'_, Plain>,
    ) -> Result<String, RenderError> {
        Ok(children.to_owned())
    }

    #[test]
    fn test_registration_and_lookup() {
        let mut table: HandlerTable<Plain> = HandlerTable::new();
        assert!(!table.contains(NodeKind::Paragraph));

        table.insert(NodeKind::Paragraph, Handler::new(noop));
        assert!(table.contains(NodeKind::Paragraph));
        assert!(table.handler(NodeKind::Paragraph).is_some());
        assert!(table.handler(NodeKind::Quote).is_none());
    }

    #[test]
    fn test_group_spec_positions() {
        let spec: GroupSpec<Plain> = GroupSpec::new()
            .bucket(NodeKind::TableCaption, 1)
            .bucket(NodeKind::TableHeadRow, 2);

        assert_eq!(spec.position(NodeKind::TableCaption), Some(0));
        assert_eq!(spec.position(NodeKind::TableHeadRow), Some(1));
        assert_eq!(spec.position(NodeKind::TableRow), None);
        assert_eq!(spec.fallback(), FallbackOrder::Trailing);
    }
}
