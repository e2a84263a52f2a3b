//! Recursive tree walk driving per-node dispatch.

use treemark_doc::{Node, NodeKind};

use crate::stack::Frame;
use crate::table::{FallbackOrder, GroupSpec, RenderFn};
use crate::{Backend, HandlerTable, RenderError, VisitStack};

/// Drives one render call over a [`HandlerTable`].
///
/// For each node: resolve the handler, run the pre-visit hook with a fresh
/// frame, push the frame, render the children (regrouped when the parent
/// declares a grouping descriptor), invoke the main handler with the
/// concatenated children string, pop the frame. The walk is a synchronous
/// recursive descent; the stack never outlives the call.
pub struct Walker<'t, B: Backend> {
    table: &'t HandlerTable<B>,
}

impl<'t, B: Backend> Walker<'t, B> {
    pub fn new(table: &'t HandlerTable<B>) -> Self {
        Self { table }
    }

    /// Render a tree rooted at `root` to a single string.
    ///
    /// Any handler failure aborts the whole call; no partial output is
    /// returned.
    pub fn render(&self, backend: &mut B, root: &Node) -> Result<String, RenderError> {
        let mut stack = VisitStack::new();
        self.render_node(backend, root, &mut stack)
    }

    fn render_node<'a>(
        &self,
        backend: &mut B,
        node: &'a Node,
        stack: &mut VisitStack<'a, B>,
    ) -> Result<String, RenderError> {
        let kind = node.kind();
        let handler = self
            .table
            .handler(kind)
            .ok_or(RenderError::UnknownNodeType(kind))?;

        let mut state = B::Frame::default();
        if let Some(pre_visit) = handler.pre_visit() {
            pre_visit(backend, node.data(), &mut state, stack)?;
        }
        stack.push(Frame::new(node.data(), state));

        let children = match self.table.group(kind) {
            Some(spec) => self.render_grouped(backend, node, spec, stack),
            None => self.render_all(backend, node.children(), stack),
        };
        let result = match children {
            Ok(children) => (handler.render())(backend, node.data(), &children, stack),
            Err(err) => Err(err),
        };

        stack.pop();
        result
    }

    fn render_all<'a, I>(
        &self,
        backend: &mut B,
        children: I,
        stack: &mut VisitStack<'a, B>,
    ) -> Result<String, RenderError>
    where
        I: IntoIterator<Item = &'a Node>,
    {
        let mut out = String::new();
        for child in children {
            out.push_str(&self.render_node(backend, child, stack)?);
        }
        Ok(out)
    }

    /// Bucket the children by kind, serialize buckets in weight order.
    ///
    /// Stable: within a bucket the original relative order survives.
    /// Children with no declared bucket form a single fallback bucket
    /// placed per the descriptor's [`FallbackOrder`]; they are rendered,
    /// never dropped.
    fn render_grouped<'a>(
        &self,
        backend: &mut B,
        node: &'a Node,
        spec: &GroupSpec<B>,
        stack: &mut VisitStack<'a, B>,
    ) -> Result<String, RenderError> {
        struct Run<'a, B: Backend> {
            weight: u64,
            wrap: Option<RenderFn<B>>,
            children: Vec<&'a Node>,
        }

        let mut runs: Vec<Run<'a, B>> = spec
            .buckets()
            .iter()
            .map(|bucket| Run {
                // Shifted by one so a leading fallback sorts before weight 0.
                weight: u64::from(bucket.order) + 1,
                wrap: bucket.wrap,
                children: Vec::new(),
            })
            .collect();
        let fallback = runs.len();
        runs.push(Run {
            weight: match spec.fallback() {
                FallbackOrder::Trailing => u64::MAX,
                FallbackOrder::Leading => 0,
            },
            wrap: None,
            children: Vec::new(),
        });

        let mut unclassified: Vec<NodeKind> = Vec::new();
        for child in node.children() {
            match spec.position(child.kind()) {
                Some(i) => runs[i].children.push(child),
                None => {
                    if !unclassified.contains(&child.kind()) {
                        unclassified.push(child.kind());
                    }
                    runs[fallback].children.push(child);
                }
            }
        }
        if !unclassified.is_empty() {
            let kinds: Vec<&str> = unclassified.iter().map(|kind| kind.name()).collect();
            tracing::warn!(
                parent = %node.kind(),
                ?kinds,
                "children outside the grouping descriptor render in the fallback bucket"
            );
        }

        runs.sort_by_key(|run| run.weight);

        let mut out = String::new();
        for run in runs {
            if run.children.is_empty() {
                continue;
            }
            let rendered = self.render_all(backend, run.children, stack)?;
            match run.wrap {
                Some(wrap) => out.push_str(&wrap(backend, node.data(), &rendered, stack)?),
                None => out.push_str(&rendered),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treemark_doc::{
        DocumentData, HeaderData, Node, NodeData, TableCaptionData, TableData, TableRowData,
        TextData,
    };

    use crate::table::Handler;

    /// Minimal backend whose frames carry an accumulated marker string,
    /// mimicking cumulative-context propagation.
    struct Tape;

    #[derive(Default)]
    struct Marks {
        own: String,
        full: String,
    }

    impl Backend for Tape {
        type Frame = Marks;
    }

    fn text(
        _: &mut Tape,
        data: &NodeData,
        _: &str,
        stack: &VisitStack<'_, Tape>,
    ) -> Result<String, RenderError> {
        let NodeData::Text(TextData { text }) = data else {
            return Err(RenderError::mismatch(NodeKind::Text, data.kind()));
        };
        // Prefix with the parent's cumulative marker to prove context flows down.
        let prefix = stack
            .parent()
            .map(|frame| frame.state().full.clone())
            .unwrap_or_default();
        Ok(format!("{prefix}{text}"))
    }

    fn passthrough(
        _: &mut Tape,
        _: &NodeData,
        children: &str,
        _: &VisitStack<'_, Tape>,
    ) -> Result<String, RenderError> {
        Ok(children.to_owned())
    }

    fn header_pre(
        _: &mut Tape,
        data: &NodeData,
        frame: &mut Marks,
        ancestors: &VisitStack<'_, Tape>,
    ) -> Result<(), RenderError> {
        let NodeData::Header(HeaderData { level }) = data else {
            return Err(RenderError::mismatch(NodeKind::Header, data.kind()));
        };
        frame.own = format!("[h{level}]");
        let inherited = ancestors
            .top()
            .map(|parent| parent.state().full.clone())
            .unwrap_or_default();
        frame.full = format!("{inherited}{}", frame.own);
        Ok(())
    }

    fn wrap_head(
        _: &mut Tape,
        _: &NodeData,
        rows: &str,
        _: &VisitStack<'_, Tape>,
    ) -> Result<String, RenderError> {
        Ok(format!("<head>{rows}</head>"))
    }

    fn row(
        _: &mut Tape,
        _: &NodeData,
        children: &str,
        _: &VisitStack<'_, Tape>,
    ) -> Result<String, RenderError> {
        Ok(format!("({children})"))
    }

    fn base_table() -> HandlerTable<Tape> {
        let mut table = HandlerTable::new();
        table.insert(NodeKind::Document, Handler::new(passthrough));
        table.insert(NodeKind::Paragraph, Handler::new(passthrough));
        table.insert(NodeKind::Text, Handler::new(text));
        table.insert(
            NodeKind::Header,
            Handler::new(passthrough).with_pre_visit(header_pre),
        );
        table
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::with_children(NodeData::Document(DocumentData::default()), children)
    }

    #[test]
    fn test_unknown_node_type_is_fatal() {
        let table = base_table();
        let tree = doc(vec![Node::new(NodeData::ClearFloat)]);
        let err = Walker::new(&table).render(&mut Tape, &tree).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownNodeType(NodeKind::ClearFloat)
        ));
    }

    #[test]
    fn test_empty_children_render_as_empty_string() {
        let table = base_table();
        let tree = doc(vec![Node::new(NodeData::Paragraph)]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_pre_visit_state_reaches_descendants() {
        let table = base_table();
        let tree = doc(vec![Node::with_children(
            NodeData::Header(HeaderData { level: 2 }),
            vec![Node::text("Title")],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "[h2]Title");
    }

    #[test]
    fn test_cumulative_state_accumulates_across_depths() {
        let table = base_table();
        // Nested headers are not meaningful markup, but they exercise the
        // inherit-and-extend frame pattern across two levels.
        let tree = doc(vec![Node::with_children(
            NodeData::Header(HeaderData { level: 1 }),
            vec![Node::with_children(
                NodeData::Header(HeaderData { level: 2 }),
                vec![Node::text("deep")],
            )],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "[h1][h2]deep");
    }

    fn grouped_table() -> HandlerTable<Tape> {
        let mut table = base_table();
        table.insert(NodeKind::Table, Handler::new(passthrough));
        table.insert(NodeKind::TableCaption, Handler::new(row));
        table.insert(NodeKind::TableHeadRow, Handler::new(row));
        table.insert(NodeKind::TableRow, Handler::new(row));
        table.set_group(
            NodeKind::Table,
            GroupSpec::new()
                .bucket(NodeKind::TableCaption, 1)
                .bucket_wrapped(NodeKind::TableHeadRow, 2, wrap_head)
                .bucket(NodeKind::TableRow, 3),
        );
        table
    }

    fn caption(text: &str) -> Node {
        Node::with_children(
            NodeData::TableCaption(TableCaptionData::default()),
            vec![Node::text(text)],
        )
    }

    fn head_row(text: &str) -> Node {
        Node::with_children(
            NodeData::TableHeadRow(TableRowData::default()),
            vec![Node::text(text)],
        )
    }

    fn body_row(text: &str) -> Node {
        Node::with_children(
            NodeData::TableRow(TableRowData::default()),
            vec![Node::text(text)],
        )
    }

    #[test]
    fn test_grouping_reorders_interleaved_children_stably() {
        let table = grouped_table();
        // Author interleaved body rows, head rows and a trailing caption.
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData::default()),
            vec![
                body_row("b1"),
                head_row("h1"),
                body_row("b2"),
                head_row("h2"),
                caption("cap"),
            ],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "(cap)<head>(h1)(h2)</head>(b1)(b2)");
    }

    #[test]
    fn test_empty_bucket_emits_no_envelope() {
        let table = grouped_table();
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData::default()),
            vec![body_row("b1")],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "(b1)");
    }

    #[test]
    fn test_fallback_bucket_trails_classified_buckets() {
        let table = grouped_table();
        // A paragraph has no bucket in the table descriptor.
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData::default()),
            vec![
                Node::with_children(NodeData::Paragraph, vec![Node::text("stray")]),
                head_row("h1"),
                caption("cap"),
            ],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "(cap)<head>(h1)</head>stray");
    }

    #[test]
    fn test_fallback_bucket_can_lead() {
        let mut table = grouped_table();
        table.set_group(
            NodeKind::Table,
            GroupSpec::new()
                .bucket(NodeKind::TableCaption, 1)
                .bucket_wrapped(NodeKind::TableHeadRow, 2, wrap_head)
                .bucket(NodeKind::TableRow, 3)
                .with_fallback(FallbackOrder::Leading),
        );
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData::default()),
            vec![
                head_row("h1"),
                Node::with_children(NodeData::Paragraph, vec![Node::text("stray")]),
                caption("cap"),
            ],
        )]);
        let out = Walker::new(&table).render(&mut Tape, &tree).unwrap();
        assert_eq!(out, "stray(cap)<head>(h1)</head>");
    }

    #[test]
    fn test_handler_error_aborts_walk() {
        fn failing(
            _: &mut Tape,
            data: &NodeData,
            _: &str,
            _: &VisitStack<'_, Tape>,
        ) -> Result<String, RenderError> {
            Err(RenderError::missing_context(data.kind(), "test failure"))
        }

        let mut table = base_table();
        table.insert(NodeKind::Cite, Handler::new(failing));
        let tree = doc(vec![Node::text("ok"), Node::new(NodeData::Cite)]);
        let err = Walker::new(&table).render(&mut Tape, &tree).unwrap_err();
        assert!(matches!(err, RenderError::MissingContext { .. }));
    }
}
