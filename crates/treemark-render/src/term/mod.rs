//! Linear control-code backend.
//!
//! This backend cannot express nesting with paired tags: every control
//! code is a flat instruction that stays active until countermanded. Each
//! frame therefore carries both the incremental markup the node itself
//! introduces and the cumulative markup active at its depth, so closing a
//! node can reset to neutral and re-assert exactly what its ancestors had
//! established. After any inline node closes, the active state matches
//! what was in force just before it opened, at any nesting depth.

pub mod markup;

use std::fmt::Write;

use treemark_doc::{Node, NodeData, NodeKind, Style};
use treemark_theme::Theme;

use crate::table::{GroupSpec, Handler};
use crate::{Backend, ConfigError, HandlerTable, RenderError, VisitStack, Walker};

use markup::{BOLD, DIM, ITALIC, RESET, UNDERLINE, escape_text};

/// Width of rules and table head separators.
const RULE_WIDTH: usize = 40;

/// Per-ancestor state for the linear backend.
#[derive(Debug, Default)]
pub struct TermFrame {
    /// Markup this node introduces.
    own: String,
    /// Cumulative markup at this depth: the concatenation of `own` for
    /// every frame from the root down to this one.
    full: String,
    /// Nesting depth of the innermost list ancestor.
    list_depth: usize,
}

/// Backend state for the linear control-code renderer.
pub struct TermBackend {
    theme: Theme,
}

impl Backend for TermBackend {
    type Frame = TermFrame;
}

impl TermBackend {
    /// Markup for an explicit inline style.
    ///
    /// Colors are resolved against the palette first so dangling
    /// references fail the render; palette colors with no control-code
    /// equivalent degrade to no markup. A background color renders as
    /// inverse video — the closest a linear stream gets.
    fn style_markup(&self, style: &Style) -> Result<String, RenderError> {
        let mut out = String::new();
        if style.bold {
            out.push_str(BOLD);
        }
        if style.italic {
            out.push_str(ITALIC);
        }
        if style.underline {
            out.push_str(UNDERLINE);
        }
        if let Some(color) = &style.text_color {
            self.theme.palette.resolve(color)?;
            if let Some(code) = markup::color_code(&color.cname()) {
                out.push_str(code);
            }
        }
        if let Some(color) = &style.background_color {
            self.theme.palette.resolve(color)?;
            out.push_str(markup::INVERSE);
        }
        Ok(out)
    }
}

// Frame plumbing.

/// Copy the parent's cumulative state, then extend it with `own`.
fn extend(frame: &mut TermFrame, ancestors: &VisitStack<'_, TermBackend>, own: &str) {
    if let Some(parent) = ancestors.top() {
        frame.full = parent.state().full.clone();
        frame.list_depth = parent.state().list_depth;
    }
    frame.own = own.to_owned();
    frame.full.push_str(own);
}

/// Pre-visit for every non-formatting kind; keeps the cumulative markup
/// invariant intact through intermediate nodes.
fn inherit(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, "");
    Ok(())
}

fn list_pre(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, "");
    frame.list_depth += 1;
    Ok(())
}

fn header_pre(
    _: &mut TermBackend,
    data: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    let NodeData::Header(header) = data else {
        return Err(RenderError::mismatch(NodeKind::Header, data.kind()));
    };
    let own = match header.level {
        1 => format!("{BOLD}{UNDERLINE}"),
        2 => BOLD.to_owned(),
        _ => UNDERLINE.to_owned(),
    };
    extend(frame, ancestors, &own);
    Ok(())
}

fn emphasis_pre(
    _: &mut TermBackend,
    data: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    let NodeData::EmphasisText(emphasis) = data else {
        return Err(RenderError::mismatch(NodeKind::EmphasisText, data.kind()));
    };
    let own = match emphasis.level {
        0 | 1 => ITALIC.to_owned(),
        2 => BOLD.to_owned(),
        _ => format!("{BOLD}{ITALIC}"),
    };
    extend(frame, ancestors, &own);
    Ok(())
}

fn decorated_pre(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, UNDERLINE);
    Ok(())
}

fn styled_pre(
    backend: &mut TermBackend,
    data: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    let NodeData::StyledText(styled) = data else {
        return Err(RenderError::mismatch(NodeKind::StyledText, data.kind()));
    };
    let own = backend.style_markup(&styled.style)?;
    extend(frame, ancestors, &own);
    Ok(())
}

fn cite_pre(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, ITALIC);
    Ok(())
}

fn caption_pre(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, ITALIC);
    Ok(())
}

fn head_row_pre(
    _: &mut TermBackend,
    _: &NodeData,
    frame: &mut TermFrame,
    ancestors: &VisitStack<'_, TermBackend>,
) -> Result<(), RenderError> {
    extend(frame, ancestors, BOLD);
    Ok(())
}

// Handler helpers.

fn parent_full<'s>(stack: &'s VisitStack<'_, TermBackend>) -> &'s str {
    stack
        .parent()
        .map(|frame| frame.state().full.as_str())
        .unwrap_or("")
}

fn list_depth(stack: &VisitStack<'_, TermBackend>) -> usize {
    stack
        .top()
        .map(|frame| frame.state().list_depth)
        .unwrap_or(0)
}

/// Own markup, content, reset, then the parent's cumulative markup.
///
/// This is the restoration step: resetting cancels everything, so the
/// enclosing state must be re-asserted immediately after.
fn wrap_markup(stack: &VisitStack<'_, TermBackend>, children: &str) -> String {
    let own = stack
        .top()
        .map(|frame| frame.state().own.as_str())
        .unwrap_or("");
    if own.is_empty() {
        return children.to_owned();
    }
    format!("{own}{children}{RESET}{}", parent_full(stack))
}

// Handlers.

fn document(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(children.to_owned())
}

fn paragraph(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{children}\n\n"))
}

fn header(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{}\n\n", wrap_markup(stack, children)))
}

fn cite(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{}\n\n", wrap_markup(stack, children)))
}

fn quote(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for line in children.trim_end_matches('\n').lines() {
        if line.is_empty() {
            out.push_str(">\n");
        } else {
            writeln!(out, "> {line}").unwrap();
        }
    }
    out.push('\n');
    Ok(out)
}

fn list(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    // Nested lists start on their own line under the parent item; only a
    // top-level list gets a trailing blank line.
    Ok(if list_depth(stack) == 1 {
        format!("{children}\n")
    } else {
        format!("\n{children}")
    })
}

fn list_item(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let indent = "  ".repeat(list_depth(stack).saturating_sub(1));
    Ok(format!("{indent}- {}\n", children.trim_end_matches('\n')))
}

fn ordered_list_item(
    _: &mut TermBackend,
    data: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::OrderedListItem(item) = data else {
        return Err(RenderError::mismatch(NodeKind::OrderedListItem, data.kind()));
    };
    let indent = "  ".repeat(list_depth(stack).saturating_sub(1));
    Ok(format!(
        "{indent}{}. {}\n",
        item.index,
        children.trim_end_matches('\n')
    ))
}

fn image_block(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::ImageBlock(image) = data else {
        return Err(RenderError::mismatch(NodeKind::ImageBlock, data.kind()));
    };
    let label = image
        .caption
        .as_deref()
        .or(image.alt_text.as_deref())
        .or(image.title.as_deref())
        .unwrap_or("image");
    Ok(format!(
        "[{}]({})\n\n",
        escape_text(label),
        escape_text(&image.href)
    ))
}

fn horizontal_rule(
    _: &mut TermBackend,
    _: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{}\n\n", "-".repeat(RULE_WIDTH)))
}

fn clear_float(
    _: &mut TermBackend,
    _: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    // No float model in linear output.
    Ok(String::new())
}

fn code_block(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::CodeBlock(code) = data else {
        return Err(RenderError::mismatch(NodeKind::CodeBlock, data.kind()));
    };
    let mut out = String::from(DIM);
    for line in code.text.lines() {
        writeln!(out, "    {}", escape_text(line)).unwrap();
    }
    out.push_str(RESET);
    out.push_str("\n\n");
    Ok(out)
}

fn table_node(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{children}\n"))
}

/// Head rows are followed by a separator line.
fn head_section(
    _: &mut TermBackend,
    _: &NodeData,
    rows: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{rows}{}\n", "-".repeat(RULE_WIDTH)))
}

fn table_caption(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{}\n", wrap_markup(stack, children)))
}

fn table_row(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{children}\n"))
}

fn table_head_row(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(format!("{}\n", wrap_markup(stack, children)))
}

fn cell_separator(column: usize) -> &'static str {
    if column > 0 { " | " } else { "" }
}

fn table_cell(
    _: &mut TermBackend,
    data: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::TableCell(cell) = data else {
        return Err(RenderError::mismatch(NodeKind::TableCell, data.kind()));
    };
    Ok(format!("{}{children}", cell_separator(cell.column)))
}

fn table_head_cell(
    _: &mut TermBackend,
    data: &NodeData,
    children: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::TableHeadCell(cell) = data else {
        return Err(RenderError::mismatch(NodeKind::TableHeadCell, data.kind()));
    };
    Ok(format!("{}{children}", cell_separator(cell.column)))
}

fn text(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::Text(text) = data else {
        return Err(RenderError::mismatch(NodeKind::Text, data.kind()));
    };
    Ok(escape_text(&text.text))
}

fn formatted_span(
    _: &mut TermBackend,
    _: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    Ok(wrap_markup(stack, children))
}

fn code(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::Code(code) = data else {
        return Err(RenderError::mismatch(NodeKind::Code, data.kind()));
    };
    Ok(format!(
        "{DIM}{}{RESET}{}",
        escape_text(&code.text),
        parent_full(stack)
    ))
}

fn link(
    _: &mut TermBackend,
    data: &NodeData,
    children: &str,
    stack: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::Link(link) = data else {
        return Err(RenderError::mismatch(NodeKind::Link, data.kind()));
    };
    Ok(format!(
        "{children} {DIM}<{}>{RESET}{}",
        escape_text(&link.href),
        parent_full(stack)
    ))
}

fn image(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::Image(image) = data else {
        return Err(RenderError::mismatch(NodeKind::Image, data.kind()));
    };
    let label = image.alt_text.as_deref().unwrap_or("image");
    Ok(format!(
        "[{}]({})",
        escape_text(label),
        escape_text(&image.href)
    ))
}

fn pictogram(
    _: &mut TermBackend,
    data: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    let NodeData::Pictogram(pictogram) = data else {
        return Err(RenderError::mismatch(NodeKind::Pictogram, data.kind()));
    };
    let visible = pictogram.emoji.as_deref().or(pictogram.alt_text.as_deref());
    Ok(visible.map(escape_text).unwrap_or_default())
}

fn anchor(
    _: &mut TermBackend,
    _: &NodeData,
    _: &str,
    _: &VisitStack<'_, TermBackend>,
) -> Result<String, RenderError> {
    // Anchors are invisible in linear output.
    Ok(String::new())
}

fn handler_table() -> HandlerTable<TermBackend> {
    let mut table = HandlerTable::new();
    table.insert(
        NodeKind::Document,
        Handler::new(document).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::Paragraph,
        Handler::new(paragraph).with_pre_visit(inherit),
    );
    table.insert(NodeKind::Quote, Handler::new(quote).with_pre_visit(inherit));
    table.insert(
        NodeKind::Header,
        Handler::new(header).with_pre_visit(header_pre),
    );
    table.insert(NodeKind::Cite, Handler::new(cite).with_pre_visit(cite_pre));
    table.insert(NodeKind::List, Handler::new(list).with_pre_visit(list_pre));
    table.insert(
        NodeKind::ListItem,
        Handler::new(list_item).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::OrderedList,
        Handler::new(list).with_pre_visit(list_pre),
    );
    table.insert(
        NodeKind::OrderedListItem,
        Handler::new(ordered_list_item).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::ImageBlock,
        Handler::new(image_block).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::HorizontalRule,
        Handler::new(horizontal_rule).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::ClearFloat,
        Handler::new(clear_float).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::CodeBlock,
        Handler::new(code_block).with_pre_visit(inherit),
    );
    table.insert(NodeKind::Table, Handler::new(table_node).with_pre_visit(inherit));
    table.insert(
        NodeKind::TableCaption,
        Handler::new(table_caption).with_pre_visit(caption_pre),
    );
    table.insert(
        NodeKind::TableRow,
        Handler::new(table_row).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::TableHeadRow,
        Handler::new(table_head_row).with_pre_visit(head_row_pre),
    );
    table.insert(
        NodeKind::TableCell,
        Handler::new(table_cell).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::TableHeadCell,
        Handler::new(table_head_cell).with_pre_visit(inherit),
    );
    table.insert(NodeKind::Text, Handler::new(text).with_pre_visit(inherit));
    table.insert(
        NodeKind::EmphasisText,
        Handler::new(formatted_span).with_pre_visit(emphasis_pre),
    );
    table.insert(
        NodeKind::DecoratedText,
        Handler::new(formatted_span).with_pre_visit(decorated_pre),
    );
    table.insert(NodeKind::Code, Handler::new(code).with_pre_visit(inherit));
    table.insert(NodeKind::Link, Handler::new(link).with_pre_visit(inherit));
    table.insert(
        NodeKind::StyledText,
        Handler::new(formatted_span).with_pre_visit(styled_pre),
    );
    table.insert(NodeKind::Image, Handler::new(image).with_pre_visit(inherit));
    table.insert(
        NodeKind::Pictogram,
        Handler::new(pictogram).with_pre_visit(inherit),
    );
    table.insert(
        NodeKind::Anchor,
        Handler::new(anchor).with_pre_visit(inherit),
    );

    table.set_group(
        NodeKind::Table,
        GroupSpec::new()
            .bucket(NodeKind::TableCaption, 1)
            .bucket_wrapped(NodeKind::TableHeadRow, 2, head_section)
            .bucket(NodeKind::TableRow, 3),
    );

    table
}

/// Linear control-code renderer.
pub struct TermRenderer {
    table: HandlerTable<TermBackend>,
    backend: TermBackend,
}

impl TermRenderer {
    /// Build a renderer over a validated theme.
    pub fn new(theme: Theme) -> Result<Self, ConfigError> {
        theme.validate()?;
        Ok(Self {
            table: handler_table(),
            backend: TermBackend { theme },
        })
    }

    /// Render a document tree to control-code markup.
    pub fn render(&mut self, root: &Node) -> Result<String, RenderError> {
        Walker::new(&self.table).render(&mut self.backend, root)
    }
}
