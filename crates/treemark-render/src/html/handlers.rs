//! Per-node HTML templates.
//!
//! Each handler receives the node payload, the already-rendered children
//! and the visit stack (own frame on top). Escaping happens here at the
//! leaves; composition above never re-escapes.

use std::fmt::Write;

use treemark_doc::{Align, NodeData, NodeKind, Style, TableRowData};

use crate::{RenderError, VisitStack};

use super::HtmlBackend;
use super::css::ColorSet;
use super::escape::{escape_attr, escape_text};

type Stack<'s, 'a> = &'s VisitStack<'a, HtmlBackend>;

pub(super) fn document(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _stack: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Document(doc) = data else {
        return Err(RenderError::mismatch(NodeKind::Document, data.kind()));
    };

    let mut out = String::new();
    if backend.options.standalone {
        let scope = "body";
        let title = doc.title.as_deref().unwrap_or("Untitled document");

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        writeln!(out, "\t<title>{}</title>", escape_attr(title)).unwrap();
        out.push_str("\t<meta charset=\"UTF-8\" />\n");

        out.push_str("\t<style>\n");
        out.push_str(&backend.theme_color_css(scope));
        out.push_str(&backend.theme_size_css(scope));
        out.push_str(&backend.theme_font_css(scope));
        out.push_str(&backend.color_css(scope)?);
        out.push_str(&backend.options.css_bundle());
        out.push_str("\t</style>\n");

        out.push_str("</head>\n<body>\n");
    }

    out.push_str("<div class=\"treemark\">\n");
    out.push_str(children);
    out.push_str("\n</div>\n");

    if backend.options.standalone {
        out.push_str("</body>\n</html>\n");
    }
    Ok(out)
}

pub(super) fn paragraph(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<p>{children}</p>\n"))
}

pub(super) fn quote(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<blockquote>{children}</blockquote>\n"))
}

pub(super) fn header(
    _: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Header(header) = data else {
        return Err(RenderError::mismatch(NodeKind::Header, data.kind()));
    };
    let level = header.level.clamp(1, 6);
    Ok(format!("<h{level}>{children}</h{level}>\n"))
}

pub(super) fn cite(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<cite>{children}</cite>\n"))
}

pub(super) fn list(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<ul>\n{children}</ul>\n"))
}

pub(super) fn list_item(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<li>{children}</li>\n"))
}

pub(super) fn ordered_list(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<ol>\n{children}</ol>\n"))
}

pub(super) fn ordered_list_item(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<li>{children}</li>\n"))
}

pub(super) fn image_block(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::ImageBlock(image) = data else {
        return Err(RenderError::mismatch(NodeKind::ImageBlock, data.kind()));
    };

    let mut out = String::from("<figure");
    if let Some(float) = image.float {
        write!(out, " class=\"float float-{float}\"").unwrap();
    }
    out.push_str(">\n");

    write!(out, "<img src=\"{}\"", escape_attr(&image.href)).unwrap();
    if let Some(alt) = &image.alt_text {
        write!(out, " alt=\"{}\"", escape_attr(alt)).unwrap();
    }
    if let Some(title) = &image.title {
        write!(out, " title=\"{}\"", escape_attr(title)).unwrap();
    }
    out.push_str(" />\n");

    if let Some(caption) = &image.caption {
        writeln!(out, "<figcaption>{}</figcaption>", escape_text(caption)).unwrap();
    }
    out.push_str("</figure>\n");
    Ok(out)
}

pub(super) fn horizontal_rule(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::HorizontalRule(rule) = data else {
        return Err(RenderError::mismatch(NodeKind::HorizontalRule, data.kind()));
    };
    Ok(if rule.clear_float {
        "<hr class=\"clear-float\" />\n".to_owned()
    } else {
        "<hr />\n".to_owned()
    })
}

pub(super) fn clear_float(
    _: &mut HtmlBackend,
    _: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok("<div class=\"clear-float\"></div>\n".to_owned())
}

pub(super) fn code_block(
    backend: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::CodeBlock(code) = data else {
        return Err(RenderError::mismatch(NodeKind::CodeBlock, data.kind()));
    };

    let mut out = String::from("<pre>\n<code");
    if let Some(lang) = &code.lang {
        write!(out, " class=\"lang-{}\"", escape_attr(lang)).unwrap();
    }
    // No newline after the opening tag, it would show as a blank first line.
    out.push('>');

    match (&code.lang, backend.highlighter.as_deref()) {
        (Some(lang), Some(highlighter)) => {
            let marked = highlighter
                .highlight(&code.text, lang)
                .map_err(RenderError::Highlight)?;
            out.push_str(&marked);
        }
        _ => out.push_str(&escape_text(&code.text)),
    }

    out.push_str("</code>\n</pre>\n");
    Ok(out)
}

pub(super) fn table(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<table>\n{children}</table>\n"))
}

/// Envelope for the head-row bucket.
pub(super) fn head_section(
    _: &mut HtmlBackend,
    _: &NodeData,
    rows: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<thead>\n{rows}</thead>\n"))
}

/// Envelope for the body-row bucket.
pub(super) fn body_section(
    _: &mut HtmlBackend,
    _: &NodeData,
    rows: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    Ok(format!("<tbody>\n{rows}</tbody>\n"))
}

pub(super) fn table_caption(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::TableCaption(caption) = data else {
        return Err(RenderError::mismatch(NodeKind::TableCaption, data.kind()));
    };

    let mut classes = Vec::new();
    if let Some(style) = &caption.style {
        style_to_classes(&mut backend.colors, style, &mut classes);
    }

    let mut out = String::from("<caption");
    class_attr(&mut out, &classes);
    write!(out, ">{children}</caption>").unwrap();
    out.push('\n');
    Ok(out)
}

fn row_markup(backend: &mut HtmlBackend, row: &TableRowData, children: &str) -> String {
    let mut classes = Vec::new();
    if let Some(style) = &row.style {
        style_to_classes(&mut backend.colors, style, &mut classes);
    }
    if row.row_separator {
        push_class(&mut classes, "row-separator");
    }

    let mut out = String::from("<tr");
    class_attr(&mut out, &classes);
    write!(out, ">{children}</tr>").unwrap();
    out.push('\n');
    out
}

pub(super) fn table_row(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::TableRow(row) = data else {
        return Err(RenderError::mismatch(NodeKind::TableRow, data.kind()));
    };
    Ok(row_markup(backend, row, children))
}

pub(super) fn table_head_row(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::TableHeadRow(row) = data else {
        return Err(RenderError::mismatch(NodeKind::TableHeadRow, data.kind()));
    };
    Ok(row_markup(backend, row, children))
}

pub(super) fn table_cell(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    stack: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::TableCell(cell) = data else {
        return Err(RenderError::mismatch(NodeKind::TableCell, data.kind()));
    };
    let table = stack.nearest(NodeKind::Table).ok_or_else(|| {
        RenderError::missing_context(NodeKind::TableCell, "no table ancestor on the visit stack")
    })?;
    let NodeData::Table(table_data) = table.data() else {
        return Err(RenderError::mismatch(NodeKind::Table, table.kind()));
    };
    // Column index past the declared columns is the documented safe
    // default: no alignment class, no error.
    let column = table_data.columns.get(cell.column);

    let mut classes = Vec::new();
    match column.and_then(|c| c.align) {
        Some(Align::Right) => push_class(&mut classes, "align-right"),
        Some(Align::Left) => push_class(&mut classes, "align-left"),
        Some(Align::Center) => push_class(&mut classes, "align-center"),
        Some(Align::Justify) => push_class(&mut classes, "align-justify"),
        None => {}
    }
    if column.is_some_and(|c| c.column_separator) || cell.column_separator {
        push_class(&mut classes, "column-separator");
    }

    let style = match (column.and_then(|c| c.style.as_ref()), cell.style.as_ref()) {
        (Some(column_style), Some(cell_style)) => Some(column_style.merge(cell_style)),
        (Some(column_style), None) => Some(column_style.clone()),
        (None, Some(cell_style)) => Some(cell_style.clone()),
        (None, None) => None,
    };
    if let Some(style) = &style {
        style_to_classes(&mut backend.colors, style, &mut classes);
    }

    let mut out = String::from("<td");
    class_attr(&mut out, &classes);
    if let Some(span) = cell.column_span {
        write!(out, " colspan=\"{span}\"").unwrap();
    }
    if let Some(span) = cell.row_span {
        write!(out, " rowspan=\"{span}\"").unwrap();
    }
    write!(out, ">{children}</td>").unwrap();
    out.push('\n');
    Ok(out)
}

pub(super) fn table_head_cell(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    stack: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::TableHeadCell(cell) = data else {
        return Err(RenderError::mismatch(NodeKind::TableHeadCell, data.kind()));
    };
    let table = stack.nearest(NodeKind::Table).ok_or_else(|| {
        RenderError::missing_context(
            NodeKind::TableHeadCell,
            "no table ancestor on the visit stack",
        )
    })?;
    let NodeData::Table(table_data) = table.data() else {
        return Err(RenderError::mismatch(NodeKind::Table, table.kind()));
    };
    let column = table_data.columns.get(cell.column);

    let mut classes = Vec::new();
    if column.is_some_and(|c| c.column_separator) || cell.column_separator {
        push_class(&mut classes, "column-separator");
    }
    if let Some(style) = &cell.style {
        style_to_classes(&mut backend.colors, style, &mut classes);
    }

    let mut out = String::from("<th");
    class_attr(&mut out, &classes);
    if let Some(span) = cell.column_span {
        write!(out, " colspan=\"{span}\"").unwrap();
    }
    if let Some(span) = cell.row_span {
        write!(out, " rowspan=\"{span}\"").unwrap();
    }
    if cell.is_row_head && !cell.is_column_head {
        out.push_str(" scope=\"row\"");
    } else if cell.is_column_head && !cell.is_row_head {
        out.push_str(" scope=\"column\"");
    }
    write!(out, ">{children}</th>").unwrap();
    out.push('\n');
    Ok(out)
}

pub(super) fn text(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Text(text) = data else {
        return Err(RenderError::mismatch(NodeKind::Text, data.kind()));
    };
    Ok(escape_text(&text.text))
}

pub(super) fn emphasis_text(
    _: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::EmphasisText(emphasis) = data else {
        return Err(RenderError::mismatch(NodeKind::EmphasisText, data.kind()));
    };
    Ok(match emphasis.level {
        2 => format!("<strong>{children}</strong>"),
        level if level >= 3 => format!("<strong><em>{children}</em></strong>"),
        _ => format!("<em>{children}</em>"),
    })
}

pub(super) fn decorated_text(
    _: &mut HtmlBackend,
    _: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    // Decoration levels beyond 1 have no dedicated rendering yet.
    Ok(format!("<span class=\"underline\">{children}</span>"))
}

pub(super) fn code(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Code(code) = data else {
        return Err(RenderError::mismatch(NodeKind::Code, data.kind()));
    };
    Ok(format!("<code>{}</code>", escape_text(&code.text)))
}

pub(super) fn link(
    _: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Link(link) = data else {
        return Err(RenderError::mismatch(NodeKind::Link, data.kind()));
    };
    let mut out = String::new();
    write!(out, "<a href=\"{}\"", escape_attr(&link.href)).unwrap();
    if let Some(title) = &link.title {
        write!(out, " title=\"{}\"", escape_attr(title)).unwrap();
    }
    write!(out, ">{children}</a>").unwrap();
    Ok(out)
}

pub(super) fn styled_text(
    backend: &mut HtmlBackend,
    data: &NodeData,
    children: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::StyledText(styled) = data else {
        return Err(RenderError::mismatch(NodeKind::StyledText, data.kind()));
    };

    let mut classes = Vec::new();
    if styled.title.is_some() {
        push_class(&mut classes, "title-tooltip");
    }
    style_to_classes(&mut backend.colors, &styled.style, &mut classes);

    let mut out = String::from("<span");
    class_attr(&mut out, &classes);
    if let Some(title) = &styled.title {
        write!(out, " title=\"{}\"", escape_attr(title)).unwrap();
    }
    write!(out, ">{children}</span>").unwrap();
    Ok(out)
}

pub(super) fn image(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Image(image) = data else {
        return Err(RenderError::mismatch(NodeKind::Image, data.kind()));
    };
    let mut out = String::new();
    write!(out, "<img src=\"{}\"", escape_attr(&image.href)).unwrap();
    if let Some(alt) = &image.alt_text {
        write!(out, " alt=\"{}\"", escape_attr(alt)).unwrap();
    }
    if let Some(title) = &image.title {
        write!(out, " title=\"{}\"", escape_attr(title)).unwrap();
    }
    out.push_str(" />");
    Ok(out)
}

pub(super) fn pictogram(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Pictogram(pictogram) = data else {
        return Err(RenderError::mismatch(NodeKind::Pictogram, data.kind()));
    };
    let Some(emoji) = &pictogram.emoji else {
        return Ok(String::new());
    };

    let mut out = String::from("<span class=\"pictogram-emoji\"");
    if let Some(title) = pictogram.title.as_ref().or(pictogram.alt_text.as_ref()) {
        write!(out, " title=\"{}\"", escape_attr(title)).unwrap();
    }
    write!(out, ">{}</span>", escape_text(emoji)).unwrap();
    Ok(out)
}

pub(super) fn anchor(
    _: &mut HtmlBackend,
    data: &NodeData,
    _: &str,
    _: Stack<'_, '_>,
) -> Result<String, RenderError> {
    let NodeData::Anchor(anchor) = data else {
        return Err(RenderError::mismatch(NodeKind::Anchor, data.kind()));
    };
    Ok(format!("<a name=\"{}\"></a>\n", escape_attr(&anchor.name)))
}

/// Map inline style attributes to CSS classes, registering referenced
/// colors in the discovered-color registry.
pub(super) fn style_to_classes(colors: &mut ColorSet, style: &Style, classes: &mut Vec<String>) {
    if style.bold {
        push_class(classes, "bold");
    }
    if style.italic {
        push_class(classes, "italic");
    }
    if style.underline {
        push_class(classes, "underline");
    }
    if let Some(color) = &style.text_color {
        push_class(classes, "text-styled");
        push_class(classes, &format!("text-{}", color.cname()));
        colors.register(color);
    }
    if let Some(color) = &style.background_color {
        push_class(classes, "bg-styled");
        push_class(classes, &format!("bg-{}", color.cname()));
        colors.register(color);
    }
}

fn push_class(classes: &mut Vec<String>, class: &str) {
    if !classes.iter().any(|existing| existing == class) {
        classes.push(class.to_owned());
    }
}

fn class_attr(out: &mut String, classes: &[String]) {
    if !classes.is_empty() {
        write!(out, " class=\"{}\"", classes.join(" ")).unwrap();
    }
}
