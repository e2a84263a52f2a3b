//! Document tree nodes.
//!
//! A [`Node`] pairs a typed payload ([`NodeData`]) with an ordered child
//! sequence. Trees are built by an external producer and never mutated by
//! renderers; child order is document order unless a renderer's grouping
//! rules say otherwise for a specific parent type.
//!
//! Inline formatting nodes (emphasis, decoration, styled spans, links) are
//! containers: their visible text arrives as `text` children, so formatting
//! composes by nesting. Plain `text`, inline `code`, images, pictograms and
//! anchors are leaves carrying their payload in the node data.

use std::fmt;

use crate::style::{ColumnData, Style};

/// One element of the document tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    data: NodeData,
    #[cfg_attr(feature = "serde", serde(default))]
    children: Vec<Node>,
}

impl Node {
    /// Leaf node with no children.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    /// Container node with ordered children.
    pub fn with_children(data: NodeData, children: Vec<Node>) -> Self {
        Self { data, children }
    }

    /// Plain text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeData::Text(TextData { text: text.into() }))
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Type tag, the handler table lookup key.
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DocumentData {
    /// Document title, used by standalone envelopes.
    pub title: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderData {
    /// Heading level, 1 and up; backends clamp to their own range.
    pub level: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderedListItemData {
    /// 1-based item number, assigned by the producer in document order.
    pub index: u32,
}

/// Float placement for block images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Float {
    Left,
    Right,
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Float::Left => "left",
            Float::Right => "right",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageBlockData {
    pub href: String,
    pub alt_text: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub float: Option<Float>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HorizontalRuleData {
    pub clear_float: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeBlockData {
    /// Verbatim source text; renderers escape it, never reflow it.
    pub text: String,
    pub lang: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableData {
    /// Column metadata indexed by cell column position.
    pub columns: Vec<ColumnData>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableCaptionData {
    pub style: Option<Style>,
}

/// Shared by head and body rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableRowData {
    pub style: Option<Style>,
    pub row_separator: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableCellData {
    /// 0-based column position, used to look up column metadata on the
    /// table ancestor.
    pub column: usize,
    pub column_span: Option<u32>,
    pub row_span: Option<u32>,
    pub column_separator: bool,
    pub style: Option<Style>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableHeadCellData {
    pub column: usize,
    pub column_span: Option<u32>,
    pub row_span: Option<u32>,
    pub column_separator: bool,
    pub style: Option<Style>,
    pub is_row_head: bool,
    pub is_column_head: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextData {
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmphasisData {
    /// 1 = emphasis, 2 = strong, 3+ = strong emphasis.
    pub level: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecorationData {
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeData {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkData {
    pub href: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyledTextData {
    pub style: Style,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageData {
    pub href: String,
    pub alt_text: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PictogramData {
    pub emoji: Option<String>,
    pub alt_text: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorData {
    pub name: String,
}

/// Typed node payload, one variant per node type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum NodeData {
    Document(DocumentData),
    Paragraph,
    Quote,
    Header(HeaderData),
    Cite,
    List,
    ListItem,
    OrderedList,
    OrderedListItem(OrderedListItemData),
    ImageBlock(ImageBlockData),
    HorizontalRule(HorizontalRuleData),
    ClearFloat,
    CodeBlock(CodeBlockData),
    Table(TableData),
    TableCaption(TableCaptionData),
    TableRow(TableRowData),
    TableHeadRow(TableRowData),
    TableCell(TableCellData),
    TableHeadCell(TableHeadCellData),
    Text(TextData),
    EmphasisText(EmphasisData),
    DecoratedText(DecorationData),
    Code(CodeData),
    Link(LinkData),
    StyledText(StyledTextData),
    Image(ImageData),
    Pictogram(PictogramData),
    Anchor(AnchorData),
}

impl NodeData {
    /// Fieldless tag for handler table lookups.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document(_) => NodeKind::Document,
            NodeData::Paragraph => NodeKind::Paragraph,
            NodeData::Quote => NodeKind::Quote,
            NodeData::Header(_) => NodeKind::Header,
            NodeData::Cite => NodeKind::Cite,
            NodeData::List => NodeKind::List,
            NodeData::ListItem => NodeKind::ListItem,
            NodeData::OrderedList => NodeKind::OrderedList,
            NodeData::OrderedListItem(_) => NodeKind::OrderedListItem,
            NodeData::ImageBlock(_) => NodeKind::ImageBlock,
            NodeData::HorizontalRule(_) => NodeKind::HorizontalRule,
            NodeData::ClearFloat => NodeKind::ClearFloat,
            NodeData::CodeBlock(_) => NodeKind::CodeBlock,
            NodeData::Table(_) => NodeKind::Table,
            NodeData::TableCaption(_) => NodeKind::TableCaption,
            NodeData::TableRow(_) => NodeKind::TableRow,
            NodeData::TableHeadRow(_) => NodeKind::TableHeadRow,
            NodeData::TableCell(_) => NodeKind::TableCell,
            NodeData::TableHeadCell(_) => NodeKind::TableHeadCell,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::EmphasisText(_) => NodeKind::EmphasisText,
            NodeData::DecoratedText(_) => NodeKind::DecoratedText,
            NodeData::Code(_) => NodeKind::Code,
            NodeData::Link(_) => NodeKind::Link,
            NodeData::StyledText(_) => NodeKind::StyledText,
            NodeData::Image(_) => NodeKind::Image,
            NodeData::Pictogram(_) => NodeKind::Pictogram,
            NodeData::Anchor(_) => NodeKind::Anchor,
        }
    }
}

/// Node type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum NodeKind {
    Document,
    Paragraph,
    Quote,
    Header,
    Cite,
    List,
    ListItem,
    OrderedList,
    OrderedListItem,
    ImageBlock,
    HorizontalRule,
    ClearFloat,
    CodeBlock,
    Table,
    TableCaption,
    TableRow,
    TableHeadRow,
    TableCell,
    TableHeadCell,
    Text,
    EmphasisText,
    DecoratedText,
    Code,
    Link,
    StyledText,
    Image,
    Pictogram,
    Anchor,
}

impl NodeKind {
    /// Kebab-case type name, used in error messages and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Quote => "quote",
            NodeKind::Header => "header",
            NodeKind::Cite => "cite",
            NodeKind::List => "list",
            NodeKind::ListItem => "list-item",
            NodeKind::OrderedList => "ordered-list",
            NodeKind::OrderedListItem => "ordered-list-item",
            NodeKind::ImageBlock => "image-block",
            NodeKind::HorizontalRule => "horizontal-rule",
            NodeKind::ClearFloat => "clear-float",
            NodeKind::CodeBlock => "code-block",
            NodeKind::Table => "table",
            NodeKind::TableCaption => "table-caption",
            NodeKind::TableRow => "table-row",
            NodeKind::TableHeadRow => "table-head-row",
            NodeKind::TableCell => "table-cell",
            NodeKind::TableHeadCell => "table-head-cell",
            NodeKind::Text => "text",
            NodeKind::EmphasisText => "emphasis-text",
            NodeKind::DecoratedText => "decorated-text",
            NodeKind::Code => "code",
            NodeKind::Link => "link",
            NodeKind::StyledText => "styled-text",
            NodeKind::Image => "image",
            NodeKind::Pictogram => "pictogram",
            NodeKind::Anchor => "anchor",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
