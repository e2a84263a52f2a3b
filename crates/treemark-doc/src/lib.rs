//! Immutable document tree consumed by treemark renderers.
//!
//! The tree producer (a parser, an importer, test code) builds a [`Node`]
//! tree and hands it to a renderer; renderers only read it. [`NodeData`]
//! carries per-type attributes, [`NodeKind`] is the dispatch tag, and
//! [`Style`]/[`ColumnData`] describe inline formatting and table columns.

mod node;
mod style;

pub use node::{
    AnchorData, CodeBlockData, CodeData, DecorationData, DocumentData, EmphasisData, Float,
    HeaderData, HorizontalRuleData, ImageBlockData, ImageData, LinkData, Node, NodeData, NodeKind,
    OrderedListItemData, PictogramData, StyledTextData, TableCaptionData, TableCellData, TableData,
    TableHeadCellData, TableRowData, TextData,
};
pub use style::{Align, ColumnData, Style};
