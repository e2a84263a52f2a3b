//! Inline style attributes and table column metadata.

use treemark_theme::ColorRef;

/// Inline formatting attributes attached to styled spans, table rows,
/// cells and captions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub text_color: Option<ColorRef>,
    pub background_color: Option<ColorRef>,
}

impl Style {
    /// Overlay `overrides` on top of `self`.
    ///
    /// Used for table cells: the column's declared style is the base, the
    /// cell's own style wins on conflicting attributes. Boolean flags are
    /// additive; a cell cannot un-bold a bold column.
    #[must_use]
    pub fn merge(&self, overrides: &Style) -> Style {
        Style {
            bold: self.bold || overrides.bold,
            italic: self.italic || overrides.italic,
            underline: self.underline || overrides.underline,
            text_color: overrides
                .text_color
                .clone()
                .or_else(|| self.text_color.clone()),
            background_color: overrides
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
        }
    }

    /// True when no attribute is set.
    pub fn is_empty(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.underline
            && self.text_color.is_none()
            && self.background_color.is_none()
    }
}

/// Horizontal alignment of a table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Align {
    Left,
    Right,
    Center,
    Justify,
}

/// Per-column metadata declared on a table node.
///
/// Cells look this up through the visit stack by their column index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColumnData {
    pub align: Option<Align>,
    pub column_separator: bool,
    pub style: Option<Style>,
}
