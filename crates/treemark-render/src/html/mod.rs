//! Structured-markup backend producing HTML.
//!
//! Nested tags express nesting directly, so this backend needs no
//! cumulative-markup machinery; its frames are empty. What it does
//! accumulate is the set of symbolic colors referenced during the walk,
//! projected into a stylesheet after the body is rendered.

mod css;
mod escape;
mod handlers;

use serde::Deserialize;

use treemark_doc::{Node, NodeKind};
use treemark_theme::{ColorRef, Theme};

use crate::table::{GroupSpec, Handler};
use crate::{Backend, ConfigError, HandlerTable, Highlight, RenderError, Walker};

pub use css::ColorSet;
pub use escape::{escape_attr, escape_text};

/// HTML renderer options.
///
/// The CSS fields are literal stylesheet text, concatenated into the
/// standalone envelope in a fixed order: standalone, extra-standalone,
/// core, extra-core, code, extra-code. Unrecognized keys in a
/// deserialized bundle are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Emit a full document envelope instead of a body fragment.
    pub standalone: bool,
    pub core_css: Option<String>,
    pub extra_core_css: Option<String>,
    pub standalone_css: Option<String>,
    pub extra_standalone_css: Option<String>,
    pub code_css: Option<String>,
    pub extra_code_css: Option<String>,
}

fn normalize_css(css: Option<String>) -> Option<String> {
    let css = css?;
    let trimmed = css.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("{trimmed}\n"))
    }
}

impl HtmlOptions {
    fn normalized(self) -> Self {
        Self {
            standalone: self.standalone,
            core_css: normalize_css(self.core_css),
            extra_core_css: normalize_css(self.extra_core_css),
            standalone_css: normalize_css(self.standalone_css),
            extra_standalone_css: normalize_css(self.extra_standalone_css),
            code_css: normalize_css(self.code_css),
            extra_code_css: normalize_css(self.extra_code_css),
        }
    }

    /// Configured stylesheet text in declared order.
    fn css_bundle(&self) -> String {
        [
            &self.standalone_css,
            &self.extra_standalone_css,
            &self.core_css,
            &self.extra_core_css,
            &self.code_css,
            &self.extra_code_css,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect()
    }
}

/// State shared by all HTML handlers for the lifetime of the renderer.
pub struct HtmlBackend {
    theme: Theme,
    options: HtmlOptions,
    colors: ColorSet,
    highlighter: Option<Box<dyn Highlight>>,
}

impl Backend for HtmlBackend {
    type Frame = ();
}

fn handler_table() -> HandlerTable<HtmlBackend> {
    let mut table = HandlerTable::new();
    table.insert(NodeKind::Document, Handler::new(handlers::document));
    table.insert(NodeKind::Paragraph, Handler::new(handlers::paragraph));
    table.insert(NodeKind::Quote, Handler::new(handlers::quote));
    table.insert(NodeKind::Header, Handler::new(handlers::header));
    table.insert(NodeKind::Cite, Handler::new(handlers::cite));
    table.insert(NodeKind::List, Handler::new(handlers::list));
    table.insert(NodeKind::ListItem, Handler::new(handlers::list_item));
    table.insert(NodeKind::OrderedList, Handler::new(handlers::ordered_list));
    table.insert(
        NodeKind::OrderedListItem,
        Handler::new(handlers::ordered_list_item),
    );
    table.insert(NodeKind::ImageBlock, Handler::new(handlers::image_block));
    table.insert(
        NodeKind::HorizontalRule,
        Handler::new(handlers::horizontal_rule),
    );
    table.insert(NodeKind::ClearFloat, Handler::new(handlers::clear_float));
    table.insert(NodeKind::CodeBlock, Handler::new(handlers::code_block));
    table.insert(NodeKind::Table, Handler::new(handlers::table));
    table.insert(
        NodeKind::TableCaption,
        Handler::new(handlers::table_caption),
    );
    table.insert(NodeKind::TableRow, Handler::new(handlers::table_row));
    table.insert(
        NodeKind::TableHeadRow,
        Handler::new(handlers::table_head_row),
    );
    table.insert(NodeKind::TableCell, Handler::new(handlers::table_cell));
    table.insert(
        NodeKind::TableHeadCell,
        Handler::new(handlers::table_head_cell),
    );
    table.insert(NodeKind::Text, Handler::new(handlers::text));
    table.insert(
        NodeKind::EmphasisText,
        Handler::new(handlers::emphasis_text),
    );
    table.insert(
        NodeKind::DecoratedText,
        Handler::new(handlers::decorated_text),
    );
    table.insert(NodeKind::Code, Handler::new(handlers::code));
    table.insert(NodeKind::Link, Handler::new(handlers::link));
    table.insert(NodeKind::StyledText, Handler::new(handlers::styled_text));
    table.insert(NodeKind::Image, Handler::new(handlers::image));
    table.insert(NodeKind::Pictogram, Handler::new(handlers::pictogram));
    table.insert(NodeKind::Anchor, Handler::new(handlers::anchor));

    table.set_group(
        NodeKind::Table,
        GroupSpec::new()
            .bucket(NodeKind::TableCaption, 1)
            .bucket_wrapped(NodeKind::TableHeadRow, 2, handlers::head_section)
            .bucket_wrapped(NodeKind::TableRow, 3, handlers::body_section),
    );

    table
}

/// HTML renderer: handler table resolved once at construction, plus the
/// backend state accumulated across render calls.
pub struct HtmlRenderer {
    table: HandlerTable<HtmlBackend>,
    backend: HtmlBackend,
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer").finish_non_exhaustive()
    }
}

impl HtmlRenderer {
    /// Build a renderer over a validated theme.
    pub fn new(theme: Theme, options: HtmlOptions) -> Result<Self, ConfigError> {
        theme.validate()?;
        Ok(Self {
            table: handler_table(),
            backend: HtmlBackend {
                theme,
                options: options.normalized(),
                colors: ColorSet::new(),
                highlighter: None,
            },
        })
    }

    /// Inject a syntax highlighter for fenced code blocks.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlight>) -> Self {
        self.backend.highlighter = Some(highlighter);
        self
    }

    /// Render a document tree to HTML.
    ///
    /// In standalone mode the output is a full document with embedded
    /// styles; otherwise a body fragment scoped under `.treemark`.
    pub fn render(&mut self, root: &Node) -> Result<String, RenderError> {
        Walker::new(&self.table).render(&mut self.backend, root)
    }

    /// Fragment-scoped stylesheet (theme variables plus discovered
    /// colors), for embedders that render fragments and attach styles
    /// separately.
    pub fn stylesheet(&mut self) -> Result<String, RenderError> {
        let scope = ".treemark";
        let mut out = self.backend.theme_color_css(scope);
        out.push_str(&self.backend.theme_size_css(scope));
        out.push_str(&self.backend.theme_font_css(scope));
        out.push_str(&self.backend.color_css(scope)?);
        Ok(out)
    }

    /// Colors discovered so far, in first-referenced order.
    pub fn discovered_colors(&self) -> impl Iterator<Item = (&str, &ColorRef)> {
        self.backend.colors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treemark_doc::{
        CodeBlockData, CodeData, ColumnData, DocumentData, EmphasisData, HeaderData, LinkData,
        Node, NodeData, PictogramData, Style, StyledTextData, TableCaptionData, TableCellData,
        TableData, TableHeadCellData, TableRowData,
    };
    use treemark_doc::Align;
    use treemark_theme::{ColorRef, ColorValue};

    fn renderer() -> HtmlRenderer {
        HtmlRenderer::new(Theme::default(), HtmlOptions::default()).unwrap()
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::with_children(NodeData::Document(DocumentData::default()), children)
    }

    fn styled(color: &str, text: &str) -> Node {
        Node::with_children(
            NodeData::StyledText(StyledTextData {
                style: Style {
                    text_color: Some(ColorRef::new(color)),
                    ..Style::default()
                },
                title: None,
            }),
            vec![Node::text(text)],
        )
    }

    #[test]
    fn test_heading_and_bold_paragraph() {
        let tree = doc(vec![
            Node::with_children(
                NodeData::Header(HeaderData { level: 1 }),
                vec![Node::text("Title")],
            ),
            Node::with_children(
                NodeData::Paragraph,
                vec![Node::with_children(
                    NodeData::EmphasisText(EmphasisData { level: 2 }),
                    vec![Node::text("bold")],
                )],
            ),
        ]);

        let out = renderer().render(&tree).unwrap();
        assert_eq!(
            out,
            "<div class=\"treemark\">\n<h1>Title</h1>\n<p><strong>bold</strong></p>\n\n</div>\n"
        );
    }

    #[test]
    fn test_header_level_clamped() {
        let tree = doc(vec![Node::with_children(
            NodeData::Header(HeaderData { level: 9 }),
            vec![Node::text("Deep")],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<h6>Deep</h6>"));
    }

    #[test]
    fn test_emphasis_levels() {
        for (level, expected) in [
            (1, "<em>x</em>"),
            (2, "<strong>x</strong>"),
            (3, "<strong><em>x</em></strong>"),
            (4, "<strong><em>x</em></strong>"),
        ] {
            let tree = doc(vec![Node::with_children(
                NodeData::Paragraph,
                vec![Node::with_children(
                    NodeData::EmphasisText(EmphasisData { level }),
                    vec![Node::text("x")],
                )],
            )]);
            let out = renderer().render(&tree).unwrap();
            assert!(out.contains(expected), "level {level}: {out}");
        }
    }

    #[test]
    fn test_text_escaping_rewrites_newlines() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![Node::text("a < b\nc & d")],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("a &lt; b<br />c &amp; d"));
    }

    #[test]
    fn test_link_attributes_escaped() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![Node::with_children(
                NodeData::Link(LinkData {
                    href: "/a?x=\"1\"".to_owned(),
                    title: Some("say \"hi\"".to_owned()),
                }),
                vec![Node::text("go")],
            )],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<a href=\"/a?x=&quot;1&quot;\" title=\"say &quot;hi&quot;\">go</a>"));
    }

    #[test]
    fn test_inline_code_escaped() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![Node::new(NodeData::Code(CodeData {
                text: "a < b".to_owned(),
            }))],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<code>a &lt; b</code>"));
    }

    #[test]
    fn test_code_block_without_language() {
        let tree = doc(vec![Node::new(NodeData::CodeBlock(CodeBlockData {
            text: "x < 1".to_owned(),
            lang: None,
        }))]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<pre>\n<code>x &lt; 1</code>\n</pre>"));
    }

    #[test]
    fn test_code_block_language_without_highlighter() {
        let tree = doc(vec![Node::new(NodeData::CodeBlock(CodeBlockData {
            text: "fn main() {}".to_owned(),
            lang: Some("rust".to_owned()),
        }))]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<code class=\"lang-rust\">fn main() {}</code>"));
    }

    struct ShoutHighlighter;

    impl Highlight for ShoutHighlighter {
        fn highlight(
            &self,
            source: &str,
            language: &str,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(format!("<span class=\"hl-{language}\">{source}</span>"))
        }
    }

    #[test]
    fn test_code_block_uses_injected_highlighter() {
        let tree = doc(vec![Node::new(NodeData::CodeBlock(CodeBlockData {
            text: "let x = 1;".to_owned(),
            lang: Some("rust".to_owned()),
        }))]);
        let mut renderer = renderer().with_highlighter(Box::new(ShoutHighlighter));
        let out = renderer.render(&tree).unwrap();
        assert!(out.contains("<span class=\"hl-rust\">let x = 1;</span>"));
    }

    fn cell(column: usize, text: &str) -> Node {
        Node::with_children(
            NodeData::TableCell(TableCellData {
                column,
                ..TableCellData::default()
            }),
            vec![Node::text(text)],
        )
    }

    fn sample_table() -> Node {
        Node::with_children(
            NodeData::Table(TableData {
                columns: vec![
                    ColumnData {
                        align: Some(Align::Right),
                        ..ColumnData::default()
                    },
                    ColumnData::default(),
                ],
            }),
            vec![
                Node::with_children(
                    NodeData::TableRow(TableRowData::default()),
                    vec![cell(0, "b0"), cell(1, "b1")],
                ),
                Node::with_children(
                    NodeData::TableHeadRow(TableRowData::default()),
                    vec![Node::with_children(
                        NodeData::TableHeadCell(TableHeadCellData {
                            is_column_head: true,
                            ..TableHeadCellData::default()
                        }),
                        vec![Node::text("H")],
                    )],
                ),
                Node::with_children(
                    NodeData::TableCaption(TableCaptionData::default()),
                    vec![Node::text("Caption")],
                ),
            ],
        )
    }

    #[test]
    fn test_table_grouping_and_alignment() {
        let tree = doc(vec![sample_table()]);
        let out = renderer().render(&tree).unwrap();

        let caption = out.find("<caption>Caption</caption>").unwrap();
        let thead = out.find("<thead>").unwrap();
        let tbody = out.find("<tbody>").unwrap();
        assert!(caption < thead && thead < tbody);

        assert!(out.contains("<th scope=\"column\">H</th>"));
        assert!(out.contains("<td class=\"align-right\">b0</td>"));
        assert!(out.contains("<td>b1</td>"));
    }

    #[test]
    fn test_cell_style_merge_cell_wins() {
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData {
                columns: vec![ColumnData {
                    style: Some(Style {
                        bold: true,
                        text_color: Some(ColorRef::new("red")),
                        ..Style::default()
                    }),
                    ..ColumnData::default()
                }],
            }),
            vec![Node::with_children(
                NodeData::TableRow(TableRowData::default()),
                vec![Node::with_children(
                    NodeData::TableCell(TableCellData {
                        column: 0,
                        style: Some(Style {
                            text_color: Some(ColorRef::new("blue")),
                            ..Style::default()
                        }),
                        ..TableCellData::default()
                    }),
                    vec![Node::text("x")],
                )],
            )],
        )]);

        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("bold"));
        assert!(out.contains("text-blue"));
        assert!(!out.contains("text-red"));
    }

    #[test]
    fn test_cell_outside_table_is_missing_context() {
        let tree = doc(vec![cell(0, "stray")]);
        let err = renderer().render(&tree).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingContext {
                kind: NodeKind::TableCell,
                ..
            }
        ));
    }

    #[test]
    fn test_cell_column_out_of_range_is_safe() {
        let tree = doc(vec![Node::with_children(
            NodeData::Table(TableData::default()),
            vec![Node::with_children(
                NodeData::TableRow(TableRowData::default()),
                vec![cell(7, "x")],
            )],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<td>x</td>"));
    }

    #[test]
    fn test_color_discovery_is_idempotent() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![
                styled("red", "one"),
                styled("red", "two"),
                styled("red", "three"),
                styled("blue", "four"),
            ],
        )]);

        let mut renderer = renderer();
        renderer.render(&tree).unwrap();

        let names: Vec<&str> = renderer.discovered_colors().map(|(cname, _)| cname).collect();
        assert_eq!(names, vec!["red", "blue"]);

        let css = renderer.stylesheet().unwrap();
        assert_eq!(css.matches("--color-red:").count(), 1);
        assert!(css.contains(".treemark .text-red { color: var(--color-red); }"));
    }

    #[test]
    fn test_fragment_mode_has_no_envelope() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![Node::text("hi")],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(!out.contains("<!DOCTYPE"));
        assert!(!out.contains("<style>"));
        assert!(out.starts_with("<div class=\"treemark\">"));
    }

    #[test]
    fn test_standalone_envelope() {
        let mut theme = Theme::default();
        theme
            .colors
            .insert("link".to_owned(), ColorValue::Ref(ColorRef::new("blue")));
        theme.sizes.insert("text".to_owned(), "1rem".to_owned());
        theme.fonts.insert("main".to_owned(), "serif".to_owned());

        let options = HtmlOptions {
            standalone: true,
            core_css: Some("p { margin: 0; }".to_owned()),
            standalone_css: Some("body { padding: 0; }".to_owned()),
            ..HtmlOptions::default()
        };

        let tree = Node::with_children(
            NodeData::Document(DocumentData {
                title: Some("My Doc".to_owned()),
            }),
            vec![Node::with_children(
                NodeData::Paragraph,
                vec![styled("red", "hi")],
            )],
        );

        let mut renderer = HtmlRenderer::new(theme, options).unwrap();
        let out = renderer.render(&tree).unwrap();

        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<title>My Doc</title>"));
        // Theme variables come before the discovered-color block.
        assert!(out.contains("--link-color: var(--color-blue);"));
        assert!(out.contains("--text-size: 1rem;"));
        assert!(out.contains("--main-font: serif;"));
        // Both the theme-referenced and the document-referenced colors
        // are declared exactly once.
        assert_eq!(out.matches("--color-blue:").count(), 1);
        assert_eq!(out.matches("--color-red:").count(), 1);
        // Configured CSS in declared order: standalone before core.
        let standalone_pos = out.find("body { padding: 0; }").unwrap();
        let core_pos = out.find("p { margin: 0; }").unwrap();
        assert!(standalone_pos < core_pos);
        assert!(out.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_standalone_default_title() {
        let options = HtmlOptions {
            standalone: true,
            ..HtmlOptions::default()
        };
        let tree = doc(vec![]);
        let mut renderer = HtmlRenderer::new(Theme::default(), options).unwrap();
        let out = renderer.render(&tree).unwrap();
        assert!(out.contains("<title>Untitled document</title>"));
    }

    #[test]
    fn test_construction_rejects_invalid_theme() {
        let mut theme = Theme::default();
        theme.colors.insert(
            "accent".to_owned(),
            ColorValue::Ref(ColorRef::new("nonexistent")),
        );
        let err = HtmlRenderer::new(theme, HtmlOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Theme(_)));
    }

    #[test]
    fn test_options_ignore_unknown_keys() {
        let options: HtmlOptions =
            toml::from_str("standalone = true\nfuture_flag = \"yes\"").unwrap();
        assert!(options.standalone);
    }

    #[test]
    fn test_pictogram_and_anchor() {
        let tree = doc(vec![Node::with_children(
            NodeData::Paragraph,
            vec![
                Node::new(NodeData::Pictogram(PictogramData {
                    emoji: Some("🦀".to_owned()),
                    title: Some("crab".to_owned()),
                    alt_text: None,
                })),
                Node::new(NodeData::Pictogram(PictogramData::default())),
            ],
        )]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<span class=\"pictogram-emoji\" title=\"crab\">🦀</span>"));

        let tree = doc(vec![Node::new(NodeData::Anchor(
            treemark_doc::AnchorData {
                name: "section-1".to_owned(),
            },
        ))]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<a name=\"section-1\"></a>"));
    }

    #[test]
    fn test_empty_containers_are_safe() {
        let tree = doc(vec![
            Node::new(NodeData::Paragraph),
            Node::new(NodeData::Quote),
            Node::new(NodeData::List),
            Node::new(NodeData::Table(TableData::default())),
        ]);
        let out = renderer().render(&tree).unwrap();
        assert!(out.contains("<p></p>"));
        assert!(out.contains("<blockquote></blockquote>"));
        assert!(out.contains("<table>\n</table>"));
    }
}
