//! Tree-walking document renderers with pluggable per-node handler tables.
//!
//! This crate renders an immutable document tree ([`treemark_doc::Node`])
//! into a target textual notation. Two backends consume the same tree shape
//! and the same dispatch contract but emit different notations:
//!
//! - [`html::HtmlRenderer`]: nested HTML tags plus a post-pass stylesheet
//!   projection for the colors the document referenced.
//! - [`term::TermRenderer`]: linear control-code markup where formatting is
//!   expressed as flat in-band escape sequences.
//!
//! # Architecture
//!
//! The shared core is the dispatch and context-propagation protocol:
//! a [`HandlerTable`] maps each node kind to a render function and an
//! optional pre-visit hook, the [`Walker`] drives the recursive descent,
//! and the [`VisitStack`] threads per-ancestor state top-down and restores
//! it on the way back up. Container kinds with structurally heterogeneous
//! children (tables) declare a [`GroupSpec`] that reorders children into
//! fixed buckets before serialization. The backends are handler tables
//! riding on this core.
//!
//! # Example
//!
//! ```
//! use treemark_doc::{DocumentData, HeaderData, Node, NodeData};
//! use treemark_render::html::{HtmlOptions, HtmlRenderer};
//! use treemark_theme::Theme;
//!
//! let tree = Node::with_children(
//!     NodeData::Document(DocumentData::default()),
//!     vec![Node::with_children(
//!         NodeData::Header(HeaderData { level: 1 }),
//!         vec![Node::text("Hello")],
//!     )],
//! );
//!
//! let mut renderer = HtmlRenderer::new(Theme::default(), HtmlOptions::default()).unwrap();
//! let html = renderer.render(&tree).unwrap();
//! assert!(html.contains("<h1>Hello</h1>"));
//! ```

mod backend;
mod error;
mod highlight;
mod stack;
mod table;
mod walker;

pub mod html;
pub mod term;

pub use backend::Backend;
pub use error::{ConfigError, RenderError};
pub use highlight::Highlight;
pub use stack::{Frame, VisitStack};
pub use table::{FallbackOrder, GroupSpec, Handler, HandlerTable, PreVisitFn, RenderFn};
pub use walker::Walker;
