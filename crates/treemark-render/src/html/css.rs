//! Stylesheet projection: theme variables and discovered colors.
//!
//! Runs after the body has been rendered, so the discovered-color registry
//! is complete. Declarations come out in a fixed order: theme colors,
//! theme sizes, theme fonts, then the per-color variable block with its
//! utility rules.

use std::collections::HashSet;
use std::fmt::Write;

use treemark_theme::{ColorRef, ColorValue, camel_to_dash};

use crate::RenderError;

use super::HtmlBackend;

/// Write-once-per-key registry of symbolic colors referenced during a
/// render.
///
/// Iteration order is insertion order, so the projected declarations are
/// reproducible for a given input tree: first referenced, first declared.
/// Registration is idempotent per canonical name — the first writer wins.
#[derive(Debug, Default)]
pub struct ColorSet {
    seen: HashSet<String>,
    entries: Vec<(String, ColorRef)>,
}

impl ColorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a color unless its canonical name is already present.
    pub fn register(&mut self, color: &ColorRef) {
        let cname = color.cname();
        if self.seen.insert(cname.clone()) {
            self.entries.push((cname, color.clone()));
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColorRef)> {
        self.entries
            .iter()
            .map(|(cname, color)| (cname.as_str(), color))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rule_scope_prefix(scope: &str) -> &'static str {
    if scope == "body" { "" } else { ".treemark " }
}

impl HtmlBackend {
    /// Theme color variables. Palette references become
    /// `var(--color-{cname})` and join the discovered-color registry so
    /// the per-color block below declares them.
    pub(super) fn theme_color_css(&mut self, scope: &str) -> String {
        let Self { theme, colors, .. } = self;
        let mut out = format!("{scope} {{\n");
        for (property, value) in &theme.colors {
            let value_str = match value {
                ColorValue::Ref(color) => {
                    colors.register(color);
                    format!("var(--color-{})", color.cname())
                }
                ColorValue::Literal(text) => text.clone(),
            };
            writeln!(out, "\t--{}-color: {value_str};", camel_to_dash(property)).unwrap();
        }
        out.push_str("}\n\n");
        out
    }

    /// Theme size variables, screen then print.
    pub(super) fn theme_size_css(&self, scope: &str) -> String {
        let mut out = format!("{scope} {{\n");
        for (property, value) in &self.theme.sizes {
            writeln!(out, "\t--{}-size: {value};", camel_to_dash(property)).unwrap();
        }
        for (property, value) in &self.theme.print_sizes {
            writeln!(out, "\t--{}-printsize: {value};", camel_to_dash(property)).unwrap();
        }
        out.push_str("}\n\n");
        out
    }

    /// Theme font variables.
    pub(super) fn theme_font_css(&self, scope: &str) -> String {
        let mut out = format!("{scope} {{\n");
        for (property, value) in &self.theme.fonts {
            writeln!(out, "\t--{}-font: {value};", camel_to_dash(property)).unwrap();
        }
        out.push_str("}\n\n");
        out
    }

    /// Variable declarations plus foreground/background utility rules for
    /// every discovered color, in first-referenced order.
    pub(super) fn color_css(&self, scope: &str) -> Result<String, RenderError> {
        tracing::debug!(colors = self.colors.len(), "projecting discovered colors");

        let prefix = rule_scope_prefix(scope);
        let mut defs = format!("{scope} {{\n");
        let mut rules = String::new();

        for (cname, color) in self.colors.iter() {
            let value = self.theme.palette.resolve(color)?;
            writeln!(defs, "\t--color-{cname}: {value};").unwrap();
            writeln!(rules, "{prefix}.text-{cname} {{ color: var(--color-{cname}); }}").unwrap();
            writeln!(
                rules,
                "{prefix}.bg-{cname} {{ background-color: var(--color-{cname}); }}"
            )
            .unwrap();
        }

        defs.push_str("}\n\n");
        Ok(format!("{defs}{rules}\n"))
    }
}
