//! Theme support for treemark renderers.
//!
//! A [`Theme`] bundles a [`Palette`] (symbolic color name → concrete value)
//! with named scalar tables (colors, sizes, print sizes, fonts). Renderers
//! never inspect theme internals beyond two capabilities: resolving a
//! [`ColorRef`] against the palette and iterating the scalar tables.
//!
//! Themes load from TOML:
//!
//! ```toml
//! [palette]
//! brand = "#15508a"
//!
//! [colors]
//! link = "@blue"
//! border = "#d0d0d0"
//!
//! [sizes]
//! text = "1rem"
//!
//! [print-sizes]
//! text = "10pt"
//!
//! [fonts]
//! main = "serif"
//! ```

mod color;
mod palette;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use color::{ColorRef, ColorValue, Tone};
pub use palette::Palette;

/// Theme loading and lookup errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ThemeError {
    /// A symbolic color has no palette entry.
    #[error("unknown palette color `{0}`")]
    UnknownColor(String),

    /// A theme file lacks one of the required tables.
    #[error("theme is missing the `{0}` table")]
    MissingTable(&'static str),

    /// TOML syntax or type error.
    #[error("failed to parse theme")]
    Parse(#[from] toml::de::Error),
}

/// Raw theme file shape; every table optional so absence can be reported
/// as [`ThemeError::MissingTable`] instead of a serde type error.
#[derive(Debug, Deserialize)]
struct ThemeFile {
    palette: Option<Palette>,
    colors: Option<BTreeMap<String, ColorValue>>,
    sizes: Option<BTreeMap<String, String>>,
    #[serde(rename = "print-sizes")]
    print_sizes: Option<BTreeMap<String, String>>,
    fonts: Option<BTreeMap<String, String>>,
}

/// Palette plus named scalar tables.
///
/// Scalar tables are `BTreeMap`s: iteration order is the sorted property
/// name, so projected output is reproducible for a given theme.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Symbolic color resolution.
    pub palette: Palette,
    /// Named theme colors; values are literals or palette references.
    pub colors: BTreeMap<String, ColorValue>,
    /// Screen sizes (CSS lengths).
    pub sizes: BTreeMap<String, String>,
    /// Print sizes (CSS lengths for print media).
    pub print_sizes: BTreeMap<String, String>,
    /// Font families.
    pub fonts: BTreeMap<String, String>,
}

impl Default for Theme {
    /// Standard palette with empty scalar tables.
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            colors: BTreeMap::new(),
            sizes: BTreeMap::new(),
            print_sizes: BTreeMap::new(),
            fonts: BTreeMap::new(),
        }
    }
}

impl Theme {
    /// Load a theme from TOML text.
    ///
    /// The `palette` table is optional (the standard palette is always
    /// available underneath); the four scalar tables are required.
    pub fn from_toml_str(text: &str) -> Result<Self, ThemeError> {
        let raw: ThemeFile = toml::from_str(text)?;
        Ok(Self {
            palette: raw.palette.unwrap_or_default(),
            colors: raw.colors.ok_or(ThemeError::MissingTable("colors"))?,
            sizes: raw.sizes.ok_or(ThemeError::MissingTable("sizes"))?,
            print_sizes: raw
                .print_sizes
                .ok_or(ThemeError::MissingTable("print-sizes"))?,
            fonts: raw.fonts.ok_or(ThemeError::MissingTable("fonts"))?,
        })
    }

    /// Check that every palette reference in the color table resolves.
    ///
    /// Renderer constructors call this so dangling references fail at
    /// construction rather than mid-render.
    pub fn validate(&self) -> Result<(), ThemeError> {
        for value in self.colors.values() {
            if let ColorValue::Ref(color) = value {
                self.palette.resolve(color)?;
            }
        }
        Ok(())
    }
}

/// Convert a camelCase property name to its kebab-case CSS form.
///
/// Theme tables may carry camelCase property names; CSS custom properties
/// are kebab-case (`linkHover` → `link-hover`). Names already in kebab-case
/// pass through unchanged.
#[must_use]
pub fn camel_to_dash(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
