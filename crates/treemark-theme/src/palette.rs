//! Named palette mapping canonical color names to concrete values.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{ColorRef, ThemeError, Tone};

/// Standard entries every palette starts from.
///
/// The classic 8 terminal colors plus their `light-` variants, with values
/// from the Tango scheme. Theme files overlay their own entries on top.
const STANDARD: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("red", "#cc0000"),
    ("green", "#4e9a06"),
    ("yellow", "#c4a000"),
    ("blue", "#3465a4"),
    ("magenta", "#75507b"),
    ("cyan", "#06989a"),
    ("white", "#d3d7cf"),
    ("light-black", "#555753"),
    ("light-red", "#ef2929"),
    ("light-green", "#8ae234"),
    ("light-yellow", "#fce94f"),
    ("light-blue", "#729fcf"),
    ("light-magenta", "#ad7fa8"),
    ("light-cyan", "#34e2e2"),
    ("light-white", "#eeeeec"),
];

/// Palette lookup: canonical color name to concrete value.
///
/// This is the only capability renderers depend on: resolving a symbolic
/// [`ColorRef`] to a concrete value, typically a hex string for CSS output.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Palette {
    entries: BTreeMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        let entries = STANDARD
            .iter()
            .map(|&(name, value)| (name.to_owned(), value.to_owned()))
            .collect();
        Self { entries }
    }
}

impl From<BTreeMap<String, String>> for Palette {
    /// Theme file entries overlay the standard set, so the common names
    /// keep resolving even when a theme only customizes a few.
    fn from(custom: BTreeMap<String, String>) -> Self {
        let mut palette = Self::default();
        palette.entries.extend(custom);
        palette
    }
}

impl Palette {
    /// Palette with only the standard entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry by canonical name.
    pub fn insert(&mut self, cname: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(cname.into(), value.into());
    }

    /// Look up a concrete value by canonical name.
    pub fn get(&self, cname: &str) -> Option<&str> {
        self.entries.get(cname).map(String::as_str)
    }

    /// Resolve a symbolic reference to its concrete value.
    ///
    /// A toned reference with no dedicated entry falls back to its base
    /// color; a reference with no entry at all is [`ThemeError::UnknownColor`].
    pub fn resolve(&self, color: &ColorRef) -> Result<&str, ThemeError> {
        let cname = color.cname();
        if let Some(value) = self.entries.get(&cname) {
            return Ok(value);
        }
        if color.tone() != Tone::Normal {
            if let Some(value) = self.entries.get(color.name()) {
                return Ok(value);
            }
        }
        Err(ThemeError::UnknownColor(cname))
    }
}
