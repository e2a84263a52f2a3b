//! Symbolic color references.
//!
//! A [`ColorRef`] names a palette color without committing to a concrete
//! value; the palette decides what `light-red` actually is. Theme color
//! tables mix references with literal CSS values via [`ColorValue`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tone modifier applied to a base palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tone {
    /// The base color.
    #[default]
    Normal,
    /// Brightened variant (`light-` prefix).
    Light,
    /// Darkened variant (`dark-` prefix).
    Dark,
}

/// Reference to a palette color by symbolic name.
///
/// The canonical name ([`ColorRef::cname`]) is the stable key used for CSS
/// variables and the discovered-color registry: `red`, `light-red`,
/// `dark-red`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColorRef {
    name: String,
    tone: Tone,
}

impl ColorRef {
    /// Reference to a base color by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone: Tone::Normal,
        }
    }

    /// Reference to a toned variant of a base color.
    pub fn with_tone(name: impl Into<String>, tone: Tone) -> Self {
        Self {
            name: name.into(),
            tone,
        }
    }

    /// Parse a canonical name back into a reference.
    ///
    /// `light-` and `dark-` prefixes select the tone; anything else is a
    /// base color name.
    #[must_use]
    pub fn parse(cname: &str) -> Self {
        if let Some(base) = cname.strip_prefix("light-") {
            Self::with_tone(base, Tone::Light)
        } else if let Some(base) = cname.strip_prefix("dark-") {
            Self::with_tone(base, Tone::Dark)
        } else {
            Self::new(cname)
        }
    }

    /// Base color name without tone prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tone modifier.
    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Canonical name, usable as a CSS variable suffix or registry key.
    #[must_use]
    pub fn cname(&self) -> String {
        match self.tone {
            Tone::Normal => self.name.clone(),
            Tone::Light => format!("light-{}", self.name),
            Tone::Dark => format!("dark-{}", self.name),
        }
    }
}

impl fmt::Display for ColorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cname())
    }
}

impl From<String> for ColorRef {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ColorRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ColorRef> for String {
    fn from(color: ColorRef) -> Self {
        color.cname()
    }
}

/// A theme color table entry.
///
/// In theme files a leading `@` marks a palette reference; anything else is
/// taken as a literal CSS value:
///
/// ```toml
/// [colors]
/// link = "@blue"
/// border = "#d0d0d0"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorValue {
    /// Literal CSS value, emitted verbatim.
    Literal(String),
    /// Palette reference, resolved and registered at projection time.
    Ref(ColorRef),
}

impl From<String> for ColorValue {
    fn from(s: String) -> Self {
        match s.strip_prefix('@') {
            Some(name) => Self::Ref(ColorRef::parse(name)),
            None => Self::Literal(s),
        }
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        match value {
            ColorValue::Literal(s) => s,
            ColorValue::Ref(color) => format!("@{}", color.cname()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cname_round_trip() {
        assert_eq!(ColorRef::new("red").cname(), "red");
        assert_eq!(ColorRef::with_tone("red", Tone::Light).cname(), "light-red");
        assert_eq!(ColorRef::with_tone("red", Tone::Dark).cname(), "dark-red");

        assert_eq!(ColorRef::parse("light-red"), ColorRef::with_tone("red", Tone::Light));
        assert_eq!(ColorRef::parse("dark-blue"), ColorRef::with_tone("blue", Tone::Dark));
        assert_eq!(ColorRef::parse("cyan"), ColorRef::new("cyan"));
    }

    #[test]
    fn test_color_value_from_string() {
        assert_eq!(
            ColorValue::from("@light-blue".to_owned()),
            ColorValue::Ref(ColorRef::with_tone("blue", Tone::Light))
        );
        assert_eq!(
            ColorValue::from("#d0d0d0".to_owned()),
            ColorValue::Literal("#d0d0d0".to_owned())
        );
    }

    #[test]
    fn test_display_matches_cname() {
        let color = ColorRef::with_tone("green", Tone::Light);
        assert_eq!(color.to_string(), "light-green");
    }
}
