//! Colours as written in diagram text
//!
//! Accepts `#RRGGBB`, `#RGB` and case-insensitive names, with or without the
//! leading `#`. Gradients (`a/b`, `a|b`, `a\b`, `a-b`) resolve to their first colour
//! since the text backend paints flat cells.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::{DiagramError, DiagramResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const NAMED: &[(&str, u32)] = &[
    ("aqua", 0x00FFFF),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("black", 0x000000),
    ("blue", 0x0000FF),
    ("brown", 0xA52A2A),
    ("coral", 0xFF7F50),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkred", 0x8B0000),
    ("fuchsia", 0xFF00FF),
    ("gold", 0xFFD700),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("grey", 0x808080),
    ("ivory", 0xFFFFF0),
    ("lavender", 0xE6E6FA),
    ("lightblue", 0xADD8E6),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("orange", 0xFFA500),
    ("pink", 0xFFC0CB),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("salmon", 0xFA8072),
    ("silver", 0xC0C0C0),
    ("teal", 0x008080),
    ("tomato", 0xFF6347),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("yellow", 0xFFFF00),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn from_u32(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Parse a colour as written after `#` in diagram text
    pub fn parse(text: &str) -> DiagramResult<Self> {
        let trimmed = text.trim().trim_start_matches('#');
        let first = trimmed
            .split(['/', '|', '\\', '-'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('#');

        if first.is_empty() {
            return Err(DiagramError::config_error(format!("Empty color `{}`", text)));
        }
        if let Some(color) = Self::named(first) {
            return Ok(color);
        }
        Self::from_hex(first)
            .ok_or_else(|| DiagramError::config_error(format!("Unknown color `{}`", text)))
    }

    pub fn named(name: &str) -> Option<Self> {
        NAMED
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, value)| Self::from_u32(*value))
    }

    fn from_hex(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_u32),
            3 => {
                let doubled: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&doubled, 16).ok().map(Self::from_u32)
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        crossterm::style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Color::parse("#FF0000").unwrap(), Color::RED);
        assert_eq!(Color::parse("FF0000").unwrap(), Color::RED);
        assert_eq!(Color::parse("#f00").unwrap(), Color::RED);
        assert_eq!(Color::parse("#1a2B3c").unwrap(), Color::rgb(0x1A, 0x2B, 0x3C));
    }

    #[test]
    fn test_named_is_case_insensitive() {
        assert_eq!(Color::parse("Red").unwrap(), Color::RED);
        assert_eq!(Color::parse("#LightBlue").unwrap(), Color::rgb(0xAD, 0xD8, 0xE6));
    }

    #[test]
    fn test_gradient_takes_first() {
        assert_eq!(Color::parse("red/blue").unwrap(), Color::RED);
        assert_eq!(Color::parse("#FF0000|#0000FF").unwrap(), Color::RED);
        assert_eq!(Color::parse("red-white").unwrap(), Color::RED);
    }

    #[test]
    fn test_invalid() {
        assert!(Color::parse("").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("notacolor").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#FF0000\"");
        let back: Color = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(back, Color::RED);
    }

    #[test]
    fn test_crossterm_conversion() {
        let converted: crossterm::style::Color = Color::rgb(1, 2, 3).into();
        assert_eq!(converted, crossterm::style::Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
