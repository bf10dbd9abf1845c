//! Output configuration types

use std::fmt;
use std::str::FromStr;

/// Character set for rendering output
///
/// Controls which characters are used for frames, lines and arrow heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CharacterSet {
    /// Pure ASCII characters only: + - | < > v ^
    /// Maximum compatibility but limited visual quality
    Ascii,
    /// Unicode box-drawing characters: ┌ ┐ └ ┘ ─ │ ▶ ◀
    #[default]
    Unicode,
}

impl CharacterSet {
    /// Returns true if this character set uses only ASCII
    pub fn is_ascii(&self) -> bool {
        matches!(self, CharacterSet::Ascii)
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterSet::Ascii => write!(f, "ascii"),
            CharacterSet::Unicode => write!(f, "unicode"),
        }
    }
}

impl FromStr for CharacterSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascii" => Ok(CharacterSet::Ascii),
            "unicode" => Ok(CharacterSet::Unicode),
            _ => Err(format!("Unknown character set: {}", s)),
        }
    }
}

/// Rendering configuration shared by all diagram renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderConfig {
    pub style: CharacterSet,
    /// Emit ANSI colour escapes for skin colours
    pub colorize: bool,
}

impl RenderConfig {
    pub fn new(style: CharacterSet) -> Self {
        Self {
            style,
            colorize: false,
        }
    }

    pub fn with_colors(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_set_parsing() {
        assert_eq!("ASCII".parse::<CharacterSet>().unwrap(), CharacterSet::Ascii);
        assert_eq!("unicode".parse::<CharacterSet>().unwrap(), CharacterSet::Unicode);
        assert!("compact".parse::<CharacterSet>().is_err());
    }

    #[test]
    fn test_character_set_display() {
        assert_eq!(CharacterSet::Ascii.to_string(), "ascii");
        assert_eq!(CharacterSet::default().to_string(), "unicode");
    }

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.style, CharacterSet::Unicode);
        assert!(!config.colorize);
        assert!(RenderConfig::new(CharacterSet::Ascii).with_colors(true).colorize);
    }
}
