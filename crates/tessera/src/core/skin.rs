//! Skin parameters
//!
//! A read-only style object queried by name at layout and draw time. Only
//! overrides are stored; every key has a built-in default, so a lookup never fails.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::color::Color;
use super::error::{DiagramError, DiagramResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorParam {
    NoteBackground,
    NoteBorder,
    BoxBackground,
    BoxBorder,
    ParticipantBackground,
    ParticipantBorder,
    Arrow,
    Lifeline,
    Divider,
    TimingLine,
    Text,
}

impl ColorParam {
    fn default_color(self) -> Color {
        match self {
            ColorParam::NoteBackground => Color::rgb(0xFB, 0xFB, 0x77),
            ColorParam::NoteBorder => Color::rgb(0xA8, 0x00, 0x36),
            ColorParam::BoxBackground => Color::rgb(0xDD, 0xDD, 0xDD),
            ColorParam::BoxBorder => Color::BLACK,
            ColorParam::ParticipantBackground => Color::rgb(0xFE, 0xFE, 0xCE),
            ColorParam::ParticipantBorder => Color::rgb(0xA8, 0x00, 0x36),
            ColorParam::Arrow => Color::rgb(0xA8, 0x00, 0x36),
            ColorParam::Lifeline => Color::rgb(0xA8, 0x00, 0x36),
            ColorParam::Divider => Color::rgb(0xEE, 0xEE, 0xEE),
            ColorParam::TimingLine => Color::BLACK,
            ColorParam::Text => Color::BLACK,
        }
    }

    fn from_skinparam(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let key = lower.strip_prefix("sequence").unwrap_or(&lower);
        let param = match key {
            "notebackgroundcolor" => ColorParam::NoteBackground,
            "notebordercolor" => ColorParam::NoteBorder,
            "boxbackgroundcolor" => ColorParam::BoxBackground,
            "boxbordercolor" => ColorParam::BoxBorder,
            "participantbackgroundcolor" => ColorParam::ParticipantBackground,
            "participantbordercolor" => ColorParam::ParticipantBorder,
            "arrowcolor" => ColorParam::Arrow,
            "lifelinebordercolor" => ColorParam::Lifeline,
            "dividerbackgroundcolor" => ColorParam::Divider,
            "timinglinecolor" => ColorParam::TimingLine,
            "defaultfontcolor" | "fontcolor" => ColorParam::Text,
            _ => return None,
        };
        Some(param)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontParam {
    Default,
    Title,
    Participant,
    Arrow,
    Note,
    Box,
    Divider,
    Timing,
}

impl FontParam {
    fn from_prefix(prefix: &str) -> Option<Self> {
        let lower = prefix.to_ascii_lowercase();
        let key = lower.strip_prefix("sequence").unwrap_or(&lower);
        let param = match key {
            "" | "default" => FontParam::Default,
            "title" => FontParam::Title,
            "participant" => FontParam::Participant,
            "arrow" => FontParam::Arrow,
            "note" => FontParam::Note,
            "box" => FontParam::Box,
            "divider" => FontParam::Divider,
            "timing" => FontParam::Timing,
            _ => return None,
        };
        Some(param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Monospaced".to_string(),
            size: 13,
            bold: false,
            italic: false,
        }
    }
}

/// Paddings and gaps, in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaddingRole {
    /// Inside participant heads
    Participant,
    /// Between neighbouring participants
    ParticipantGap,
    /// Inside notes
    Note,
    /// Between a grouping box frame and its members
    Box,
    /// Between a message label and its arrow ends
    Message,
    /// Between consecutive timing ticks
    TimingTick,
}

impl PaddingRole {
    fn default_padding(self) -> f64 {
        match self {
            PaddingRole::Participant => 1.0,
            PaddingRole::ParticipantGap => 4.0,
            PaddingRole::Note => 1.0,
            PaddingRole::Box => 1.0,
            PaddingRole::Message => 2.0,
            PaddingRole::TimingTick => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl fmt::Display for HorizontalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HorizontalAlignment::Left => write!(f, "left"),
            HorizontalAlignment::Center => write!(f, "center"),
            HorizontalAlignment::Right => write!(f, "right"),
        }
    }
}

/// Style overrides for one diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinParams {
    colors: BTreeMap<ColorParam, Color>,
    fonts: BTreeMap<FontParam, FontSpec>,
    paddings: BTreeMap<PaddingRole, f64>,
    shadowing: bool,
    alignment: HorizontalAlignment,
}

impl SkinParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from JSON, e.g. `{"colors": {"Arrow": "#00FF00"}}`
    pub fn from_json(json: &str) -> DiagramResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DiagramError::config_error(format!("Invalid skin JSON: {}", e)))
    }

    pub fn color_for(&self, param: ColorParam) -> Color {
        self.colors
            .get(&param)
            .copied()
            .unwrap_or_else(|| param.default_color())
    }

    /// Font for a role, falling back to the default font override
    pub fn font_for(&self, param: FontParam) -> FontSpec {
        self.fonts
            .get(&param)
            .or_else(|| self.fonts.get(&FontParam::Default))
            .cloned()
            .unwrap_or_default()
    }

    pub fn padding_for(&self, role: PaddingRole) -> f64 {
        self.paddings
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_padding())
    }

    pub fn shadowing(&self) -> bool {
        self.shadowing
    }

    pub fn default_alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn set_color(&mut self, param: ColorParam, color: Color) {
        self.colors.insert(param, color);
    }

    pub fn set_padding(&mut self, role: PaddingRole, padding: f64) {
        self.paddings.insert(role, padding);
    }

    /// Apply one `skinparam <name> <value>` line
    ///
    /// Unknown names are ignored with a warning; malformed values are errors.
    pub fn set_by_name(&mut self, name: &str, value: &str) -> DiagramResult<()> {
        debug!(name, value, "Setting skinparam");
        if let Some(param) = ColorParam::from_skinparam(name) {
            self.colors.insert(param, Color::parse(value)?);
            return Ok(());
        }

        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "shadowing" => {
                self.shadowing = parse_bool(value)?;
                return Ok(());
            }
            "defaulttextalignment" => {
                self.alignment = match value.to_ascii_lowercase().as_str() {
                    "left" => HorizontalAlignment::Left,
                    "center" => HorizontalAlignment::Center,
                    "right" => HorizontalAlignment::Right,
                    _ => {
                        return Err(DiagramError::config_error(format!(
                            "Invalid alignment `{}`",
                            value
                        )))
                    }
                };
                return Ok(());
            }
            "padding" => {
                let padding = parse_number(value)?;
                for role in [PaddingRole::Participant, PaddingRole::Note, PaddingRole::Box] {
                    self.paddings.insert(role, padding);
                }
                return Ok(());
            }
            "participantpadding" => {
                self.paddings
                    .insert(PaddingRole::ParticipantGap, parse_number(value)?);
                return Ok(());
            }
            "boxpadding" => {
                self.paddings.insert(PaddingRole::Box, parse_number(value)?);
                return Ok(());
            }
            _ => {}
        }

        for (suffix, apply) in FONT_SETTERS {
            if let Some(prefix) = lower.strip_suffix(suffix) {
                if let Some(param) = FontParam::from_prefix(prefix) {
                    let mut font = self.font_for(param);
                    apply(&mut font, value)?;
                    self.fonts.insert(param, font);
                    return Ok(());
                }
            }
        }

        warn!(name, "Ignoring unknown skinparam");
        Ok(())
    }
}

type FontSetter = fn(&mut FontSpec, &str) -> DiagramResult<()>;

const FONT_SETTERS: &[(&str, FontSetter)] = &[
    ("fontname", set_font_name),
    ("fontsize", set_font_size),
    ("fontstyle", set_font_style),
];

fn set_font_name(font: &mut FontSpec, value: &str) -> DiagramResult<()> {
    font.family = value.to_string();
    Ok(())
}

fn set_font_size(font: &mut FontSpec, value: &str) -> DiagramResult<()> {
    font.size = value
        .parse()
        .map_err(|_| DiagramError::config_error(format!("Invalid font size `{}`", value)))?;
    Ok(())
}

fn set_font_style(font: &mut FontSpec, value: &str) -> DiagramResult<()> {
    let lower = value.to_ascii_lowercase();
    font.bold = lower.contains("bold");
    font.italic = lower.contains("italic");
    Ok(())
}

fn parse_bool(value: &str) -> DiagramResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(DiagramError::config_error(format!(
            "Invalid boolean `{}`",
            value
        ))),
    }
}

fn parse_number(value: &str) -> DiagramResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| DiagramError::config_error(format!("Invalid number `{}`", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_total() {
        let skin = SkinParams::new();
        assert_eq!(skin.color_for(ColorParam::BoxBackground).to_hex(), "#DDDDDD");
        assert_eq!(skin.font_for(FontParam::Note), FontSpec::default());
        assert_eq!(skin.padding_for(PaddingRole::ParticipantGap), 4.0);
        assert!(!skin.shadowing());
        assert_eq!(skin.default_alignment(), HorizontalAlignment::Left);
    }

    #[test]
    fn test_set_by_name_colors() {
        let mut skin = SkinParams::new();
        skin.set_by_name("NoteBackgroundColor", "#00FF00").unwrap();
        skin.set_by_name("SequenceBoxBackgroundColor", "red").unwrap();
        assert_eq!(skin.color_for(ColorParam::NoteBackground).to_hex(), "#00FF00");
        assert_eq!(skin.color_for(ColorParam::BoxBackground), Color::RED);
        assert!(skin.set_by_name("ArrowColor", "nope").is_err());
    }

    #[test]
    fn test_set_by_name_fonts_and_flags() {
        let mut skin = SkinParams::new();
        skin.set_by_name("DefaultFontSize", "10").unwrap();
        skin.set_by_name("NoteFontStyle", "bold").unwrap();
        skin.set_by_name("Shadowing", "true").unwrap();
        skin.set_by_name("DefaultTextAlignment", "center").unwrap();
        assert_eq!(skin.font_for(FontParam::Title).size, 10);
        assert!(skin.font_for(FontParam::Note).bold);
        assert_eq!(skin.font_for(FontParam::Note).size, 10);
        assert!(skin.shadowing());
        assert_eq!(skin.default_alignment(), HorizontalAlignment::Center);
    }

    #[test]
    fn test_unknown_skinparam_is_ignored() {
        let mut skin = SkinParams::new();
        skin.set_by_name("Handwritten", "true").unwrap();
        assert_eq!(skin, SkinParams::new());
    }

    #[test]
    fn test_from_json() {
        let skin = SkinParams::from_json(
            r#"{"colors": {"Arrow": "blue"}, "paddings": {"Note": 2.0}, "shadowing": true}"#,
        )
        .unwrap();
        assert_eq!(skin.color_for(ColorParam::Arrow).to_hex(), "#0000FF");
        assert_eq!(skin.padding_for(PaddingRole::Note), 2.0);
        assert!(skin.shadowing());
        assert!(SkinParams::from_json("{\"colors\": 3}").is_err());
    }
}
