//! Drawing surface contract
//!
//! Layout resolves every coordinate first, then issues [`Primitive`]s against a
//! [`Surface`]. Backends decide how a primitive looks; geometry never changes
//! after it is handed over.

use super::color::Color;
use super::error::DiagramResult;
use super::skin::FontSpec;
use super::text::{AsciiBounder, Dimension, StringBounder};

/// Top-left anchor of a primitive, in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Stroke {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ArrowHeadKind {
    #[default]
    Filled,
    Open,
}

/// Something a surface can paint
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text {
        text: String,
        color: Option<Color>,
    },
    HorizontalLine {
        length: usize,
        stroke: Stroke,
        color: Option<Color>,
    },
    /// Only paints empty cells, so it never hides what is already drawn
    VerticalLine {
        length: usize,
        stroke: Stroke,
        color: Option<Color>,
    },
    Rectangle {
        width: usize,
        height: usize,
        double: bool,
        fill: Option<Color>,
        border: Option<Color>,
    },
    /// Rectangle with a folded top-right corner
    Note {
        width: usize,
        height: usize,
        fill: Option<Color>,
        border: Option<Color>,
    },
    /// Horizontal arrow of `length` cells with its head at the pointed end
    Arrow {
        length: usize,
        direction: ArrowDirection,
        stroke: Stroke,
        head: ArrowHeadKind,
        color: Option<Color>,
    },
}

impl Primitive {
    pub fn text(text: impl Into<String>) -> Self {
        Primitive::Text {
            text: text.into(),
            color: None,
        }
    }
}

/// A target for resolved draw operations
pub trait Surface: StringBounder {
    fn draw(&mut self, primitive: &Primitive, at: Position) -> DiagramResult<()>;
}

/// Surface that only records what it was asked to draw
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub calls: Vec<(Primitive, Position)>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts drawn so far, in call order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|(primitive, _)| match primitive {
                Primitive::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl StringBounder for RecordingSurface {
    fn measure(&self, text: &str, font: &FontSpec) -> DiagramResult<Dimension> {
        AsciiBounder.measure(text, font)
    }
}

impl Surface for RecordingSurface {
    fn draw(&mut self, primitive: &Primitive, at: Position) -> DiagramResult<()> {
        self.calls.push((primitive.clone(), at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_keeps_order() {
        let mut surface = RecordingSurface::new();
        surface
            .draw(&Primitive::text("first"), Position::new(1, 2))
            .unwrap();
        surface
            .draw(
                &Primitive::HorizontalLine {
                    length: 3,
                    stroke: Stroke::Dashed,
                    color: None,
                },
                Position::new(0, 0),
            )
            .unwrap();
        surface
            .draw(&Primitive::text("second"), Position::new(0, 4))
            .unwrap();
        assert_eq!(surface.texts(), vec!["first", "second"]);
        assert_eq!(surface.calls[0].1, Position::new(1, 2));
        assert_eq!(surface.calls.len(), 3);
    }

    #[test]
    fn test_recording_surface_measures_like_terminal() {
        let surface = RecordingSurface::new();
        let size = surface.measure("日本", &FontSpec::default()).unwrap();
        assert_eq!(size, Dimension::new(4.0, 1.0));
    }
}
