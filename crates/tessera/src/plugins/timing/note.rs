//! Timing notes
//!
//! A note's size is only known once its text block is measured against the
//! skin, so height is computed on demand. Measuring is pure: the same content,
//! width and skin always give the same height.

use super::database::{NoteEntry, NotePosition, TimeTick};
use crate::core::{
    Color, ColorParam, DiagramResult, Dimension, FontParam, HorizontalAlignment, PaddingRole,
    SkinParams, StringBounder, TextBlock,
};

/// A note attached to a player at a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TimingNote {
    when: TimeTick,
    player: String,
    position: NotePosition,
    block: TextBlock,
    background: Color,
    border: Color,
    alignment: HorizontalAlignment,
    shadowing: bool,
}

impl TimingNote {
    pub fn new(entry: &NoteEntry, skin: &SkinParams) -> Self {
        let block = TextBlock::new(&entry.text, skin.font_for(FontParam::Note))
            .with_padding(skin.padding_for(PaddingRole::Note));
        Self {
            when: entry.tick,
            player: entry.player.clone(),
            position: entry.position,
            block,
            background: skin.color_for(ColorParam::NoteBackground),
            border: skin.color_for(ColorParam::NoteBorder),
            alignment: skin.default_alignment(),
            shadowing: skin.shadowing(),
        }
    }

    /// Wrap the text to at most `max_width` columns
    pub fn with_max_width(mut self, max_width: Option<usize>) -> Self {
        self.block = self.block.with_max_width(max_width);
        self
    }

    /// Outer size, frame included
    pub fn dimension(&self, bounder: &dyn StringBounder) -> DiagramResult<Dimension> {
        let text = self.block.calculate_dimension(bounder)?;
        let padding = self.block.padding();
        // vertical padding is taken by the frame rows
        Ok(Dimension::new(text.width + 2.0, text.height - 2.0 * padding + 2.0))
    }

    pub fn height(&self, bounder: &dyn StringBounder) -> DiagramResult<f64> {
        Ok(self.dimension(bounder)?.height)
    }

    pub fn width(&self, bounder: &dyn StringBounder) -> DiagramResult<f64> {
        Ok(self.dimension(bounder)?.width)
    }

    pub fn when(&self) -> TimeTick {
        self.when
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn position(&self) -> NotePosition {
        self.position
    }

    pub fn lines(&self) -> Vec<String> {
        self.block.wrapped_lines()
    }

    pub fn padding(&self) -> f64 {
        self.block.padding()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn border(&self) -> Color {
        self.border
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn shadowing(&self) -> bool {
        self.shadowing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AsciiBounder;

    fn entry(text: &str) -> NoteEntry {
        NoteEntry {
            player: "WB".to_string(),
            tick: TimeTick(3),
            text: text.to_string(),
            position: NotePosition::Top,
        }
    }

    #[test]
    fn test_height_is_repeatable() {
        let note = TimingNote::new(&entry("first\\nsecond"), &SkinParams::default());
        let first = note.height(&AsciiBounder).unwrap();
        let second = note.height(&AsciiBounder).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, 4.0);
        assert_eq!(note.width(&AsciiBounder).unwrap(), 10.0);
    }

    #[test]
    fn test_width_constraint_changes_only_height() {
        let skin = SkinParams::default();
        let wide = TimingNote::new(&entry("one two three four"), &skin);
        let narrow = wide.clone().with_max_width(Some(8));
        assert!(narrow.height(&AsciiBounder).unwrap() > wide.height(&AsciiBounder).unwrap());
        assert_eq!(narrow.background(), wide.background());
        assert_eq!(narrow.border(), wide.border());
        assert_eq!(narrow.when(), wide.when());
        assert_eq!(narrow.player(), wide.player());
    }

    #[test]
    fn test_colors_come_from_skin() {
        let mut skin = SkinParams::default();
        skin.set_color(ColorParam::NoteBackground, Color::RED);
        let note = TimingNote::new(&entry("x"), &skin);
        assert_eq!(note.background(), Color::RED);
        assert_eq!(note.position(), NotePosition::Top);
    }
}
