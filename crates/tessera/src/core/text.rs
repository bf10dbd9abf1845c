//! Text measurement and wrapping
//!
//! Layout never measures text directly: it asks a [`StringBounder`] for the size of
//! a [`TextBlock`], so the same geometry code serves any backend.

use unicode_width::UnicodeWidthStr;

use super::error::{DiagramError, DiagramResult};
use super::skin::FontSpec;
use super::source::display_lines;

/// Width and height of measured content, in character cells
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn grow(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.width + dx, self.height + dy)
    }
}

/// Measures single lines of text
pub trait StringBounder {
    fn measure(&self, text: &str, font: &FontSpec) -> DiagramResult<Dimension>;
}

/// Monospace terminal metrics: one cell per column, one row per line
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiBounder;

impl StringBounder for AsciiBounder {
    fn measure(&self, text: &str, _font: &FontSpec) -> DiagramResult<Dimension> {
        if let Some(bad) = text.chars().find(|c| c.is_control()) {
            return Err(DiagramError::measurement_error(format!(
                "cannot measure control character {:?} in `{}`",
                bad,
                text.escape_debug()
            )));
        }
        Ok(Dimension::new(UnicodeWidthStr::width(text) as f64, 1.0))
    }
}

/// Multi-line text with a font, padding and optional wrap width
///
/// Measurement is a pure function of content, width and font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    lines: Vec<String>,
    font: FontSpec,
    padding: f64,
    max_width: Option<usize>,
}

impl TextBlock {
    /// Build from display text, splitting on literal `\\n`
    pub fn new(text: &str, font: FontSpec) -> Self {
        Self {
            lines: display_lines(text),
            font,
            padding: 0.0,
            max_width: None,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_max_width(mut self, max_width: Option<usize>) -> Self {
        self.max_width = max_width.filter(|w| *w > 0);
        self
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    /// Lines after wrapping to the width constraint
    pub fn wrapped_lines(&self) -> Vec<String> {
        let width = self.max_width.unwrap_or(0);
        self.lines
            .iter()
            .flat_map(|line| wrap_label(line, width))
            .collect()
    }

    pub fn calculate_dimension(&self, bounder: &dyn StringBounder) -> DiagramResult<Dimension> {
        let mut width: f64 = 0.0;
        let mut height = 0.0;
        for line in self.wrapped_lines() {
            let size = bounder.measure(&line, &self.font)?;
            width = width.max(size.width);
            height += size.height;
        }
        Ok(Dimension::new(width, height).grow(2.0 * self.padding, 2.0 * self.padding))
    }
}

/// Wrap text to fit within a maximum width, breaking on word boundaries.
///
/// Returns a vector of lines, each fitting within `max_width` display columns.
/// If `max_width` is 0, or the label fits on one line, returns a single-element vector.
///
/// # Example
/// ```
/// use tessera::core::wrap_label;
///
/// let lines = wrap_label("This is a long label", 10);
/// assert_eq!(lines, vec!["This is a", "long label"]);
/// ```
pub fn wrap_label(label: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || UnicodeWidthStr::width(label) <= max_width {
        return vec![label.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in label.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);

        if current_width == 0 {
            // First word on line
            current_line = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            // Word fits on current line
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            // Start new line
            lines.push(current_line);
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
