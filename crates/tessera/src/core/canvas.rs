//! Character grid surface
//!
//! A growable grid of cells used by every renderer. Each cell carries an optional
//! foreground and background colour so the same drawing can be emitted as plain
//! text or with ANSI colours.

use crossterm::style::Stylize;
use unicode_width::UnicodeWidthChar;

use super::box_drawing::{BoxChars, LineChars};
use super::color::Color;
use super::error::DiagramResult;
use super::skin::FontSpec;
use super::surface::{ArrowDirection, ArrowHeadKind, Position, Primitive, Stroke, Surface};
use super::text::{AsciiBounder, Dimension, StringBounder};
use super::CharacterSet;

/// Placeholder for the second column of a double-width character
const WIDE_TAIL: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

/// ASCII canvas representing a character grid for diagram rendering
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<char>>,
    styles: Vec<Vec<CellStyle>>,
    style: CharacterSet,
}

impl AsciiCanvas {
    /// Create a new canvas with the specified dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_style(width, height, CharacterSet::default())
    }

    pub fn with_style(width: usize, height: usize, style: CharacterSet) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            grid: vec![vec![' '; width]; height],
            styles: vec![vec![CellStyle::default(); width]; height],
            style,
        }
    }

    pub fn style(&self) -> CharacterSet {
        self.style
    }

    /// Ensure the canvas is at least the specified size, expanding if needed
    pub fn ensure_size(&mut self, min_width: usize, min_height: usize) {
        if min_width > self.width {
            for row in &mut self.grid {
                row.resize(min_width, ' ');
            }
            for row in &mut self.styles {
                row.resize(min_width, CellStyle::default());
            }
            self.width = min_width;
        }
        if min_height > self.height {
            let extra_rows = min_height - self.height;
            self.grid
                .extend((0..extra_rows).map(|_| vec![' '; self.width]));
            self.styles
                .extend((0..extra_rows).map(|_| vec![CellStyle::default(); self.width]));
            self.height = min_height;
        }
    }

    /// Set a character at the specified position
    pub fn set_char(&mut self, x: usize, y: usize, c: char) {
        self.ensure_size(x + 1, y + 1);
        self.grid[y][x] = c;
    }

    /// Get the character at the specified position
    pub fn get_char(&self, x: usize, y: usize) -> char {
        if y < self.height && x < self.width {
            self.grid[y][x]
        } else {
            ' '
        }
    }

    pub fn cell_style(&self, x: usize, y: usize) -> CellStyle {
        if y < self.height && x < self.width {
            self.styles[y][x]
        } else {
            CellStyle::default()
        }
    }

    fn set_fg(&mut self, x: usize, y: usize, color: Option<Color>) {
        if let Some(color) = color {
            self.ensure_size(x + 1, y + 1);
            self.styles[y][x].fg = Some(color);
        }
    }

    fn set_bg(&mut self, x: usize, y: usize, color: Option<Color>) {
        if let Some(color) = color {
            self.ensure_size(x + 1, y + 1);
            self.styles[y][x].bg = Some(color);
        }
    }

    /// Draw text at the specified position (left-aligned), honouring display width
    pub fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        self.draw_colored_text(x, y, text, None);
    }

    fn draw_colored_text(&mut self, x: usize, y: usize, text: &str, color: Option<Color>) {
        let mut column = x;
        for c in text.chars() {
            let width = UnicodeWidthChar::width(c).unwrap_or(0);
            if width == 0 {
                continue;
            }
            self.set_char(column, y, c);
            self.set_fg(column, y, color);
            if width == 2 {
                self.set_char(column + 1, y, WIDE_TAIL);
            }
            column += width;
        }
    }

    /// Draw a horizontal line
    pub fn draw_horizontal_line(&mut self, x: usize, y: usize, length: usize, c: char) {
        for i in 0..length {
            self.set_char(x + i, y, c);
        }
    }

    /// Draw a vertical line
    pub fn draw_vertical_line(&mut self, x: usize, y: usize, length: usize, c: char) {
        for i in 0..length {
            self.set_char(x, y + i, c);
        }
    }

    fn draw_frame(
        &mut self,
        at: Position,
        width: usize,
        height: usize,
        chars: BoxChars,
        fill: Option<Color>,
        border: Option<Color>,
    ) {
        if width < 2 || height < 2 {
            return;
        }
        let (left, top) = (at.x, at.y);
        let right = left + width - 1;
        let bottom = top + height - 1;

        for y in top..=bottom {
            for x in left..=right {
                let c = match (x, y) {
                    (x, y) if x == left && y == top => chars.top_left,
                    (x, y) if x == right && y == top => chars.top_right,
                    (x, y) if x == left && y == bottom => chars.bottom_left,
                    (x, y) if x == right && y == bottom => chars.bottom_right,
                    (_, y) if y == top || y == bottom => chars.horizontal,
                    (x, _) if x == left || x == right => chars.vertical,
                    _ => ' ',
                };
                self.set_char(x, y, c);
                if c == ' ' {
                    self.set_bg(x, y, fill);
                } else {
                    self.set_fg(x, y, border);
                }
            }
        }
    }

    /// Rows and columns that carry content, as (first row, last row, first column)
    fn visible_region(&self) -> Option<(usize, usize, usize)> {
        let content: Vec<usize> = (0..self.height)
            .filter(|&y| self.row_end(y) > 0)
            .collect();
        let first = *content.first()?;
        let last = *content.last()?;
        let min_col = content
            .iter()
            .map(|&y| self.grid[y].iter().take_while(|c| **c == ' ').count())
            .min()
            .unwrap_or(0);
        Some((first, last, min_col))
    }

    fn row_end(&self, y: usize) -> usize {
        self.grid[y]
            .iter()
            .rposition(|c| *c != ' ' && *c != WIDE_TAIL)
            .map_or(0, |i| i + 1)
    }

    /// Render with ANSI colour escapes for styled cells
    pub fn to_ansi_string(&self) -> String {
        let Some((first, last, min_col)) = self.visible_region() else {
            return String::new();
        };
        let mut rows = Vec::with_capacity(last - first + 1);
        for y in first..=last {
            let end = self.row_end(y);
            let mut row = String::new();
            for x in min_col..end.max(min_col) {
                let c = self.grid[y][x];
                if c == WIDE_TAIL {
                    continue;
                }
                let style = self.styles[y][x];
                match (style.fg, style.bg) {
                    (None, None) => row.push(c),
                    (Some(fg), None) => row.push_str(&c.with(fg.into()).to_string()),
                    (None, Some(bg)) => row.push_str(&c.on(bg.into()).to_string()),
                    (Some(fg), Some(bg)) => {
                        row.push_str(&c.with(fg.into()).on(bg.into()).to_string())
                    }
                }
            }
            rows.push(row);
        }
        rows.join("\n")
    }
}

impl std::fmt::Display for AsciiCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some((first, last, min_col)) = self.visible_region() else {
            return Ok(());
        };
        let rows: Vec<String> = (first..=last)
            .map(|y| {
                let end = self.row_end(y).max(min_col);
                self.grid[y][min_col..end]
                    .iter()
                    .filter(|c| **c != WIDE_TAIL)
                    .collect()
            })
            .collect();
        write!(f, "{}", rows.join("\n"))
    }
}

impl StringBounder for AsciiCanvas {
    fn measure(&self, text: &str, font: &FontSpec) -> DiagramResult<Dimension> {
        AsciiBounder.measure(text, font)
    }
}

impl Surface for AsciiCanvas {
    fn draw(&mut self, primitive: &Primitive, at: Position) -> DiagramResult<()> {
        let lines = LineChars::new(self.style);
        match primitive {
            Primitive::Text { text, color } => {
                self.draw_colored_text(at.x, at.y, text, *color);
            }
            Primitive::HorizontalLine {
                length,
                stroke,
                color,
            } => {
                let c = match stroke {
                    Stroke::Solid => lines.horizontal,
                    Stroke::Dashed => lines.horizontal_dashed,
                };
                for i in 0..*length {
                    self.set_char(at.x + i, at.y, c);
                    self.set_fg(at.x + i, at.y, *color);
                }
            }
            Primitive::VerticalLine {
                length,
                stroke,
                color,
            } => {
                let c = match stroke {
                    Stroke::Solid => lines.vertical,
                    Stroke::Dashed => lines.vertical_dashed,
                };
                for i in 0..*length {
                    if self.get_char(at.x, at.y + i) == ' ' {
                        self.set_char(at.x, at.y + i, c);
                        self.set_fg(at.x, at.y + i, *color);
                    }
                }
            }
            Primitive::Rectangle {
                width,
                height,
                double,
                fill,
                border,
            } => {
                let chars = if *double {
                    BoxChars::double(self.style)
                } else {
                    BoxChars::rectangle(self.style)
                };
                self.draw_frame(at, *width, *height, chars, *fill, *border);
            }
            Primitive::Note {
                width,
                height,
                fill,
                border,
            } => {
                let mut chars = BoxChars::rectangle(self.style);
                chars.top_right = lines.fold;
                self.draw_frame(at, *width, *height, chars, *fill, *border);
            }
            Primitive::Arrow {
                length,
                direction,
                stroke,
                head,
                color,
            } => {
                if *length == 0 {
                    return Ok(());
                }
                let body = match stroke {
                    Stroke::Solid => lines.horizontal,
                    Stroke::Dashed => lines.horizontal_dashed,
                };
                let (head_x, tip) = match (direction, head) {
                    (ArrowDirection::Right, ArrowHeadKind::Filled) => {
                        (at.x + length - 1, lines.arrow_right)
                    }
                    (ArrowDirection::Right, ArrowHeadKind::Open) => {
                        (at.x + length - 1, lines.open_right)
                    }
                    (ArrowDirection::Left, ArrowHeadKind::Filled) => (at.x, lines.arrow_left),
                    (ArrowDirection::Left, ArrowHeadKind::Open) => (at.x, lines.open_left),
                };
                for i in 0..*length {
                    let x = at.x + i;
                    self.set_char(x, at.y, if x == head_x { tip } else { body });
                    self.set_fg(x, at.y, *color);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas() {
        let canvas = AsciiCanvas::new(10, 5);
        assert_eq!(canvas.width, 10);
        assert_eq!(canvas.height, 5);
    }

    #[test]
    fn test_auto_expand() {
        let mut canvas = AsciiCanvas::new(5, 5);
        canvas.set_char(10, 10, 'X');
        assert!(canvas.width >= 11);
        assert!(canvas.height >= 11);
        assert_eq!(canvas.get_char(10, 10), 'X');
    }

    #[test]
    fn test_display_trims_whitespace() {
        let mut canvas = AsciiCanvas::new(20, 10);
        canvas.draw_text(5, 3, "Test");
        assert_eq!(canvas.to_string(), "Test");
    }

    #[test]
    fn test_wide_characters_take_two_cells() {
        let mut canvas = AsciiCanvas::new(10, 1);
        canvas.draw_text(0, 0, "日x");
        assert_eq!(canvas.get_char(2, 0), 'x');
        assert_eq!(canvas.to_string(), "日x");
    }

    #[test]
    fn test_rectangle_primitive() {
        let mut canvas = AsciiCanvas::with_style(10, 5, CharacterSet::Ascii);
        canvas
            .draw(
                &Primitive::Rectangle {
                    width: 4,
                    height: 3,
                    double: false,
                    fill: None,
                    border: None,
                },
                Position::new(0, 0),
            )
            .unwrap();
        assert_eq!(canvas.to_string(), "+--+\n|  |\n+--+");
    }

    #[test]
    fn test_note_primitive_folds_corner() {
        let mut canvas = AsciiCanvas::with_style(10, 5, CharacterSet::Ascii);
        canvas
            .draw(
                &Primitive::Note {
                    width: 4,
                    height: 3,
                    fill: Some(Color::RED),
                    border: None,
                },
                Position::new(0, 0),
            )
            .unwrap();
        assert_eq!(canvas.get_char(3, 0), '\\');
        assert_eq!(canvas.cell_style(1, 1).bg, Some(Color::RED));
        assert_eq!(canvas.cell_style(0, 0).bg, None);
    }

    #[test]
    fn test_vertical_line_keeps_existing_cells() {
        let mut canvas = AsciiCanvas::with_style(5, 5, CharacterSet::Ascii);
        canvas.draw_text(0, 2, "abc");
        canvas
            .draw(
                &Primitive::VerticalLine {
                    length: 4,
                    stroke: Stroke::Solid,
                    color: None,
                },
                Position::new(1, 0),
            )
            .unwrap();
        assert_eq!(canvas.get_char(1, 1), '|');
        assert_eq!(canvas.get_char(1, 2), 'b');
    }

    #[test]
    fn test_arrow_primitive() {
        let mut canvas = AsciiCanvas::with_style(10, 1, CharacterSet::Ascii);
        canvas
            .draw(
                &Primitive::Arrow {
                    length: 4,
                    direction: ArrowDirection::Left,
                    stroke: Stroke::Dashed,
                    head: ArrowHeadKind::Filled,
                    color: None,
                },
                Position::new(0, 0),
            )
            .unwrap();
        assert_eq!(canvas.to_string(), "<...");
    }

    #[test]
    fn test_ansi_output_contains_escapes() {
        let mut canvas = AsciiCanvas::new(5, 1);
        canvas
            .draw(
                &Primitive::Text {
                    text: "hi".to_string(),
                    color: Some(Color::RED),
                },
                Position::new(0, 0),
            )
            .unwrap();
        let ansi = canvas.to_ansi_string();
        assert!(ansi.contains('\u{1b}'));
        assert!(ansi.contains('h'));
        assert_eq!(canvas.to_string(), "hi");
    }
}
