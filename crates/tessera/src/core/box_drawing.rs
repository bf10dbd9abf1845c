//! Box and line drawing characters
//!
//! Consistent frame and arrow glyphs for every renderer, in both ASCII and Unicode.

use super::CharacterSet;

/// Box drawing characters for rendering rectangular shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BoxChars {
    /// Standard rectangle box characters
    pub fn rectangle(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self::ascii(),
            CharacterSet::Unicode => Self::unicode(),
        }
    }

    /// Double-line frame for grouping boxes, visually distinct from participants
    pub fn double(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self {
                top_left: '#',
                top_right: '#',
                bottom_left: '#',
                bottom_right: '#',
                horizontal: '=',
                vertical: '#',
            },
            CharacterSet::Unicode => Self {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
            },
        }
    }

    /// ASCII-only box characters
    pub fn ascii() -> Self {
        Self {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
        }
    }

    /// Unicode box-drawing characters
    pub fn unicode() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
        }
    }
}

impl Default for BoxChars {
    fn default() -> Self {
        Self::unicode()
    }
}

/// Line drawing characters for arrows, lifelines and notes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChars {
    pub horizontal: char,
    pub horizontal_dashed: char,
    pub vertical: char,
    pub vertical_dashed: char,
    pub arrow_left: char,
    pub arrow_right: char,
    pub open_left: char,
    pub open_right: char,
    /// Folded corner of a note
    pub fold: char,
}

impl LineChars {
    /// Get line characters for the given style
    pub fn new(style: CharacterSet) -> Self {
        match style {
            CharacterSet::Ascii => Self::ascii(),
            CharacterSet::Unicode => Self::unicode(),
        }
    }

    /// ASCII line characters
    pub fn ascii() -> Self {
        Self {
            horizontal: '-',
            horizontal_dashed: '.',
            vertical: '|',
            vertical_dashed: ':',
            arrow_left: '<',
            arrow_right: '>',
            open_left: '<',
            open_right: '>',
            fold: '\\',
        }
    }

    /// Unicode line characters
    pub fn unicode() -> Self {
        Self {
            horizontal: '─',
            horizontal_dashed: '╌',
            vertical: '│',
            vertical_dashed: '┆',
            arrow_left: '◀',
            arrow_right: '▶',
            open_left: '<',
            open_right: '>',
            fold: '╲',
        }
    }
}

impl Default for LineChars {
    fn default() -> Self {
        Self::unicode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_chars_ascii() {
        let chars = BoxChars::rectangle(CharacterSet::Ascii);
        assert_eq!(chars.top_left, '+');
        assert_eq!(chars.horizontal, '-');
    }

    #[test]
    fn test_box_chars_unicode() {
        let chars = BoxChars::rectangle(CharacterSet::Unicode);
        assert_eq!(chars.top_left, '┌');
        assert_eq!(chars.horizontal, '─');
    }

    #[test]
    fn test_box_chars_double() {
        let chars = BoxChars::double(CharacterSet::Unicode);
        assert_eq!(chars.top_left, '╔');
        assert_eq!(chars.horizontal, '═');
        assert_eq!(BoxChars::double(CharacterSet::Ascii).horizontal, '=');
    }

    #[test]
    fn test_line_chars() {
        assert_eq!(LineChars::new(CharacterSet::Ascii).arrow_right, '>');
        assert_eq!(LineChars::new(CharacterSet::Unicode).arrow_right, '▶');
        assert_eq!(LineChars::new(CharacterSet::Unicode).horizontal_dashed, '╌');
    }
}
