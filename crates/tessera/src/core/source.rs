//! Diagram source splitting
//!
//! One input text may hold several `@startuml` ... `@enduml` blocks. Each block
//! becomes an independent [`DiagramSource`] whose lines keep their position in
//! the original text, so errors point at real file lines.

use std::fmt;

use tracing::{debug, trace};

/// Position of a line in the original input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineLocation {
    /// Zero-based index of the diagram block within the input
    pub diagram: usize,
    /// One-based line number within the whole input
    pub line: usize,
}

impl LineLocation {
    pub fn new(diagram: usize, line: usize) -> Self {
        Self { diagram, line }
    }
}

impl fmt::Display for LineLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// A trimmed, non-comment line of diagram text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub location: LineLocation,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, location: LineLocation) -> Self {
        Self {
            text: text.into(),
            location,
        }
    }
}

/// The command lines of one diagram block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    /// Zero-based block index
    pub index: usize,
    /// Line of the `@start` marker, or 1 when the input has no markers
    pub start_line: usize,
    pub lines: Vec<SourceLine>,
}

impl DiagramSource {
    /// Build a single diagram from text without `@start`/`@end` markers
    pub fn single(input: &str) -> Self {
        let mut source = Self {
            index: 0,
            start_line: 1,
            lines: Vec::new(),
        };
        let mut in_block_comment = false;
        for (idx, raw) in input.lines().enumerate() {
            source.push_line(raw, idx + 1, &mut in_block_comment);
        }
        source
    }

    /// Split input into diagram blocks
    ///
    /// Text outside `@start`/`@end` markers is ignored once any marker is
    /// present. An unterminated block runs to the end of the input.
    pub fn split(input: &str) -> Vec<Self> {
        let has_markers = input.lines().any(|l| is_start_marker(l.trim()));
        if !has_markers {
            let single = Self::single(input);
            debug!(lines = single.lines.len(), "Input has no @start markers");
            return vec![single];
        }

        let mut blocks = Vec::new();
        let mut current: Option<Self> = None;
        let mut in_block_comment = false;

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();
            if is_start_marker(trimmed) {
                if let Some(open) = current.take() {
                    blocks.push(open);
                }
                in_block_comment = false;
                current = Some(Self {
                    index: blocks.len(),
                    start_line: line_no,
                    lines: Vec::new(),
                });
                continue;
            }
            if is_end_marker(trimmed) {
                if let Some(open) = current.take() {
                    blocks.push(open);
                }
                continue;
            }
            if let Some(open) = current.as_mut() {
                open.push_line(raw, line_no, &mut in_block_comment);
            }
        }
        if let Some(open) = current.take() {
            blocks.push(open);
        }

        debug!(blocks = blocks.len(), "Split input into diagram blocks");
        blocks
    }

    /// Tabs become single spaces; other control characters are kept for measurement to reject
    fn push_line(&mut self, raw: &str, line_no: usize, in_block_comment: &mut bool) {
        let expanded = raw.replace('\t', " ");
        let trimmed = expanded.trim();
        if *in_block_comment {
            if trimmed.ends_with("'/") {
                *in_block_comment = false;
            }
            return;
        }
        if trimmed.starts_with("/'") {
            if !(trimmed.len() > 3 && trimmed.ends_with("'/")) {
                *in_block_comment = true;
            }
            return;
        }
        if trimmed.is_empty() || trimmed.starts_with('\'') {
            return;
        }
        trace!(line = line_no, text = trimmed, "Source line");
        self.lines
            .push(SourceLine::new(trimmed, LineLocation::new(self.index, line_no)));
    }

    /// Iterate the line texts
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

fn is_start_marker(line: &str) -> bool {
    line.len() > 6
        && line
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("@start"))
}

fn is_end_marker(line: &str) -> bool {
    line.len() > 4
        && line
            .get(..4)
            .is_some_and(|head| head.eq_ignore_ascii_case("@end"))
}

/// Split a display string on literal `\n` escapes
pub fn display_lines(text: &str) -> Vec<String> {
    text.split("\\n").map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_diagram_skips_comments_and_blanks() {
        let input = "box \"A\"\n\n' comment\nparticipant A\n/' block\nstill comment '/\nend box";
        let source = DiagramSource::single(input);
        let texts: Vec<_> = source.texts().collect();
        assert_eq!(texts, vec!["box \"A\"", "participant A", "end box"]);
        assert_eq!(source.lines[1].location.line, 4);
        assert_eq!(source.lines[2].location.line, 7);
    }

    #[test]
    fn test_split_blocks_keep_file_lines() {
        let input = "@startuml\nA -> B\n@enduml\n\n@startuml\nbax \"X\"\n@enduml\n";
        let blocks = DiagramSource::split(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[1].index, 1);
        assert_eq!(blocks[1].start_line, 5);
        assert_eq!(blocks[1].lines[0].text, "bax \"X\"");
        assert_eq!(blocks[1].lines[0].location, LineLocation::new(1, 6));
    }

    #[test]
    fn test_split_without_markers_is_one_block() {
        let blocks = DiagramSource::split("A -> B\nB -> A");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let blocks = DiagramSource::split("@startuml\nA -> B\nB -> C");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_tabs_become_spaces() {
        let source = DiagramSource::single("\tA ->\tB : a\tb\t");
        let texts: Vec<_> = source.texts().collect();
        assert_eq!(texts, vec!["A -> B : a b"]);
    }

    #[test]
    fn test_single_line_block_comment() {
        let source = DiagramSource::single("/' note '/\nA -> B");
        assert_eq!(source.lines.len(), 1);
    }

    #[test]
    fn test_display_lines() {
        assert_eq!(display_lines("one\\ntwo"), vec!["one", "two"]);
        assert_eq!(display_lines(""), vec![""]);
    }
}
