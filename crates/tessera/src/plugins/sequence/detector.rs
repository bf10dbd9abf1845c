//! Sequence diagram detector
//!
//! Identifies sequence diagram syntax from the lines of a block.

use tracing::trace;

use super::database::ParticipantKind;
use crate::core::Detector;

/// Detector for sequence diagram syntax
pub struct SequenceDetector;

impl SequenceDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_message_line(line: &str) -> bool {
    ["->", "<-"].iter().any(|arrow| line.contains(arrow))
}

fn is_declaration_line(lower: &str) -> bool {
    ParticipantKind::KEYWORDS.iter().any(|keyword| {
        lower
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })
}

impl Detector for SequenceDetector {
    fn confidence(&self, input: &str) -> f64 {
        let lines: Vec<String> = input
            .lines()
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        let has_messages = lines.iter().any(|l| is_message_line(l));
        let has_declarations = lines.iter().any(|l| is_declaration_line(l));
        let has_boxes = lines.iter().any(|l| l == "end box");

        let confidence = match (has_messages, has_declarations || has_boxes) {
            (true, true) => 1.0,
            (true, false) => 0.8,
            (false, true) => 0.6,
            (false, false) => 0.0,
        };
        trace!(confidence, "SequenceDetector::confidence");
        confidence
    }

    fn diagram_type(&self) -> &'static str {
        "sequence"
    }

    fn patterns(&self) -> Vec<&'static str> {
        let mut patterns = vec!["->", "-->", "->>", "<-", "box", "end box", "note"];
        patterns.extend_from_slice(ParticipantKind::KEYWORDS);
        patterns
    }
}
