//! Timing diagram detector

use tracing::trace;

use crate::core::Detector;

/// Detector for timing diagram syntax
pub struct TimingDetector;

impl TimingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimingDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_player_line(lower: &str) -> bool {
    ["robust", "concise"].iter().any(|keyword| {
        lower
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    })
}

fn is_time_line(line: &str) -> bool {
    line.strip_prefix('@')
        .map(|rest| rest.trim_start_matches('+'))
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

impl Detector for TimingDetector {
    fn confidence(&self, input: &str) -> f64 {
        let lines: Vec<String> = input
            .lines()
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        let has_players = lines.iter().any(|l| is_player_line(l));
        let has_ticks = lines.iter().any(|l| is_time_line(l));
        let has_states = lines.iter().any(|l| l.contains(" is "));

        let confidence = match (has_players, has_ticks || has_states) {
            (true, true) => 1.0,
            (true, false) => 0.7,
            (false, true) if has_ticks && has_states => 0.6,
            _ => 0.0,
        };
        trace!(confidence, "TimingDetector::confidence");
        confidence
    }

    fn diagram_type(&self) -> &'static str {
        "timing"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["robust", "concise", "@", " is ", "note top of", "note bottom of"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_scoring() {
        let detector = TimingDetector::new();
        assert_eq!(detector.confidence("robust \"Web\" as WB\n@0\nWB is Idle"), 1.0);
        assert_eq!(detector.confidence("concise C"), 0.7);
        assert_eq!(detector.confidence("@0\nC is Idle"), 0.6);
        assert_eq!(detector.confidence("Alice -> Bob"), 0.0);
        assert_eq!(detector.confidence("@startuml"), 0.0);
    }

    #[test]
    fn test_time_lines() {
        assert!(is_time_line("@12"));
        assert!(is_time_line("@+3"));
        assert!(!is_time_line("@+"));
        assert!(!is_time_line("@enduml"));
    }
}
