//! Core detector trait for diagram type identification
//!
//! Each diagram block is offered to every registered detector; the most
//! confident one decides which plugin builds it.

/// Core trait for diagram type detectors
///
/// # Example
/// ```
/// use tessera::core::Detector;
/// use tessera::plugins::timing::TimingDetector;
///
/// let detector = TimingDetector::new();
/// assert!(detector.detect("robust \"Web\" as WB\n@0\nWB is Idle"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the block text matches this diagram type
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the diagram type name
    fn diagram_type(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::sequence::SequenceDetector;
    use crate::plugins::timing::TimingDetector;

    #[test]
    fn test_detectors_disagree_on_typed_input() {
        let sequence = SequenceDetector::new();
        let timing = TimingDetector::new();
        let input = "concise \"Client\" as C\n@0\nC is Waiting";
        assert!(timing.confidence(input) > sequence.confidence(input));
        let input = "participant Alice\nAlice -> Bob";
        assert!(sequence.confidence(input) > timing.confidence(input));
    }

    #[test]
    fn test_diagram_types() {
        assert_eq!(SequenceDetector::new().diagram_type(), "sequence");
        assert_eq!(TimingDetector::new().diagram_type(), "timing");
        assert!(TimingDetector::new().patterns().contains(&"robust"));
    }
}
