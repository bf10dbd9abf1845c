//! Plugin orchestrator for coordinating the diagram processing pipeline
//!
//! The orchestrator runs every diagram block through its own pipeline:
//! Detector → Parser → Database → Layout → Renderer
//!
//! Blocks share nothing. A user error stops only the block it occurs in; an
//! internal layout error stops the whole run.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, error, info, span, trace, warn, Level};

use crate::core::{
    DiagramError, DiagramResult, DiagramSource, Detector, Parser, RenderConfig, Renderer,
};
use crate::plugins::sequence::{
    SequenceDatabase, SequenceDetector, SequenceParser, SequenceRenderer,
};
use crate::plugins::timing::{TimingDatabase, TimingDetector, TimingParser, TimingRenderer};

/// Diagram type used when no detector is confident
pub const DEFAULT_DIAGRAM_TYPE: &str = "sequence";

/// A parsed diagram model of any supported type
#[derive(Debug)]
pub enum Diagram {
    Sequence(SequenceDatabase),
    Timing(TimingDatabase),
}

impl Diagram {
    pub fn diagram_type(&self) -> &'static str {
        match self {
            Diagram::Sequence(_) => "sequence",
            Diagram::Timing(_) => "timing",
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceDatabase> {
        match self {
            Diagram::Sequence(db) => Some(db),
            Diagram::Timing(_) => None,
        }
    }

    pub fn as_timing(&self) -> Option<&TimingDatabase> {
        match self {
            Diagram::Timing(db) => Some(db),
            Diagram::Sequence(_) => None,
        }
    }
}

/// Outcome of parsing one block
///
/// On failure `diagram` still holds everything the lines before the failing
/// one produced.
#[derive(Debug)]
pub struct DiagramBuild {
    /// Position of the block in the input
    pub index: usize,
    pub diagram: Option<Diagram>,
    pub error: Option<DiagramError>,
    /// Grammar listing of the block's commands, filled on a grammar mismatch
    pub expected: Vec<String>,
}

impl DiagramBuild {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Plugin orchestrator that coordinates the entire pipeline
pub struct Orchestrator {
    detectors: HashMap<String, Box<dyn Detector>>,
    sequence_parser: SequenceParser,
    timing_parser: TimingParser,
    config: RenderConfig,
}

impl Orchestrator {
    /// Create an orchestrator with no detectors
    ///
    /// Every block then falls back to [`DEFAULT_DIAGRAM_TYPE`].
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            detectors: HashMap::new(),
            sequence_parser: SequenceParser::new(),
            timing_parser: TimingParser::new(),
            config,
        }
    }

    /// Create an orchestrator with the sequence and timing detectors registered
    pub fn with_all_plugins(config: RenderConfig) -> Self {
        let mut orchestrator = Self::with_config(config);
        orchestrator.register_default_detectors();
        orchestrator
    }

    pub fn register_default_detectors(&mut self) {
        self.register_detector("sequence".to_string(), Box::new(SequenceDetector::new()));
        self.register_detector("timing".to_string(), Box::new(TimingDetector::new()));
    }

    /// Register a detector plugin
    pub fn register_detector(&mut self, name: String, detector: Box<dyn Detector>) {
        self.detectors.insert(name, detector);
    }

    /// Registered detector names, sorted
    pub fn get_detectors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.detectors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn config(&self) -> RenderConfig {
        self.config
    }

    /// Most confident detector's diagram type, if any detects the text
    ///
    /// Ties go to the detector registered under the smaller name.
    pub fn detect_diagram_type(&self, input: &str) -> Option<&'static str> {
        let detect_span = span!(Level::DEBUG, "detect_diagram_type", input_len = input.len());
        let _enter = detect_span.enter();

        let mut best: Option<(f64, &str, &dyn Detector)> = None;
        for (name, detector) in &self.detectors {
            let confidence = detector.confidence(input);
            trace!(detector = name.as_str(), confidence, "Checking detector");
            if !detector.detect(input) {
                continue;
            }
            let better = match best {
                None => true,
                Some((top, top_name, _)) => {
                    confidence > top || (confidence == top && name.as_str() < top_name)
                }
            };
            if better {
                best = Some((confidence, name.as_str(), detector.as_ref()));
            }
        }

        match best {
            Some((confidence, name, detector)) => {
                debug!(detector = name, confidence, "Detected diagram type");
                Some(detector.diagram_type())
            }
            None => {
                debug!("No detector matched");
                None
            }
        }
    }

    /// Parse one block
    pub fn build(&self, source: &DiagramSource) -> DiagramBuild {
        let build_span = span!(Level::INFO, "build_diagram", diagram = source.index);
        let _enter = build_span.enter();

        let text = source.texts().collect::<Vec<_>>().join("\n");
        let diagram_type = self.detect_diagram_type(&text).unwrap_or_else(|| {
            debug!(fallback = DEFAULT_DIAGRAM_TYPE, "Using default diagram type");
            DEFAULT_DIAGRAM_TYPE
        });

        let (diagram, error, expected) = match diagram_type {
            "sequence" => {
                let mut db = SequenceDatabase::new();
                let error = self.sequence_parser.parse(source, &mut db).err();
                let expected = hints(&error, || self.sequence_parser.registry().describe());
                (Some(Diagram::Sequence(db)), error, expected)
            }
            "timing" => {
                let mut db = TimingDatabase::new();
                let error = self.timing_parser.parse(source, &mut db).err();
                let expected = hints(&error, || self.timing_parser.registry().describe());
                (Some(Diagram::Timing(db)), error, expected)
            }
            other => {
                warn!(diagram_type = other, "No plugin for detected type");
                let error = DiagramError::UnknownDiagramType {
                    diagram_type: other.to_string(),
                };
                (None, Some(error), Vec::new())
            }
        };

        match &error {
            Some(error) => info!(%error, "Diagram build failed"),
            None => info!(diagram_type, "Diagram built"),
        }
        DiagramBuild {
            index: source.index,
            diagram,
            error,
            expected,
        }
    }

    /// Parse every block of the input independently
    pub fn build_all(&self, input: &str) -> Vec<DiagramBuild> {
        let run_span = span!(Level::INFO, "build_all", input_len = input.len());
        let _enter = run_span.enter();

        DiagramSource::split(input)
            .iter()
            .map(|source| self.build(source))
            .collect()
    }

    /// Render a successfully built diagram
    pub fn render_diagram(&self, diagram: &Diagram) -> DiagramResult<String> {
        match diagram {
            Diagram::Sequence(db) => SequenceRenderer::with_config(self.config).render(db),
            Diagram::Timing(db) => TimingRenderer::with_config(self.config).render(db),
        }
    }

    /// Build and render every block
    ///
    /// The outer error is an internal layout failure, which aborts the run.
    /// The inner results are per block.
    pub fn render_all(&self, input: &str) -> DiagramResult<Vec<DiagramResult<String>>> {
        let render_span = span!(Level::INFO, "render_all", input_len = input.len());
        let _enter = render_span.enter();

        let mut outputs = Vec::new();
        for build in self.build_all(input) {
            let output = match (build.diagram, build.error) {
                (_, Some(error)) => Err(error),
                (Some(diagram), None) => match self.render_diagram(&diagram) {
                    Err(error) if error.is_internal() => {
                        error!(diagram = build.index, %error, "Layout engine failure");
                        return Err(error);
                    }
                    result => result,
                },
                (None, None) => Err(DiagramError::render_error(format!(
                    "diagram {} has no model",
                    build.index
                ))),
            };
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// Build and render every block, failing on the first block error
    pub fn process(&self, input: &str) -> Result<String> {
        let process_span = span!(Level::INFO, "process_diagrams", input_len = input.len());
        let _enter = process_span.enter();

        let mut pages = Vec::new();
        for (index, output) in self.render_all(input)?.into_iter().enumerate() {
            pages.push(output.with_context(|| format!("diagram {} failed", index))?);
        }
        info!(diagrams = pages.len(), "Pipeline completed successfully");
        Ok(pages.join("\n\n"))
    }
}

fn hints(error: &Option<DiagramError>, describe: impl FnOnce() -> Vec<String>) -> Vec<String> {
    match error {
        Some(DiagramError::GrammarMismatch { .. }) => describe(),
        _ => Vec::new(),
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::with_all_plugins(RenderConfig::default())
    }

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = Orchestrator::new();
        assert!(orchestrator.get_detectors().is_empty());
        assert_eq!(orchestrator.detect_diagram_type("Alice -> Bob"), None);
    }

    #[test]
    fn test_default_detectors() {
        assert_eq!(orchestrator().get_detectors(), vec!["sequence", "timing"]);
    }

    #[test]
    fn test_detects_each_type() {
        let orchestrator = orchestrator();
        assert_eq!(
            orchestrator.detect_diagram_type("participant A\nA -> B"),
            Some("sequence")
        );
        assert_eq!(
            orchestrator.detect_diagram_type("robust \"Web\" as WB\n@0\nWB is Idle"),
            Some("timing")
        );
    }

    #[test]
    fn test_build_all_keeps_blocks_independent() {
        let input = "@startuml\nA -> B\n@enduml\n@startuml\nbax \"X\"\n@enduml\n\
                     @startuml\nconcise C\n@0\nC is On\n@enduml";
        let builds = orchestrator().build_all(input);
        assert_eq!(builds.len(), 3);

        assert!(builds[0].is_ok());
        let first = builds[0].diagram.as_ref().and_then(Diagram::as_sequence).unwrap();
        assert_eq!(first.messages().count(), 1);

        match &builds[1].error {
            Some(DiagramError::GrammarMismatch { location, .. }) => {
                assert_eq!(location.diagram, 1);
                assert_eq!(location.line, 5);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!builds[1].expected.is_empty());

        assert!(builds[2].is_ok());
        assert_eq!(
            builds[2].diagram.as_ref().map(Diagram::diagram_type),
            Some("timing")
        );
    }

    #[test]
    fn test_partial_model_survives_failure() {
        let builds = orchestrator().build_all("A -> B\nB -> C\nend box\nC -> D");
        let build = &builds[0];
        assert!(matches!(
            build.error,
            Some(DiagramError::SemanticViolation { .. })
        ));
        let db = build.diagram.as_ref().and_then(Diagram::as_sequence).unwrap();
        assert_eq!(db.messages().count(), 2);
    }

    #[test]
    fn test_render_all_reports_per_block() {
        let input = "@startuml\nA -> B : hi\n@enduml\n@startuml\nend box\n@enduml";
        let outputs = orchestrator().render_all(input).unwrap();
        assert_eq!(outputs.len(), 2);
        assert!(outputs[0].as_ref().unwrap().contains("hi"));
        assert!(outputs[1].is_err());
    }

    #[test]
    fn test_process_fails_on_first_bad_block() {
        let error = orchestrator()
            .process("@startuml\nA -> B\n@enduml\n@startuml\nbax \"X\"\n@enduml")
            .unwrap_err();
        assert_eq!(error.to_string(), "diagram 1 failed");
    }

    #[test]
    fn test_unknown_detected_type() {
        struct Everything;
        impl Detector for Everything {
            fn confidence(&self, _: &str) -> f64 {
                1.0
            }
            fn diagram_type(&self) -> &'static str {
                "gantt"
            }
            fn patterns(&self) -> Vec<&'static str> {
                Vec::new()
            }
        }

        let mut orchestrator = Orchestrator::new();
        orchestrator.register_detector("gantt".to_string(), Box::new(Everything));
        let builds = orchestrator.build_all("anything");
        assert!(builds[0].diagram.is_none());
        assert!(matches!(
            builds[0].error,
            Some(DiagramError::UnknownDiagramType { .. })
        ));
    }
}
