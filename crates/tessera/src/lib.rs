//! Tessera - compile textual sequence and timing diagrams to text art
//!
//! Each `@startuml` ... `@enduml` block is matched line by line against a
//! command table, built into a diagram model, laid out as tiles over deferred
//! coordinates, and painted onto a character canvas.
//!
//! # Quick Start
//!
//! ```rust
//! use tessera::render;
//!
//! let ascii = render("Alice -> Bob : hello").unwrap();
//! assert!(ascii.contains("hello"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let source = DiagramSource::single("box \"Backend\"\nparticipant Api\nend box\nUser -> Api");
//!
//! // Parse into a database
//! let mut database = SequenceDatabase::new();
//! SequenceParser::new().parse(&source, &mut database).unwrap();
//! assert_eq!(database.participants().len(), 2);
//! assert_eq!(database.box_state(), BoxState::Closed);
//!
//! // Lay out and render
//! let layout = SequenceLayoutAlgorithm::new().layout(&database, &AsciiBounder).unwrap();
//! assert_eq!(layout.boxes.len(), 1);
//! let ascii = SequenceRenderer::new().render(&database).unwrap();
//! assert!(ascii.contains("Backend"));
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        AsciiBounder, CharacterSet, Database, Detector, DiagramError, DiagramSource,
        LayoutAlgorithm, Parser, RenderConfig, Renderer, SkinParams,
    };
    pub use crate::plugins::orchestrator::{Diagram, DiagramBuild, Orchestrator};
    pub use crate::plugins::sequence::{
        BoxState, SequenceDatabase, SequenceDetector, SequenceLayoutAlgorithm, SequenceParser,
        SequenceRenderer,
    };
    pub use crate::plugins::timing::{
        TimingDatabase, TimingDetector, TimingLayoutAlgorithm, TimingParser, TimingRenderer,
    };
}

/// Render every diagram block of the input with Unicode glyphs
///
/// Blocks are separated by a blank line. The first failing block fails the
/// call; use [`build_all`] to inspect blocks one by one.
///
/// # Example
/// ```rust
/// use tessera::render;
///
/// let ascii = render("@startuml\nrobust \"Web\" as WB\n@0\nWB is Idle\n@enduml").unwrap();
/// assert!(ascii.contains("Idle"));
/// ```
pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_config(input, RenderConfig::default())
}

/// Render every diagram block with a specific configuration
///
/// # Example
/// ```rust
/// use tessera::{render_with_config, CharacterSet, RenderConfig};
///
/// let ascii = render_with_config("A -> B", RenderConfig::new(CharacterSet::Ascii)).unwrap();
/// assert!(ascii.contains("->"));
/// ```
pub fn render_with_config(input: &str, config: RenderConfig) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_all_plugins(config).process(input)
}

/// Parse every block independently, keeping partial models of failed blocks
///
/// # Example
/// ```rust
/// let builds = tessera::build_all("@startuml\nA -> B\n@enduml\n@startuml\nbax \"X\"\n@enduml");
/// assert!(builds[0].is_ok());
/// assert!(!builds[1].is_ok());
/// ```
pub fn build_all(input: &str) -> Vec<plugins::orchestrator::DiagramBuild> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_all_plugins(RenderConfig::default()).build_all(input)
}

fn first_block(input: &str) -> DiagramSource {
    DiagramSource::split(input)
        .into_iter()
        .next()
        .unwrap_or_else(|| DiagramSource::single(""))
}

/// Parse the first block of the input as a sequence diagram
///
/// # Example
/// ```rust
/// use tessera::prelude::Database;
///
/// let db = tessera::parse_sequence("Alice -> Bob\nBob -> Carol").unwrap();
/// assert_eq!(db.entity_count(), 3);
/// ```
pub fn parse_sequence(input: &str) -> anyhow::Result<plugins::sequence::SequenceDatabase> {
    use crate::plugins::sequence::{SequenceDatabase, SequenceParser};

    let mut database = SequenceDatabase::new();
    SequenceParser::new().parse(&first_block(input), &mut database)?;
    Ok(database)
}

/// Parse the first block of the input as a timing diagram
///
/// # Example
/// ```rust
/// let db = tessera::parse_timing("concise C\n@0\nC is On\n@5\nC is Off").unwrap();
/// assert_eq!(db.states_of("C").len(), 2);
/// ```
pub fn parse_timing(input: &str) -> anyhow::Result<plugins::timing::TimingDatabase> {
    use crate::plugins::timing::{TimingDatabase, TimingParser};

    let mut database = TimingDatabase::new();
    TimingParser::new().parse(&first_block(input), &mut database)?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sequence() {
        let output = render("Alice -> Bob : hello").unwrap();
        assert!(output.contains("Alice"));
        assert!(output.contains("Bob"));
        assert!(output.contains("hello"));
    }

    #[test]
    fn test_render_timing() {
        let output = render("concise \"Client\" as C\n@0\nC is Waiting").unwrap();
        assert!(output.contains("Client"));
        assert!(output.contains("Waiting"));
    }

    #[test]
    fn test_render_multiple_blocks() {
        let input = "@startuml\nA -> B : first\n@enduml\n\
                     @startuml\nconcise C\n@0\nC is second\n@enduml";
        let output = render(input).unwrap();
        assert!(output.contains("first"));
        assert!(output.contains("second"));
    }

    #[test]
    fn test_render_with_config_ascii() {
        let output = render_with_config("A -> B", RenderConfig::new(CharacterSet::Ascii)).unwrap();
        assert!(output.is_ascii());
    }

    #[test]
    fn test_render_error() {
        let error = render("box\nbox").unwrap_err();
        let root = error.root_cause().to_string();
        assert!(root.contains("Box cannot be nested"), "{root}");
    }

    #[test]
    fn test_parse_sequence_reports_location() {
        let error = parse_sequence("A -> B\nbax \"X\"").unwrap_err();
        let diagram_error = error.downcast_ref::<DiagramError>().unwrap();
        assert_eq!(diagram_error.location().map(|l| l.line), Some(2));
    }

    #[test]
    fn test_parse_timing_first_block_only() {
        let db = parse_timing("@startuml\nrobust R\n@enduml\n@startuml\nrobust S\n@enduml")
            .unwrap();
        assert!(db.player("R").is_some());
        assert!(db.player("S").is_none());
    }
}
