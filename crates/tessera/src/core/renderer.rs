//! Core renderer trait for diagram output
//!
//! A renderer lays a database out and paints the result.

use super::error::DiagramResult;
use super::Database;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use tessera::core::{DiagramSource, Parser, Renderer};
/// use tessera::plugins::sequence::{SequenceDatabase, SequenceParser, SequenceRenderer};
///
/// let mut db = SequenceDatabase::new();
/// SequenceParser::new()
///     .parse(&DiagramSource::single("Alice -> Bob : hello"), &mut db)
///     .unwrap();
/// let output = SequenceRenderer::new().render(&db).unwrap();
/// assert!(output.contains("hello"));
/// ```
pub trait Renderer<D: Database>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram database into the output format
    fn render(&self, database: &D) -> DiagramResult<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
