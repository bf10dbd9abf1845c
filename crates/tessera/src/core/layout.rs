//! Core layout trait for diagram geometry
//!
//! A layout turns a finished database into resolved tile geometry. It measures
//! text only through the given bounder and never mutates the database.

use super::error::DiagramResult;
use super::text::StringBounder;
use super::Database;

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use tessera::core::{AsciiBounder, LayoutAlgorithm};
/// use tessera::plugins::sequence::{SequenceDatabase, SequenceLayoutAlgorithm};
///
/// let db = SequenceDatabase::new();
/// let layout = SequenceLayoutAlgorithm::new().layout(&db, &AsciiBounder).unwrap();
/// assert_eq!(layout.pages.len(), 1);
/// ```
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Resolve the geometry of every element in the database
    fn layout(&self, database: &D, bounder: &dyn StringBounder) -> DiagramResult<Self::Output>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
