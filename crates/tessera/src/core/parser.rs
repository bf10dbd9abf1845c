//! Core parser trait for diagram text
//!
//! A parser feeds the lines of one diagram block through its command table into a
//! database.

use super::error::DiagramResult;
use super::source::DiagramSource;
use super::Database;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use tessera::core::{DiagramSource, Parser, Database};
/// use tessera::plugins::sequence::{SequenceDatabase, SequenceParser};
///
/// let parser = SequenceParser::new();
/// let mut db = SequenceDatabase::new();
/// parser.parse(&DiagramSource::single("Alice -> Bob : hi"), &mut db).unwrap();
/// assert_eq!(db.entity_count(), 2);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Run every line of the block against the database
    ///
    /// Stops at the first failing line; the database keeps everything the earlier
    /// lines produced.
    fn parse(&self, source: &DiagramSource, database: &mut D) -> DiagramResult<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check whether some command of this parser claims the line
    fn can_parse(&self, line: &str) -> bool;
}
