//! Core database trait for diagram models
//!
//! Each diagram type stores its declared entities (participants, players) and
//! its timeline of events in its own database.

/// Core trait for diagram databases
///
/// Events are kept in timeline order. Entities are kept in declaration order,
/// which is also their left-to-right order in the layout.
pub trait Database: Send + Sync {
    /// Declared thing that events refer to
    type Entity: Clone + Send + Sync;

    /// Timeline entry
    type Event: Clone + Send + Sync;

    /// Get an entity by its code
    fn entity(&self, code: &str) -> Option<&Self::Entity>;

    /// Iterate over entities in declaration order
    fn entities(&self) -> impl Iterator<Item = &Self::Entity>;

    /// Iterate over events in timeline order
    fn events(&self) -> impl Iterator<Item = &Self::Event>;

    /// Clear all data from the database
    fn clear(&mut self);

    fn entity_count(&self) -> usize;

    fn event_count(&self) -> usize;
}
