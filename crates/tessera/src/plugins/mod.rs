//! Plugin implementations for the supported diagram types
//!
//! Each plugin implements the core traits for its own model; the orchestrator
//! picks one per diagram block. Both plugins name their note position
//! `NotePosition`, so only the orchestrator is re-exported here.

pub mod orchestrator;
pub mod sequence;
pub mod timing;

pub use orchestrator::*;
