//! Sequence diagram plugin
//!
//! Participants with lifelines, messages, notes, grouping boxes, dividers and
//! page breaks.
//!
//! Syntax examples:
//! ```text
//! box "Backend" #LightBlue
//!   participant Api
//!   database Db
//! end box
//! User -> Api : request
//! Api -> Db
//! note over Api, Db : cached
//! newpage
//! Api --> User : response
//! ```

mod database;
mod detector;
mod layout;
mod parser;
mod renderer;
mod tiles;

pub use database::{
    ArrowHead, ArrowType, BoxId, BoxState, Event, GroupBox, LineStyle, Message, Note,
    NotePosition, Participant, ParticipantKind, SequenceDatabase, TaggedEvent,
};
pub use detector::SequenceDetector;
pub use layout::{
    PlacedBox, PlacedParticipant, PlacedRow, SequenceLayout, SequenceLayoutAlgorithm,
    SequencePage,
};
pub use parser::{sequence_commands, SequenceParser};
pub use renderer::SequenceRenderer;
pub use tiles::{living_spaces, LivingSpace, SequenceTile, TileContent};
