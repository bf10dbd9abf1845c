//! Timing diagram plugin
//!
//! Players change state at logical ticks; notes hang above or below a
//! player's signal.
//!
//! Syntax examples:
//! ```text
//! robust "Web Browser" as WB
//! concise "Client" as C
//! @0
//! WB is Idle
//! C is Waiting
//! @+100
//! WB is Processing #orange
//! note top of WB : started
//! ```

mod database;
mod detector;
mod layout;
mod note;
mod parser;
mod renderer;

pub use database::{
    NoteEntry, NotePosition, Player, PlayerKind, StateChange, TimeTick, TimingDatabase,
    TimingEvent,
};
pub use detector::TimingDetector;
pub use layout::{
    PlacedNote, PlacedPlayer, PlacedSegment, PlayerTile, TimeAxis, TimingLayout,
    TimingLayoutAlgorithm,
};
pub use note::TimingNote;
pub use parser::{timing_commands, TimingParser};
pub use renderer::TimingRenderer;
