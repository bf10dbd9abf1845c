//! Timing diagram database
//!
//! Players are the horizontal tracks of the diagram. State changes and notes
//! are stamped with the current [`TimeTick`], which `@` lines move.

use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

use crate::core::{Color, CommandError, Database, SkinParams, TitledDiagram};

/// A point on the logical timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeTick(pub i64);

impl fmt::Display for TimeTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    /// One row per state, with a signal line moving between them
    Robust,
    /// One band with the state written inside
    Concise,
}

impl PlayerKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "robust" => Some(PlayerKind::Robust),
            "concise" => Some(PlayerKind::Concise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub code: String,
    pub display: String,
    pub kind: PlayerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub player: String,
    pub tick: TimeTick,
    pub state: String,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub player: String,
    pub tick: TimeTick,
    pub text: String,
    pub position: NotePosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingEvent {
    State(StateChange),
    Note(NoteEntry),
}

impl TimingEvent {
    pub fn tick(&self) -> TimeTick {
        match self {
            TimingEvent::State(change) => change.tick,
            TimingEvent::Note(note) => note.tick,
        }
    }

    pub fn player(&self) -> &str {
        match self {
            TimingEvent::State(change) => &change.player,
            TimingEvent::Note(note) => &note.player,
        }
    }
}

/// Timing diagram database
#[derive(Debug, Default)]
pub struct TimingDatabase {
    players: Vec<Player>,
    events: Vec<TimingEvent>,
    now: Option<TimeTick>,
    title: Option<String>,
    skin: SkinParams,
}

impl TimingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_player(
        &mut self,
        code: &str,
        display: Option<&str>,
        kind: PlayerKind,
    ) -> Result<(), CommandError> {
        if self.player(code).is_some() {
            return Err(CommandError::new(format!("Duplicate player : {}", code)));
        }
        self.players.push(Player {
            code: code.to_string(),
            display: display.unwrap_or(code).to_string(),
            kind,
        });
        Ok(())
    }

    /// `@n`
    pub fn set_time(&mut self, tick: TimeTick) {
        trace!(%tick, "Time set");
        self.now = Some(tick);
    }

    /// `@+n`, counted from zero when no time was set yet
    pub fn advance_time(&mut self, delta: i64) -> Result<(), CommandError> {
        let base = self.now.unwrap_or_default();
        let tick = base
            .0
            .checked_add(delta)
            .ok_or_else(|| CommandError::new(format!("Time overflow : {} + {}", base, delta)))?;
        self.set_time(TimeTick(tick));
        Ok(())
    }

    pub fn now(&self) -> Option<TimeTick> {
        self.now
    }

    fn stamp(&self, code: &str) -> Result<TimeTick, CommandError> {
        let now = self
            .now
            .ok_or_else(|| CommandError::new("No time defined, use @"))?;
        if self.player(code).is_none() {
            return Err(CommandError::new(format!("No such player : {}", code)));
        }
        Ok(now)
    }

    pub fn change_state(
        &mut self,
        code: &str,
        state: &str,
        color: Option<Color>,
    ) -> Result<(), CommandError> {
        let tick = self.stamp(code)?;
        self.events.push(TimingEvent::State(StateChange {
            player: code.to_string(),
            tick,
            state: state.to_string(),
            color,
        }));
        Ok(())
    }

    pub fn add_note(
        &mut self,
        code: &str,
        text: &str,
        position: NotePosition,
    ) -> Result<(), CommandError> {
        let tick = self.stamp(code)?;
        self.events.push(TimingEvent::Note(NoteEntry {
            player: code.to_string(),
            tick,
            text: text.to_string(),
            position,
        }));
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, code: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.code == code)
    }

    /// State changes of one player, ordered by tick
    ///
    /// A later change at the same tick replaces the earlier one.
    pub fn states_of(&self, code: &str) -> Vec<&StateChange> {
        let mut changes: Vec<&StateChange> = Vec::new();
        for event in &self.events {
            if let TimingEvent::State(change) = event {
                if change.player != code {
                    continue;
                }
                match changes.iter().position(|c| c.tick == change.tick) {
                    Some(index) => changes[index] = change,
                    None => changes.push(change),
                }
            }
        }
        changes.sort_by_key(|c| c.tick);
        changes
    }

    pub fn notes_of<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a NoteEntry> + 'a {
        self.events.iter().filter_map(move |event| match event {
            TimingEvent::Note(note) if note.player == code => Some(note),
            _ => None,
        })
    }

    /// Every tick some event uses, ascending
    pub fn ticks(&self) -> Vec<TimeTick> {
        let ticks: BTreeSet<TimeTick> = self.events.iter().map(TimingEvent::tick).collect();
        ticks.into_iter().collect()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn skin(&self) -> &SkinParams {
        &self.skin
    }
}

impl TitledDiagram for TimingDatabase {
    fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    fn skin_mut(&mut self) -> &mut SkinParams {
        &mut self.skin
    }
}

impl Database for TimingDatabase {
    type Entity = Player;
    type Event = TimingEvent;

    fn entity(&self, code: &str) -> Option<&Self::Entity> {
        self.player(code)
    }

    fn entities(&self) -> impl Iterator<Item = &Self::Entity> {
        self.players.iter()
    }

    fn events(&self) -> impl Iterator<Item = &Self::Event> {
        self.events.iter()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn entity_count(&self) -> usize {
        self.players.len()
    }

    fn event_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> TimingDatabase {
        let mut db = TimingDatabase::new();
        db.declare_player("WB", Some("Web Browser"), PlayerKind::Robust)
            .unwrap();
        db.declare_player("C", None, PlayerKind::Concise).unwrap();
        db
    }

    #[test]
    fn test_state_needs_time() {
        let mut db = database();
        let error = db.change_state("WB", "Idle", None).unwrap_err();
        assert_eq!(error.message, "No time defined, use @");
        assert_eq!(db.event_count(), 0);
    }

    #[test]
    fn test_unknown_player() {
        let mut db = database();
        db.set_time(TimeTick(0));
        let error = db.add_note("X", "hi", NotePosition::Top).unwrap_err();
        assert_eq!(error.message, "No such player : X");
    }

    #[test]
    fn test_relative_time() {
        let mut db = database();
        db.advance_time(5).unwrap();
        assert_eq!(db.now(), Some(TimeTick(5)));
        db.advance_time(10).unwrap();
        assert_eq!(db.now(), Some(TimeTick(15)));

        db.set_time(TimeTick(i64::MAX));
        assert!(db.advance_time(1).is_err());
        assert_eq!(db.now(), Some(TimeTick(i64::MAX)));
    }

    #[test]
    fn test_states_are_sorted_and_replaced() {
        let mut db = database();
        db.set_time(TimeTick(10));
        db.change_state("WB", "Busy", None).unwrap();
        db.set_time(TimeTick(0));
        db.change_state("WB", "Idle", None).unwrap();
        db.change_state("WB", "Waiting", None).unwrap();
        db.change_state("C", "On", None).unwrap();

        let states: Vec<_> = db
            .states_of("WB")
            .iter()
            .map(|c| (c.tick.0, c.state.as_str()))
            .collect();
        assert_eq!(states, vec![(0, "Waiting"), (10, "Busy")]);
        assert_eq!(db.ticks(), vec![TimeTick(0), TimeTick(10)]);
    }

    #[test]
    fn test_duplicate_player() {
        let mut db = database();
        assert!(db.declare_player("C", None, PlayerKind::Robust).is_err());
        assert_eq!(db.entity_count(), 2);
    }
}
