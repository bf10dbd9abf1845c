//! Timing diagram command table

use tracing::{debug, span, Level};

use super::database::{NotePosition, PlayerKind, TimeTick, TimingDatabase};
use crate::core::grammar::{
    capture, color, concat, lit, one_of, optional, or, quoted, space, space1,
};
use crate::core::{
    register_common_commands, Captures, CharClass, Color, CommandError, CommandRegistry,
    Database, DiagramResult, DiagramSource, Parser,
};

/// Parser for timing diagram text
#[derive(Debug)]
pub struct TimingParser {
    registry: CommandRegistry<TimingDatabase>,
}

impl TimingParser {
    pub fn new() -> Self {
        Self {
            registry: timing_commands(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry<TimingDatabase> {
        &self.registry
    }
}

impl Default for TimingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<TimingDatabase> for TimingParser {
    fn parse(&self, source: &DiagramSource, database: &mut TimingDatabase) -> DiagramResult<()> {
        let parse_span = span!(
            Level::DEBUG,
            "parse_timing",
            diagram = source.index,
            lines = source.lines.len()
        );
        let _enter = parse_span.enter();

        self.registry.execute_all(database, &source.lines)?;

        debug!(
            players = database.entity_count(),
            events = database.event_count(),
            "Timing diagram parsed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "timing"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, line: &str) -> bool {
        self.registry.find(line).is_some()
    }
}

/// Build the timing diagram command table
pub fn timing_commands() -> CommandRegistry<TimingDatabase> {
    let mut registry = CommandRegistry::new();
    register_common_commands(&mut registry);

    registry.register(
        "player",
        concat(vec![
            one_of("TYPE", &["robust", "concise"]),
            space1(),
            or(vec![
                concat(vec![
                    quoted("NAME"),
                    space1(),
                    lit("as"),
                    space1(),
                    capture("CODE1", CharClass::Word),
                ]),
                capture("CODE2", CharClass::Word),
            ]),
        ]),
        player,
    );

    registry.register(
        "time",
        concat(vec![
            lit("@"),
            optional(one_of("RELATIVE", &["+"])),
            capture("TIME", CharClass::Digits),
        ]),
        time,
    );

    registry.register(
        "state",
        concat(vec![
            capture("CODE", CharClass::Word),
            space1(),
            lit("is"),
            space1(),
            or(vec![
                quoted("STATE1"),
                capture("STATE2", CharClass::Except(vec!['#'])),
            ]),
            space(),
            optional(color("COLOR")),
        ]),
        state,
    );

    registry.register(
        "note",
        concat(vec![
            lit("note"),
            space1(),
            one_of("POSITION", &["top of", "bottom of"]),
            space1(),
            capture("CODE", CharClass::Word),
            space(),
            lit(":"),
            space(),
            optional(capture("TEXT", CharClass::Any)),
        ]),
        note,
    );

    registry
}

fn player(db: &mut TimingDatabase, captures: &Captures) -> Result<(), CommandError> {
    let keyword = captures.get("TYPE").unwrap_or_default();
    let kind = PlayerKind::from_keyword(keyword)
        .ok_or_else(|| CommandError::new(format!("Unknown player type : {}", keyword)))?;
    let code = captures
        .first_of(&["CODE1", "CODE2"])
        .ok_or_else(|| CommandError::new("Player needs a name"))?;
    db.declare_player(code, captures.get("NAME"), kind)
}

fn time(db: &mut TimingDatabase, captures: &Captures) -> Result<(), CommandError> {
    let text = captures.get("TIME").unwrap_or_default();
    let value: i64 = text
        .parse()
        .map_err(|_| CommandError::new(format!("Bad time : {}", text)))?;
    if captures.contains("RELATIVE") {
        db.advance_time(value)?;
    } else {
        db.set_time(TimeTick(value));
    }
    Ok(())
}

fn state(db: &mut TimingDatabase, captures: &Captures) -> Result<(), CommandError> {
    let code = captures.get("CODE").unwrap_or_default();
    let state = captures
        .first_of(&["STATE1", "STATE2"])
        .map(str::trim)
        .unwrap_or_default();
    if state.is_empty() {
        return Err(CommandError::new(format!("Empty state for {}", code)));
    }
    let color = captures
        .get("COLOR")
        .map(Color::parse)
        .transpose()
        .map_err(CommandError::from)?;
    db.change_state(code, state, color)
}

fn note(db: &mut TimingDatabase, captures: &Captures) -> Result<(), CommandError> {
    let position = if captures
        .get("POSITION")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .starts_with("top")
    {
        NotePosition::Top
    } else {
        NotePosition::Bottom
    };
    let code = captures.get("CODE").unwrap_or_default();
    let text = captures.get("TEXT").unwrap_or_default().trim();
    db.add_note(code, text, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DiagramError;
    use crate::plugins::timing::database::TimingEvent;

    fn parse(input: &str) -> DiagramResult<TimingDatabase> {
        let mut db = TimingDatabase::new();
        TimingParser::new().parse(&DiagramSource::single(input), &mut db)?;
        Ok(db)
    }

    #[test]
    fn test_players() {
        let db = parse("robust \"Web Browser\" as WB\nconcise DNS").unwrap();
        let players = db.players();
        assert_eq!(players[0].code, "WB");
        assert_eq!(players[0].display, "Web Browser");
        assert_eq!(players[0].kind, PlayerKind::Robust);
        assert_eq!(players[1].display, "DNS");
        assert_eq!(players[1].kind, PlayerKind::Concise);
    }

    #[test]
    fn test_states_and_time() {
        let db = parse(
            "concise \"Client\" as C\n@0\nC is Idle\n@+5\nC is \"Busy now\" #red\n@20\nC is Done",
        )
        .unwrap();
        let states: Vec<_> = db
            .states_of("C")
            .iter()
            .map(|c| (c.tick.0, c.state.clone(), c.color))
            .collect();
        assert_eq!(
            states,
            vec![
                (0, "Idle".to_string(), None),
                (5, "Busy now".to_string(), Some(Color::RED)),
                (20, "Done".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_notes() {
        let db = parse("robust WB\n@3\nnote top of WB : hello\nnote bottom of WB : bye").unwrap();
        let notes: Vec<_> = db.notes_of("WB").map(|n| (n.position, n.text.as_str())).collect();
        assert_eq!(
            notes,
            vec![(NotePosition::Top, "hello"), (NotePosition::Bottom, "bye")]
        );
        assert!(db
            .events()
            .all(|event| matches!(event, TimingEvent::Note(n) if n.tick == TimeTick(3))));
    }

    #[test]
    fn test_state_before_time_is_semantic_error() {
        let error = parse("robust WB\nWB is Idle").unwrap_err();
        match error {
            DiagramError::SemanticViolation {
                message, location, ..
            } => {
                assert_eq!(message, "No time defined, use @");
                assert_eq!(location.line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_relative_time_overflow_is_semantic_error() {
        let error = parse("concise C\n@9223372036854775807\n@+1\nC is On").unwrap_err();
        match error {
            DiagramError::SemanticViolation {
                message, location, ..
            } => {
                assert!(message.starts_with("Time overflow"), "{message}");
                assert_eq!(location.line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let db = parse("concise C\n@9223372036854775806\n@+1\nC is On").unwrap();
        assert_eq!(db.now(), Some(TimeTick(i64::MAX)));
    }

    #[test]
    fn test_unknown_player_is_semantic_error() {
        let error = parse("@0\nX is Idle").unwrap_err();
        assert!(error.to_string().contains("No such player : X"));
    }

    #[test]
    fn test_unknown_line_is_grammar_mismatch() {
        let error = parse("robust WB\nWB becomes Idle").unwrap_err();
        assert!(matches!(error, DiagramError::GrammarMismatch { .. }));
    }

    #[test]
    fn test_title_is_shared() {
        let db = parse("title Signals\nrobust WB").unwrap();
        assert_eq!(db.title(), Some("Signals"));
    }
}
