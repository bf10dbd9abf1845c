//! Sequence diagram command table
//!
//! Every supported line form is one [`Command`](crate::core::Command): a grammar
//! plus a handler that validates its captures and mutates the
//! [`SequenceDatabase`]. Registration order is priority order.

use tracing::{debug, span, Level};

use super::database::{
    ArrowType, Message, Note, NotePosition, ParticipantKind, SequenceDatabase,
};
use crate::core::grammar::{
    capture, color, concat, lit, one_of, optional, or, quoted, space, space1,
};
use crate::core::{
    register_common_commands, Captures, CharClass, Color, CommandError, CommandRegistry,
    DiagramError, DiagramResult, DiagramSource, Parser,
};

const ARROWS: &[&str] = &["-->>", "->>", "-->", "->", "<<--", "<<-", "<--", "<-"];

/// Parser for sequence diagram text
#[derive(Debug)]
pub struct SequenceParser {
    registry: CommandRegistry<SequenceDatabase>,
}

impl SequenceParser {
    pub fn new() -> Self {
        Self {
            registry: sequence_commands(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry<SequenceDatabase> {
        &self.registry
    }
}

impl Default for SequenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser<SequenceDatabase> for SequenceParser {
    fn parse(&self, source: &DiagramSource, database: &mut SequenceDatabase) -> DiagramResult<()> {
        let parse_span = span!(
            Level::DEBUG,
            "parse_sequence",
            diagram = source.index,
            lines = source.lines.len()
        );
        let _enter = parse_span.enter();

        self.registry.execute_all(database, &source.lines)?;

        if let Err(error) = database.finish() {
            let (text, location) = match source.lines.last() {
                Some(last) => (last.text.clone(), last.location),
                None => (
                    String::new(),
                    crate::core::LineLocation::new(source.index, source.start_line),
                ),
            };
            return Err(DiagramError::semantic(error.message, text, location));
        }

        debug!(
            participants = database.participants().len(),
            events = database.tagged_events().len(),
            "Sequence diagram parsed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sequence"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, line: &str) -> bool {
        self.registry.find(line).is_some()
    }
}

/// Build the sequence diagram command table
pub fn sequence_commands() -> CommandRegistry<SequenceDatabase> {
    let mut registry = CommandRegistry::new();
    register_common_commands(&mut registry);

    registry.register(
        "box",
        concat(vec![
            lit("box"),
            optional(or(vec![
                concat(vec![space1(), quoted("NAME1")]),
                concat(vec![space1(), capture("NAME2", CharClass::Except(vec!['#']))]),
            ])),
            space(),
            optional(color("COLOR")),
        ]),
        box_start,
    );

    registry.register("end box", lit("end box"), box_end);

    registry.register(
        "participant",
        concat(vec![
            one_of("TYPE", ParticipantKind::KEYWORDS),
            space1(),
            or(vec![
                concat(vec![
                    quoted("NAME1"),
                    space1(),
                    lit("as"),
                    space1(),
                    capture("CODE1", CharClass::Word),
                ]),
                concat(vec![
                    capture("CODE2", CharClass::Word),
                    space1(),
                    lit("as"),
                    space1(),
                    quoted("NAME2"),
                ]),
                concat(vec![
                    capture("CODE3", CharClass::Word),
                    space1(),
                    lit("as"),
                    space1(),
                    capture("NAME3", CharClass::Word),
                ]),
                quoted("CODE4"),
                capture("CODE5", CharClass::Word),
            ]),
            space(),
            optional(color("COLOR")),
        ]),
        participant,
    );

    registry.register(
        "message",
        concat(vec![
            optional(concat(vec![one_of("PARALLEL", &["&"]), space()])),
            capture("FROM", CharClass::Word),
            space(),
            one_of("ARROW", ARROWS),
            space(),
            capture("TO", CharClass::Word),
            optional(concat(vec![
                space(),
                lit(":"),
                space(),
                optional(capture("LABEL", CharClass::Any)),
            ])),
        ]),
        message,
    );

    registry.register(
        "note",
        concat(vec![
            optional(concat(vec![one_of("PARALLEL", &["/"]), space()])),
            lit("note"),
            space1(),
            one_of("POSITION", &["left of", "right of", "over"]),
            space1(),
            capture("FIRST", CharClass::Word),
            optional(concat(vec![
                space(),
                lit(","),
                space(),
                capture("SECOND", CharClass::Word),
            ])),
            space(),
            optional(color("COLOR")),
            space(),
            lit(":"),
            space(),
            optional(capture("TEXT", CharClass::Any)),
        ]),
        note,
    );

    registry.register(
        "newpage",
        concat(vec![
            lit("newpage"),
            optional(concat(vec![space1(), capture("TITLE", CharClass::Any)])),
        ]),
        newpage,
    );

    registry.register(
        "divider",
        concat(vec![
            lit("=="),
            space(),
            optional(capture("TEXT", CharClass::Except(vec!['=']))),
            lit("=="),
        ]),
        divider,
    );

    registry
}

/// Parse an optional `COLOR` capture; absence means the skin default
fn optional_color(captures: &Captures) -> Result<Option<Color>, CommandError> {
    captures
        .get("COLOR")
        .map(Color::parse)
        .transpose()
        .map_err(CommandError::from)
}

fn box_start(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    let title = captures
        .first_of(&["NAME1", "NAME2"])
        .map(str::trim)
        .unwrap_or_default();
    let color = optional_color(captures)?;
    db.box_start(title, color)?;
    Ok(())
}

fn box_end(db: &mut SequenceDatabase, _: &Captures) -> Result<(), CommandError> {
    db.box_end()
}

fn participant(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    let keyword = captures.get("TYPE").unwrap_or_default();
    let kind = ParticipantKind::from_keyword(keyword)
        .ok_or_else(|| CommandError::new(format!("Unknown participant type : {}", keyword)))?;
    let code = captures
        .first_of(&["CODE1", "CODE2", "CODE3", "CODE4", "CODE5"])
        .ok_or_else(|| CommandError::new("Participant needs a name"))?;
    let display = captures.first_of(&["NAME1", "NAME2", "NAME3"]);
    let color = optional_color(captures)?;
    db.declare_participant(code, display, kind, color)
}

fn message(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    let arrow_text = captures.get("ARROW").unwrap_or_default();
    let (arrow, reversed) = ArrowType::parse(arrow_text)
        .ok_or_else(|| CommandError::new(format!("Unknown arrow : {}", arrow_text)))?;
    let from = captures.get("FROM").unwrap_or_default();
    let to = captures.get("TO").unwrap_or_default();
    let (from, to) = if reversed { (to, from) } else { (from, to) };
    let label = captures.get("LABEL").unwrap_or_default().trim();

    db.add_message(
        Message::new(from, to, label)
            .with_arrow(arrow)
            .parallel(captures.contains("PARALLEL")),
    );
    Ok(())
}

fn note(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    let position = match captures
        .get("POSITION")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .split_whitespace()
        .next()
    {
        Some("left") => NotePosition::Left,
        Some("right") => NotePosition::Right,
        _ => NotePosition::Over,
    };
    let targets: Vec<String> = ["FIRST", "SECOND"]
        .iter()
        .filter_map(|name| captures.get(name))
        .map(str::to_string)
        .collect();
    let color = optional_color(captures)?;

    db.add_note(Note {
        position,
        targets,
        text: captures.get("TEXT").unwrap_or_default().trim().to_string(),
        color,
        parallel: captures.contains("PARALLEL"),
    })
}

fn newpage(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    let title = captures
        .get("TITLE")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    db.newpage(title);
    Ok(())
}

fn divider(db: &mut SequenceDatabase, captures: &Captures) -> Result<(), CommandError> {
    db.divider(captures.get("TEXT").unwrap_or_default().trim());
    Ok(())
}
