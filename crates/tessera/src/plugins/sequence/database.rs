//! Sequence diagram database implementation
//!
//! Stores participants, grouping boxes and the timeline of events. Every event is
//! tagged at append time with the grouping box that was open, so renderers never
//! consult mutable box state.

use crate::core::{Color, CommandError, Database, SkinParams, TitledDiagram};

/// Identity of a grouping box, in opening order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub usize);

/// The single "box" flag of a sequence diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxState {
    #[default]
    Closed,
    Open(BoxId),
}

/// A titled frame around consecutive participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBox {
    pub id: BoxId,
    /// Empty when no title was given
    pub title: String,
    /// `None` means the skin's box background, looked up at draw time
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticipantKind {
    #[default]
    Participant,
    Actor,
    Boundary,
    Control,
    Entity,
    Database,
    Collections,
    Queue,
}

impl ParticipantKind {
    pub const KEYWORDS: &'static [&'static str] = &[
        "participant",
        "actor",
        "boundary",
        "control",
        "entity",
        "database",
        "collections",
        "queue",
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword.to_ascii_lowercase().as_str() {
            "participant" => ParticipantKind::Participant,
            "actor" => ParticipantKind::Actor,
            "boundary" => ParticipantKind::Boundary,
            "control" => ParticipantKind::Control,
            "entity" => ParticipantKind::Entity,
            "database" => ParticipantKind::Database,
            "collections" => ParticipantKind::Collections,
            "queue" => ParticipantKind::Queue,
            _ => return None,
        };
        Some(kind)
    }

    /// Marker drawn above the head of non-plain participants
    pub fn stereotype(&self) -> Option<&'static str> {
        match self {
            ParticipantKind::Participant => None,
            ParticipantKind::Actor => Some("actor"),
            ParticipantKind::Boundary => Some("boundary"),
            ParticipantKind::Control => Some("control"),
            ParticipantKind::Entity => Some("entity"),
            ParticipantKind::Database => Some("database"),
            ParticipantKind::Collections => Some("collections"),
            ParticipantKind::Queue => Some("queue"),
        }
    }
}

/// A participant in the sequence diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Identifier used by messages and notes
    pub code: String,
    /// Display label, may contain `\n` breaks
    pub display: String,
    pub kind: ParticipantKind,
    pub color: Option<Color>,
    pub enclosing_box: Option<BoxId>,
    /// Declared with a keyword rather than created by first use
    pub explicit: bool,
}

impl Participant {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            display: code.clone(),
            code,
            kind: ParticipantKind::default(),
            color: None,
            enclosing_box: None,
            explicit: false,
        }
    }
}

/// Line style for message arrows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
}

/// Arrow head style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHead {
    /// Filled head (`->`)
    Filled,
    /// Thin head (`->>`)
    Open,
}

/// Complete arrow type combining line and head style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowType {
    pub line: LineStyle,
    pub head: ArrowHead,
}

impl ArrowType {
    /// Decode arrow text; the second value is true when it points left
    pub fn parse(text: &str) -> Option<(Self, bool)> {
        let reversed = text.starts_with('<');
        let body = text.trim_matches(|c| c == '<' || c == '>');
        let line = match body {
            "-" => LineStyle::Solid,
            "--" => LineStyle::Dotted,
            _ => return None,
        };
        let heads = text.chars().filter(|c| *c == '<' || *c == '>').count();
        let head = match heads {
            1 => ArrowHead::Filled,
            2 => ArrowHead::Open,
            _ => return None,
        };
        Some((Self { line, head }, reversed))
    }
}

impl Default for ArrowType {
    fn default() -> Self {
        Self {
            line: LineStyle::Solid,
            head: ArrowHead::Filled,
        }
    }
}

/// A message between participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sending participant code
    pub from: String,
    /// Receiving participant code
    pub to: String,
    pub label: String,
    pub arrow: ArrowType,
    /// Shares the band of the previous row
    pub parallel: bool,
}

impl Message {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
            arrow: ArrowType::default(),
            parallel: false,
        }
    }

    pub fn with_arrow(mut self, arrow: ArrowType) -> Self {
        self.arrow = arrow;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_self_message(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePosition {
    Left,
    Right,
    Over,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub position: NotePosition,
    /// One participant, or two for a note spanning over both
    pub targets: Vec<String>,
    pub text: String,
    pub color: Option<Color>,
    pub parallel: bool,
}

/// Timeline entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BoxStart(GroupBox),
    BoxEnd(BoxId),
    /// First appearance of a participant
    Participant(String),
    Message(Message),
    Note(Note),
    Newpage { title: Option<String> },
    Divider { text: String },
}

/// An event with the box that was open when it was appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    pub event: Event,
    pub enclosing_box: Option<BoxId>,
}

/// Sequence diagram database
#[derive(Debug, Default)]
pub struct SequenceDatabase {
    participants: Vec<Participant>,
    events: Vec<TaggedEvent>,
    box_state: BoxState,
    box_count: usize,
    title: Option<String>,
    skin: SkinParams,
}

impl SequenceDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_box(&self) -> Option<BoxId> {
        match self.box_state {
            BoxState::Closed => None,
            BoxState::Open(id) => Some(id),
        }
    }

    fn push(&mut self, event: Event) {
        let enclosing_box = self.current_box();
        self.events.push(TaggedEvent {
            event,
            enclosing_box,
        });
    }

    pub fn box_state(&self) -> BoxState {
        self.box_state
    }

    pub fn is_box_pending(&self) -> bool {
        matches!(self.box_state, BoxState::Open(_))
    }

    /// Open a grouping box
    pub fn box_start(
        &mut self,
        title: impl Into<String>,
        color: Option<Color>,
    ) -> Result<BoxId, CommandError> {
        if self.is_box_pending() {
            return Err(CommandError::new("Box cannot be nested"));
        }
        let id = BoxId(self.box_count);
        self.box_count += 1;
        self.box_state = BoxState::Open(id);
        self.push(Event::BoxStart(GroupBox {
            id,
            title: title.into(),
            color,
        }));
        Ok(id)
    }

    /// Close the open grouping box
    pub fn box_end(&mut self) -> Result<(), CommandError> {
        let BoxState::Open(id) = self.box_state else {
            return Err(CommandError::new("Missing starting box"));
        };
        self.push(Event::BoxEnd(id));
        self.box_state = BoxState::Closed;
        Ok(())
    }

    /// Declare a participant with a keyword
    ///
    /// A participant already created by first use is upgraded in place and joins
    /// the open box if it had none.
    pub fn declare_participant(
        &mut self,
        code: &str,
        display: Option<&str>,
        kind: ParticipantKind,
        color: Option<Color>,
    ) -> Result<(), CommandError> {
        let open_box = self.current_box();
        if let Some(existing) = self.participants.iter_mut().find(|p| p.code == code) {
            if existing.explicit {
                return Err(CommandError::new(format!("Duplicate participant : {}", code)));
            }
            existing.explicit = true;
            existing.kind = kind;
            if let Some(display) = display {
                existing.display = display.to_string();
            }
            if color.is_some() {
                existing.color = color;
            }
            if existing.enclosing_box.is_none() {
                existing.enclosing_box = open_box;
            }
            return Ok(());
        }

        self.participants.push(Participant {
            code: code.to_string(),
            display: display.unwrap_or(code).to_string(),
            kind,
            color,
            enclosing_box: open_box,
            explicit: true,
        });
        self.push(Event::Participant(code.to_string()));
        Ok(())
    }

    /// Create a participant by first use
    pub fn ensure_participant(&mut self, code: &str) {
        if self.participant(code).is_none() {
            let mut participant = Participant::new(code);
            participant.enclosing_box = self.current_box();
            self.participants.push(participant);
            self.push(Event::Participant(code.to_string()));
        }
    }

    pub fn add_message(&mut self, message: Message) {
        self.ensure_participant(&message.from);
        self.ensure_participant(&message.to);
        self.push(Event::Message(message));
    }

    pub fn add_note(&mut self, note: Note) -> Result<(), CommandError> {
        match (note.targets.len(), note.position) {
            (1, _) | (2, NotePosition::Over) => {}
            (2, _) => {
                return Err(CommandError::new(
                    "Note over two participants needs \"over\"",
                ))
            }
            _ => return Err(CommandError::new("Note needs one or two participants")),
        }
        for target in &note.targets {
            self.ensure_participant(target);
        }
        self.push(Event::Note(note));
        Ok(())
    }

    pub fn newpage(&mut self, title: Option<String>) {
        self.push(Event::Newpage { title });
    }

    pub fn divider(&mut self, text: impl Into<String>) {
        self.push(Event::Divider { text: text.into() });
    }

    /// Check end-of-input state
    pub fn finish(&self) -> Result<(), CommandError> {
        if self.is_box_pending() {
            return Err(CommandError::new("Box is not closed"));
        }
        Ok(())
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, code: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.code == code)
    }

    /// Get participant index (for layout)
    pub fn participant_index(&self, code: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.code == code)
    }

    pub fn tagged_events(&self) -> &[TaggedEvent] {
        &self.events
    }

    /// Grouping boxes in opening order
    pub fn boxes(&self) -> impl Iterator<Item = &GroupBox> {
        self.events.iter().filter_map(|tagged| match &tagged.event {
            Event::BoxStart(group) => Some(group),
            _ => None,
        })
    }

    pub fn members_of(&self, id: BoxId) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(move |p| p.enclosing_box == Some(id))
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.events.iter().filter_map(|tagged| match &tagged.event {
            Event::Message(message) => Some(message),
            _ => None,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn skin(&self) -> &SkinParams {
        &self.skin
    }
}

impl TitledDiagram for SequenceDatabase {
    fn set_title(&mut self, title: String) {
        self.title = Some(title);
    }

    fn skin_mut(&mut self) -> &mut SkinParams {
        &mut self.skin
    }
}

impl Database for SequenceDatabase {
    type Entity = Participant;
    type Event = TaggedEvent;

    fn entity(&self, code: &str) -> Option<&Self::Entity> {
        self.participant(code)
    }

    fn entities(&self) -> impl Iterator<Item = &Self::Entity> {
        self.participants.iter()
    }

    fn events(&self) -> impl Iterator<Item = &Self::Event> {
        self.events.iter()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn entity_count(&self) -> usize {
        self.participants.len()
    }

    fn event_count(&self) -> usize {
        self.events.len()
    }
}
