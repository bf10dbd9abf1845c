//! Sequence diagram tiles
//!
//! One [`LivingSpace`] per participant owns the horizontal coordinates of its head
//! and lifeline. Every timeline event becomes a [`SequenceTile`] whose extent hangs
//! from those coordinates and whose needs push them apart.

use tracing::trace;

use super::database::{
    ArrowType, BoxId, Message, Note, NotePosition, Participant, SequenceDatabase,
};
use crate::core::{
    Color, DiagramError, DiagramResult, Dimension, FontParam, PaddingRole, RealId, RealLine,
    SkinParams, StringBounder, TextBlock, Tile,
};

/// Horizontal slot of one participant
///
/// `pos_b` is the left edge of the head, `pos_c` the lifeline, `pos_d` the right
/// edge. Only `pos_b` can be pushed; the other two follow it.
#[derive(Debug, Clone)]
pub struct LivingSpace {
    pub code: String,
    pub head: TextBlock,
    /// Outer size of the head box, borders included
    pub head_size: Dimension,
    pub color: Option<Color>,
    pub enclosing_box: Option<BoxId>,
    pub pos_b: RealId,
    pub pos_c: RealId,
    pub pos_d: RealId,
}

fn head_text(participant: &Participant) -> String {
    match participant.kind.stereotype() {
        Some(stereotype) => format!("<<{}>>\\n{}", stereotype, participant.display),
        None => participant.display.clone(),
    }
}

/// Allocate the living spaces of every participant, left to right
pub fn living_spaces(
    db: &SequenceDatabase,
    line: &mut RealLine,
    bounder: &dyn StringBounder,
) -> DiagramResult<Vec<LivingSpace>> {
    let skin = db.skin();
    let padding = skin.padding_for(PaddingRole::Participant);
    let gap = skin.padding_for(PaddingRole::ParticipantGap);
    let frame = skin.padding_for(PaddingRole::Box) + 1.0;
    let font = skin.font_for(FontParam::Participant);

    let mut spaces: Vec<LivingSpace> = Vec::with_capacity(db.participants().len());
    for participant in db.participants() {
        let head = TextBlock::new(&head_text(participant), font.clone());
        let text = head.calculate_dimension(bounder)?;
        let mut width = text.width + 2.0 * padding + 2.0;

        // A lone member must hold the whole box title
        if let Some(id) = participant.enclosing_box {
            if db.members_of(id).count() == 1 {
                if let Some(group) = db.boxes().find(|g| g.id == id) {
                    let title = TextBlock::new(&group.title, skin.font_for(FontParam::Box))
                        .calculate_dimension(bounder)?;
                    width = width.max(title.width + 4.0 - 2.0 * frame);
                }
            }
        }

        let previous = spaces.last();
        let mut offset = if previous.is_some() { gap } else { 1.0 };
        let previous_box = previous.and_then(|p| p.enclosing_box);
        if previous_box != participant.enclosing_box {
            if previous_box.is_some() {
                offset += frame;
            }
            if participant.enclosing_box.is_some() {
                offset += frame;
            }
        }
        let base = previous.map_or(line.origin(), |p| p.pos_d);

        let pos_b = line.movable(format!("{}.b", participant.code), base, offset);
        let pos_c = line.anchored(
            format!("{}.c", participant.code),
            pos_b,
            (width / 2.0).floor(),
        );
        let pos_d = line.anchored(format!("{}.d", participant.code), pos_b, width - 1.0);
        trace!(code = %participant.code, width, offset, "Living space");

        spaces.push(LivingSpace {
            code: participant.code.clone(),
            head,
            head_size: Dimension::new(width, text.height + 2.0),
            color: participant.color,
            enclosing_box: participant.enclosing_box,
            pos_b,
            pos_c,
            pos_d,
        });
    }
    Ok(spaces)
}

fn index_of(db: &SequenceDatabase, code: &str) -> DiagramResult<usize> {
    db.participant_index(code)
        .ok_or_else(|| DiagramError::layout_error(format!("no living space for {}", code)))
}

/// `target >= source + gap`, registered during constraint collection
#[derive(Debug, Clone, Copy, PartialEq)]
struct Need {
    target: RealId,
    source: RealId,
    gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileContent {
    Message {
        from: usize,
        to: usize,
        label: TextBlock,
        arrow: ArrowType,
    },
    Note {
        text: TextBlock,
        color: Option<Color>,
        position: NotePosition,
        targets: Vec<usize>,
        /// Cells between the text and the frame
        padding: f64,
    },
    Newpage {
        title: Option<String>,
    },
    Divider {
        text: String,
    },
}

/// One row of the sequence timeline
#[derive(Debug, Clone)]
pub struct SequenceTile {
    pub content: TileContent,
    pub enclosing_box: Option<BoxId>,
    min_x: RealId,
    max_x: RealId,
    needs: Vec<Need>,
    parallel: bool,
    y: Option<f64>,
}

impl SequenceTile {
    fn new(content: TileContent, min_x: RealId, max_x: RealId) -> Self {
        Self {
            content,
            enclosing_box: None,
            min_x,
            max_x,
            needs: Vec::new(),
            parallel: false,
            y: None,
        }
    }

    pub fn message(
        message: &Message,
        db: &SequenceDatabase,
        spaces: &[LivingSpace],
        line: &mut RealLine,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Self> {
        let skin = db.skin();
        let from = index_of(db, &message.from)?;
        let to = index_of(db, &message.to)?;
        let label = TextBlock::new(&message.label, skin.font_for(FontParam::Arrow));
        let label_width = measured_width(&label, bounder)?;
        let content = TileContent::Message {
            from,
            to,
            label,
            arrow: message.arrow,
        };

        let mut tile = if from == to {
            let center = spaces[from].pos_c;
            let max_x = line.anchored("self.max", center, label_width + 5.0);
            let mut tile = Self::new(content, center, max_x);
            if let Some(next) = spaces.get(from + 1) {
                tile.needs.push(Need {
                    target: next.pos_b,
                    source: center,
                    gap: label_width + 7.0,
                });
            }
            tile
        } else {
            let (left, right) = (from.min(to), from.max(to));
            let padding = skin.padding_for(PaddingRole::Message);
            let mut tile = Self::new(content, spaces[left].pos_c, spaces[right].pos_c);
            tile.needs.push(Need {
                target: spaces[right].pos_c,
                source: spaces[left].pos_c,
                gap: (label_width + 2.0 * padding).max(4.0),
            });
            tile
        };
        tile.parallel = message.parallel;
        Ok(tile)
    }

    pub fn note(
        note: &Note,
        db: &SequenceDatabase,
        spaces: &[LivingSpace],
        line: &mut RealLine,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Self> {
        let skin = db.skin();
        let padding = skin.padding_for(PaddingRole::Note);
        let text = TextBlock::new(&note.text, skin.font_for(FontParam::Note));
        let box_width = text.calculate_dimension(bounder)?.width + 2.0 * padding + 2.0;

        let mut targets = Vec::with_capacity(note.targets.len());
        for code in &note.targets {
            targets.push(index_of(db, code)?);
        }
        let (first, last) = match targets.as_slice() {
            [only] => (*only, *only),
            [a, b] => (*a.min(b), *a.max(b)),
            _ => {
                return Err(DiagramError::layout_error(
                    "note without one or two targets",
                ))
            }
        };

        let origin = line.origin();
        // Lifeline on the left, with the clearance a box edge needs from it
        let (left_anchor, left_clearance) = match first.checked_sub(1) {
            Some(prev) => (spaces[prev].pos_c, 1.0),
            None => (origin, 0.0),
        };
        let next = spaces.get(last + 1).map(|s| s.pos_b);
        let base = spaces[first].pos_c;

        let mut needs = Vec::new();
        let (min_x, max_x) = match (note.position, first == last) {
            (NotePosition::Left, _) => {
                needs.push(Need {
                    target: base,
                    source: left_anchor,
                    gap: box_width + 1.0 + left_clearance,
                });
                (
                    line.anchored("note.min", base, -(box_width + 1.0)),
                    line.anchored("note.max", base, -1.0),
                )
            }
            (NotePosition::Right, _) => {
                if let Some(next) = next {
                    needs.push(Need {
                        target: next,
                        source: base,
                        gap: box_width + 2.0,
                    });
                }
                (
                    line.anchored("note.min", base, 1.0),
                    line.anchored("note.max", base, 1.0 + box_width),
                )
            }
            (NotePosition::Over, true) => {
                let half = (box_width / 2.0).floor();
                needs.push(Need {
                    target: base,
                    source: left_anchor,
                    gap: half + left_clearance,
                });
                if let Some(next) = next {
                    needs.push(Need {
                        target: next,
                        source: base,
                        gap: box_width - half + 1.0,
                    });
                }
                (
                    line.anchored("note.min", base, -half),
                    line.anchored("note.max", base, box_width - half),
                )
            }
            (NotePosition::Over, false) => {
                needs.push(Need {
                    target: base,
                    source: left_anchor,
                    gap: 2.0 + left_clearance,
                });
                let min_x = line.anchored("note.min", base, -2.0);
                let span_edge = line.anchored("note.span", spaces[last].pos_c, 3.0);
                let text_edge = line.anchored("note.text", min_x, box_width);
                let max_x = line.max("note.max", vec![span_edge, text_edge]);
                if let Some(next) = next {
                    needs.push(Need {
                        target: next,
                        source: max_x,
                        gap: 1.0,
                    });
                }
                (min_x, max_x)
            }
        };

        let mut tile = Self::new(
            TileContent::Note {
                text,
                color: note.color,
                position: note.position,
                targets,
                padding,
            },
            min_x,
            max_x,
        );
        tile.needs = needs;
        tile.parallel = note.parallel;
        Ok(tile)
    }

    /// Page break: no height and no width, pinned to the origin
    pub fn newpage(title: Option<String>, line: &RealLine) -> Self {
        let origin = line.origin();
        Self::new(TileContent::Newpage { title }, origin, origin)
    }

    pub fn divider(
        text: &str,
        line: &mut RealLine,
        bounder: &dyn StringBounder,
        skin: &SkinParams,
    ) -> DiagramResult<Self> {
        let block = TextBlock::new(text, skin.font_for(FontParam::Divider));
        let width = measured_width(&block, bounder)?;
        let origin = line.origin();
        let max_x = line.movable("divider.max", origin, width + 6.0);
        Ok(Self::new(
            TileContent::Divider {
                text: text.to_string(),
            },
            origin,
            max_x,
        ))
    }

    pub fn with_box(mut self, enclosing_box: Option<BoxId>) -> Self {
        self.enclosing_box = enclosing_box;
        self
    }
}

fn measured_width(block: &TextBlock, bounder: &dyn StringBounder) -> DiagramResult<f64> {
    if block.wrapped_lines().iter().all(|l| l.is_empty()) {
        return Ok(0.0);
    }
    Ok(block.calculate_dimension(bounder)?.width)
}

fn text_height(block: &TextBlock, bounder: &dyn StringBounder) -> DiagramResult<f64> {
    if block.wrapped_lines().iter().all(|l| l.is_empty()) {
        return Ok(0.0);
    }
    Ok(block.calculate_dimension(bounder)?.height)
}

impl Tile for SequenceTile {
    fn preferred_height(&self, bounder: &dyn StringBounder) -> DiagramResult<f64> {
        let height = match &self.content {
            TileContent::Message {
                from, to, label, ..
            } => {
                let label_height = text_height(label, bounder)?;
                if from == to {
                    label_height.max(1.0) + 3.0
                } else {
                    label_height + 2.0
                }
            }
            TileContent::Note { text, .. } => text.calculate_dimension(bounder)?.height + 3.0,
            TileContent::Newpage { .. } => 0.0,
            TileContent::Divider { .. } => 2.0,
        };
        Ok(height)
    }

    fn add_constraints(&self, line: &mut RealLine, _: &dyn StringBounder) -> DiagramResult<()> {
        for need in &self.needs {
            line.ensure_bigger_than(need.target, need.source, need.gap)?;
        }
        Ok(())
    }

    fn min_x(&self) -> RealId {
        self.min_x
    }

    fn max_x(&self) -> RealId {
        self.max_x
    }

    fn callback_y(&mut self, y: f64) {
        self.y = Some(y);
    }

    fn y(&self) -> Option<f64> {
        self.y
    }

    fn is_parallel(&self) -> bool {
        self.parallel
    }
}
