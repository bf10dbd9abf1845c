//! Sequence diagram layout algorithm
//!
//! Builds living spaces and tiles, collects their horizontal needs into one
//! [`RealLine`], solves it, then places the tiles band by band. Pages are cut at
//! newpage tiles; every page repeats the participant header.

use tracing::{debug, info, span, Level};

use super::database::{ArrowType, BoxId, Event, SequenceDatabase};
use super::tiles::{living_spaces, LivingSpace, SequenceTile, TileContent};
use crate::core::{
    collect_constraints, display_lines, place_bands, Color, DiagramResult, FontParam,
    LayoutAlgorithm, PaddingRole, RealLine, ResolvedReals, StringBounder, TextBlock, Tile,
};

/// Participant head with resolved columns
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedParticipant {
    pub code: String,
    pub lines: Vec<String>,
    pub left: usize,
    pub center: usize,
    pub width: usize,
    pub height: usize,
    pub color: Option<Color>,
}

/// Grouping box frame with resolved columns
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    pub id: BoxId,
    pub title: String,
    /// `None` means the skin's box background
    pub color: Option<Color>,
    pub left: usize,
    pub right: usize,
}

/// A resolved timeline row; `y` is relative to the top of its page body
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedRow {
    Message {
        y: usize,
        from_x: usize,
        to_x: usize,
        label: Vec<String>,
        arrow: ArrowType,
    },
    SelfMessage {
        y: usize,
        x: usize,
        label: Vec<String>,
        arrow: ArrowType,
    },
    Note {
        y: usize,
        x: usize,
        width: usize,
        height: usize,
        lines: Vec<String>,
        color: Option<Color>,
        padding: usize,
    },
    Divider {
        y: usize,
        text: String,
    },
}

impl PlacedRow {
    pub fn y(&self) -> usize {
        match self {
            PlacedRow::Message { y, .. }
            | PlacedRow::SelfMessage { y, .. }
            | PlacedRow::Note { y, .. }
            | PlacedRow::Divider { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequencePage {
    pub title: Option<String>,
    pub rows: Vec<PlacedRow>,
    /// Rows of timeline below the header
    pub body_height: usize,
}

/// Layout result for one sequence diagram
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLayout {
    pub participants: Vec<PlacedParticipant>,
    pub boxes: Vec<PlacedBox>,
    pub pages: Vec<SequencePage>,
    pub width: usize,
    /// Tallest participant head
    pub head_height: usize,
}

impl SequenceLayout {
    pub fn has_boxes(&self) -> bool {
        !self.boxes.is_empty()
    }
}

/// Sequence diagram layout algorithm
#[derive(Debug, Clone, Default)]
pub struct SequenceLayoutAlgorithm;

impl SequenceLayoutAlgorithm {
    pub fn new() -> Self {
        Self
    }

    /// Tiles in timeline order, built against the living spaces
    pub fn build_tiles(
        &self,
        db: &SequenceDatabase,
        spaces: &[LivingSpace],
        line: &mut RealLine,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Vec<SequenceTile>> {
        let mut tiles = Vec::new();
        for tagged in db.tagged_events() {
            let tile = match &tagged.event {
                Event::Message(message) => {
                    SequenceTile::message(message, db, spaces, line, bounder)?
                }
                Event::Note(note) => SequenceTile::note(note, db, spaces, line, bounder)?,
                Event::Newpage { title } => SequenceTile::newpage(title.clone(), line),
                Event::Divider { text } => SequenceTile::divider(text, line, bounder, db.skin())?,
                Event::BoxStart(_) | Event::BoxEnd(_) | Event::Participant(_) => continue,
            };
            tiles.push(tile.with_box(tagged.enclosing_box));
        }
        Ok(tiles)
    }

    /// Box titles wider than their members push the last member right
    fn add_box_constraints(
        &self,
        db: &SequenceDatabase,
        spaces: &[LivingSpace],
        line: &mut RealLine,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<()> {
        let frame = db.skin().padding_for(PaddingRole::Box) + 1.0;
        for group in db.boxes() {
            let members: Vec<&LivingSpace> = spaces
                .iter()
                .filter(|s| s.enclosing_box == Some(group.id))
                .collect();
            if let [first, .., last] = members.as_slice() {
                let title = TextBlock::new(&group.title, db.skin().font_for(FontParam::Box))
                    .calculate_dimension(bounder)?;
                let gap = title.width + 3.0 - 2.0 * frame;
                line.ensure_bigger_than(last.pos_d, first.pos_b, gap)?;
            }
        }
        Ok(())
    }

    fn place_participants(
        &self,
        spaces: &[LivingSpace],
        reals: &ResolvedReals,
    ) -> DiagramResult<Vec<PlacedParticipant>> {
        spaces
            .iter()
            .map(|space| {
                Ok(PlacedParticipant {
                    code: space.code.clone(),
                    lines: space.head.wrapped_lines(),
                    left: reals.cell(space.pos_b)?,
                    center: reals.cell(space.pos_c)?,
                    width: space.head_size.width as usize,
                    height: space.head_size.height as usize,
                    color: space.color,
                })
            })
            .collect()
    }

    fn place_boxes(
        &self,
        db: &SequenceDatabase,
        participants: &[PlacedParticipant],
        spaces: &[LivingSpace],
    ) -> Vec<PlacedBox> {
        let frame = db.skin().padding_for(PaddingRole::Box) as usize + 1;
        db.boxes()
            .filter_map(|group| {
                let members = participants
                    .iter()
                    .zip(spaces)
                    .filter(|(_, space)| space.enclosing_box == Some(group.id))
                    .map(|(placed, _)| placed);
                let (left, right) = members.fold(None, |acc: Option<(usize, usize)>, p| {
                    let right = p.left + p.width.saturating_sub(1);
                    Some(match acc {
                        Some((l, r)) => (l.min(p.left), r.max(right)),
                        None => (p.left, right),
                    })
                })?;
                Some(PlacedBox {
                    id: group.id,
                    title: group.title.clone(),
                    color: group.color,
                    left: left.saturating_sub(frame),
                    right: right + frame,
                })
            })
            .collect()
    }

    fn place_row(
        &self,
        tile: &SequenceTile,
        reals: &ResolvedReals,
        page_top: f64,
    ) -> DiagramResult<Option<PlacedRow>> {
        let y = (tile.y().unwrap_or(page_top) - page_top).round().max(0.0) as usize;
        let min_x = reals.cell(tile.min_x())?;
        let max_x = reals.cell(tile.max_x())?;
        let row = match &tile.content {
            TileContent::Message {
                from,
                to,
                label,
                arrow,
            } => {
                let label = non_empty_lines(label.wrapped_lines());
                if from == to {
                    PlacedRow::SelfMessage {
                        y,
                        x: min_x,
                        label,
                        arrow: *arrow,
                    }
                } else {
                    let (from_x, to_x) = if from < to {
                        (min_x, max_x)
                    } else {
                        (max_x, min_x)
                    };
                    PlacedRow::Message {
                        y,
                        from_x,
                        to_x,
                        label,
                        arrow: *arrow,
                    }
                }
            }
            TileContent::Note {
                text,
                color,
                padding,
                ..
            } => {
                let lines = text.wrapped_lines();
                PlacedRow::Note {
                    y,
                    x: min_x,
                    width: max_x.saturating_sub(min_x),
                    height: lines.len() + 2,
                    lines,
                    color: *color,
                    padding: *padding as usize,
                }
            }
            TileContent::Divider { text } => PlacedRow::Divider {
                y,
                text: text.clone(),
            },
            TileContent::Newpage { .. } => return Ok(None),
        };
        Ok(Some(row))
    }
}

fn non_empty_lines(lines: Vec<String>) -> Vec<String> {
    if lines.iter().all(|l| l.is_empty()) {
        Vec::new()
    } else {
        lines
    }
}

impl LayoutAlgorithm<SequenceDatabase> for SequenceLayoutAlgorithm {
    type Output = SequenceLayout;

    fn layout(
        &self,
        database: &SequenceDatabase,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_sequence",
            participants = database.participants().len(),
            events = database.tagged_events().len()
        );
        let _enter = layout_span.enter();

        let mut line = RealLine::new();
        let spaces = living_spaces(database, &mut line, bounder)?;
        let mut tiles = self.build_tiles(database, &spaces, &mut line, bounder)?;

        // Pass one: horizontal needs, then solve
        collect_constraints(&tiles, &mut line, bounder)?;
        self.add_box_constraints(database, &spaces, &mut line, bounder)?;
        let mut edges: Vec<_> = spaces.iter().map(|s| s.pos_d).collect();
        edges.extend(tiles.iter().map(|t| t.max_x()));
        edges.push(line.origin());
        let right_edge = line.max("diagram.right", edges);
        let reals = line.compile()?;

        // Pass two: vertical placement
        let end_y = place_bands(&mut tiles, 0.0, bounder)?;
        debug!(tiles = tiles.len(), end_y, "Tiles placed");

        let participants = self.place_participants(&spaces, &reals)?;
        let boxes = self.place_boxes(database, &participants, &spaces);

        let mut pages = Vec::new();
        let mut page = SequencePage {
            title: database.title().map(str::to_string),
            rows: Vec::new(),
            body_height: 0,
        };
        let mut page_top = 0.0;
        for tile in &tiles {
            if let TileContent::Newpage { title } = &tile.content {
                let break_y = tile.y().unwrap_or(page_top);
                page.body_height = (break_y - page_top).round().max(0.0) as usize;
                pages.push(page);
                page = SequencePage {
                    title: title
                        .clone()
                        .or_else(|| database.title().map(str::to_string)),
                    rows: Vec::new(),
                    body_height: 0,
                };
                page_top = break_y;
                continue;
            }
            if let Some(row) = self.place_row(tile, &reals, page_top)? {
                page.rows.push(row);
            }
        }
        page.body_height = (end_y - page_top).round().max(0.0) as usize;
        pages.push(page);

        let box_right = boxes.iter().map(|b| b.right).max().unwrap_or(0);
        let width = reals.cell(right_edge)?.max(box_right) + 1;
        let head_height = participants.iter().map(|p| p.height).max().unwrap_or(0);

        info!(
            pages = pages.len(),
            width,
            reals = line.len(),
            "Sequence layout completed"
        );
        Ok(SequenceLayout {
            participants,
            boxes,
            pages,
            width,
            head_height,
        })
    }

    fn name(&self) -> &'static str {
        "sequence"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

/// Rows a title occupies, including the blank row below it
pub fn title_height(title: Option<&str>) -> usize {
    title.map_or(0, |t| display_lines(t).len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AsciiBounder, DiagramSource, Parser};
    use crate::plugins::sequence::SequenceParser;

    fn layout(input: &str) -> SequenceLayout {
        let mut db = SequenceDatabase::new();
        SequenceParser::new()
            .parse(&DiagramSource::single(input), &mut db)
            .unwrap();
        SequenceLayoutAlgorithm::new()
            .layout(&db, &AsciiBounder)
            .unwrap()
    }

    #[test]
    fn test_empty_layout() {
        let result = layout("");
        assert_eq!(result.pages.len(), 1);
        assert!(result.participants.is_empty());
        assert_eq!(result.pages[0].body_height, 0);
    }

    #[test]
    fn test_participants_left_to_right() {
        let result = layout("A -> B : hello\nB -> C");
        let centers: Vec<_> = result.participants.iter().map(|p| p.center).collect();
        assert!(centers.windows(2).all(|w| w[0] < w[1]));
        assert!(result.width > centers[2]);
    }

    #[test]
    fn test_rows_stack_and_parallel_rows_share_y() {
        let result = layout("A -> B : one\n& B -> C : two\nA -> C : three");
        let rows = &result.pages[0].rows;
        assert_eq!(rows[0].y(), rows[1].y());
        assert_eq!(rows[2].y(), rows[0].y() + 3);
    }

    #[test]
    fn test_newpage_splits_pages_and_resets_y() {
        let result = layout("A -> B : one\nnewpage Part two\nB -> A : two");
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[1].title.as_deref(), Some("Part two"));
        assert_eq!(result.pages[1].rows[0].y(), 0);
        assert_eq!(result.pages[0].body_height, 3);
    }

    #[test]
    fn test_message_direction() {
        let result = layout("A -> B\nB -> A");
        match (&result.pages[0].rows[0], &result.pages[0].rows[1]) {
            (
                PlacedRow::Message { from_x: a, to_x: b, .. },
                PlacedRow::Message { from_x: c, to_x: d, .. },
            ) => {
                assert!(a < b);
                assert_eq!((a, b), (d, c));
            }
            other => panic!("unexpected rows {:?}", other),
        }
    }

    #[test]
    fn test_box_frames_members() {
        let result = layout(
            "box \"Services\" #lightblue\nparticipant A\nparticipant B\nend box\nparticipant C",
        );
        let group = &result.boxes[0];
        let a = &result.participants[0];
        let b = &result.participants[1];
        let c = &result.participants[2];
        assert!(group.left < a.left);
        assert!(group.right >= b.left + b.width);
        assert!(group.right < c.left);
        assert!(group.right - group.left >= "Services".len() + 2);
    }
}
