//! Timing diagram layout
//!
//! Every used tick gets a movable column on one [`RealLine`]; state labels and
//! notes push later ticks to the right. Each player is one tile, so players
//! stack as bands, and a player's band reserves room above and below its
//! signal for the notes attached to it.

use tracing::{debug, info, span, Level};
use unicode_width::UnicodeWidthStr;

use super::database::{NotePosition, PlayerKind, StateChange, TimeTick, TimingDatabase};
use super::note::TimingNote;
use crate::core::{
    collect_constraints, display_lines, place_bands, Color, DiagramError, DiagramResult,
    HorizontalAlignment, LayoutAlgorithm, PaddingRole, RealId, RealLine, ResolvedReals,
    StringBounder, Tile,
};

/// Tick columns shared by every player
#[derive(Debug, Clone)]
pub struct TimeAxis {
    ticks: Vec<TimeTick>,
    xs: Vec<RealId>,
    end: RealId,
}

impl TimeAxis {
    /// Chain one movable column per tick after the label column
    pub fn new(ticks: Vec<TimeTick>, line: &mut RealLine, label_width: f64, gap: f64) -> Self {
        let mut xs = Vec::with_capacity(ticks.len());
        let mut previous = line.origin();
        let mut delta = label_width;
        for tick in &ticks {
            let x = line.movable(format!("tick@{}", tick), previous, delta);
            xs.push(x);
            previous = x;
            delta = gap;
        }
        let end = line.movable("timeline_end", previous, delta);
        Self { ticks, xs, end }
    }

    pub fn ticks(&self) -> &[TimeTick] {
        &self.ticks
    }

    fn index_of(&self, tick: TimeTick) -> DiagramResult<usize> {
        self.ticks
            .binary_search(&tick)
            .map_err(|_| DiagramError::layout_error(format!("tick {} has no column", tick)))
    }

    pub fn x(&self, tick: TimeTick) -> DiagramResult<RealId> {
        Ok(self.xs[self.index_of(tick)?])
    }

    /// Column right after `tick`, or the end of the timeline
    pub fn next(&self, tick: TimeTick) -> DiagramResult<RealId> {
        let index = self.index_of(tick)?;
        Ok(self.xs.get(index + 1).copied().unwrap_or(self.end))
    }

    pub fn first(&self) -> RealId {
        self.xs.first().copied().unwrap_or(self.end)
    }

    pub fn end(&self) -> RealId {
        self.end
    }
}

fn text_width(text: &str) -> f64 {
    UnicodeWidthStr::width(text) as f64
}

/// One player's band: the signal plus room for its notes
#[derive(Debug, Clone)]
pub struct PlayerTile {
    code: String,
    display: String,
    kind: PlayerKind,
    states: Vec<StateChange>,
    notes: Vec<TimingNote>,
    axis: TimeAxis,
    y: Option<f64>,
}

impl PlayerTile {
    pub fn new(
        code: &str,
        display: &str,
        kind: PlayerKind,
        states: Vec<StateChange>,
        notes: Vec<TimingNote>,
        axis: TimeAxis,
    ) -> Self {
        Self {
            code: code.to_string(),
            display: display.to_string(),
            kind,
            states,
            notes,
            axis,
            y: None,
        }
    }

    /// Distinct states in order of first appearance
    pub fn state_rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = Vec::new();
        for change in &self.states {
            if !rows.contains(&change.state) {
                rows.push(change.state.clone());
            }
        }
        rows
    }

    /// Rows taken by the name and the signal
    pub fn signal_height(&self) -> f64 {
        match self.kind {
            PlayerKind::Robust => self.state_rows().len().max(1) as f64 + 1.0,
            PlayerKind::Concise => 2.0,
        }
    }

    fn note_space(
        &self,
        position: NotePosition,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<f64> {
        let mut space: f64 = 0.0;
        for note in self.notes.iter().filter(|n| n.position() == position) {
            space = space.max(note.height(bounder)?);
        }
        Ok(space)
    }

    /// Top of the signal, below the space kept for top notes
    pub fn signal_top(&self, bounder: &dyn StringBounder) -> DiagramResult<Option<f64>> {
        match self.y {
            Some(y) => Ok(Some(y + self.note_space(NotePosition::Top, bounder)?)),
            None => Ok(None),
        }
    }

    /// Where a note sits: top notes end at the signal, bottom notes start under it
    pub fn note_y(&self, note: &TimingNote, bounder: &dyn StringBounder) -> DiagramResult<f64> {
        let top = self.signal_top(bounder)?.ok_or_else(|| {
            DiagramError::layout_error(format!("player {} read before placement", self.code))
        })?;
        Ok(match note.position() {
            NotePosition::Top => top - note.height(bounder)?,
            NotePosition::Bottom => top + self.signal_height(),
        })
    }
}

impl Tile for PlayerTile {
    fn preferred_height(&self, bounder: &dyn StringBounder) -> DiagramResult<f64> {
        Ok(self.note_space(NotePosition::Top, bounder)?
            + self.signal_height()
            + self.note_space(NotePosition::Bottom, bounder)?
            + 1.0)
    }

    fn add_constraints(
        &self,
        line: &mut RealLine,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<()> {
        if self.kind == PlayerKind::Concise {
            // `|` plus the label and a space on each side
            for change in &self.states {
                let start = self.axis.x(change.tick)?;
                let end = self.axis.next(change.tick)?;
                line.ensure_bigger_than(end, start, text_width(&change.state) + 3.0)?;
            }
        }
        for note in &self.notes {
            let start = self.axis.x(note.when())?;
            let end = self.axis.next(note.when())?;
            line.ensure_bigger_than(end, start, note.width(bounder)? + 1.0)?;
        }
        Ok(())
    }

    fn min_x(&self) -> RealId {
        self.axis.first()
    }

    fn max_x(&self) -> RealId {
        self.axis.end()
    }

    fn callback_y(&mut self, y: f64) {
        self.y = Some(y);
    }

    fn y(&self) -> Option<f64> {
        self.y
    }
}

/// Stretch of one state between two ticks
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSegment {
    pub start: usize,
    pub end: usize,
    pub state: String,
    /// `None` means the skin's timing line colour
    pub color: Option<Color>,
    /// Index into the player's state rows; always 0 for concise players
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPlayer {
    pub code: String,
    pub display: String,
    pub kind: PlayerKind,
    /// Row of the player name; the signal starts one row lower
    pub top: usize,
    pub rows: Vec<String>,
    pub segments: Vec<PlacedSegment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNote {
    pub player: String,
    pub position: NotePosition,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub lines: Vec<String>,
    pub padding: usize,
    pub fill: Color,
    pub border: Color,
    pub alignment: HorizontalAlignment,
    /// Draw a one-column shadow on the right edge
    pub shadow: bool,
}

/// Layout result for one timing diagram
#[derive(Debug, Clone, PartialEq)]
pub struct TimingLayout {
    pub title: Option<String>,
    /// Width of the player name column
    pub label_width: usize,
    pub ticks: Vec<(TimeTick, usize)>,
    pub players: Vec<PlacedPlayer>,
    pub notes: Vec<PlacedNote>,
    /// Row of the time axis
    pub axis_y: usize,
    pub width: usize,
    pub height: usize,
}

/// Rows taken by a title, blank line included
pub fn title_height(title: Option<&str>) -> usize {
    title.map_or(0, |t| display_lines(t).len() + 1)
}

/// Timing diagram layout algorithm
#[derive(Debug, Clone, Default)]
pub struct TimingLayoutAlgorithm {
    note_width: Option<usize>,
}

impl TimingLayoutAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap note text to at most `width` columns
    pub fn with_note_width(mut self, width: Option<usize>) -> Self {
        self.note_width = width;
        self
    }

    fn label_width(&self, db: &TimingDatabase) -> f64 {
        let mut width: f64 = 0.0;
        for player in db.players() {
            width = width.max(text_width(&player.display));
            if player.kind == PlayerKind::Robust {
                for change in db.states_of(&player.code) {
                    width = width.max(text_width(&change.state) + 2.0);
                }
            }
        }
        width + 2.0
    }

    /// One tile per player, in declaration order
    pub fn build_tiles(&self, db: &TimingDatabase, axis: &TimeAxis) -> Vec<PlayerTile> {
        db.players()
            .iter()
            .map(|player| {
                let states = db.states_of(&player.code).into_iter().cloned().collect();
                let notes = db
                    .notes_of(&player.code)
                    .map(|entry| {
                        TimingNote::new(entry, db.skin()).with_max_width(self.note_width)
                    })
                    .collect();
                PlayerTile::new(
                    &player.code,
                    &player.display,
                    player.kind,
                    states,
                    notes,
                    axis.clone(),
                )
            })
            .collect()
    }

    fn place_player(
        &self,
        tile: &PlayerTile,
        axis: &TimeAxis,
        reals: &ResolvedReals,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<PlacedPlayer> {
        let rows = tile.state_rows();
        let mut segments = Vec::with_capacity(tile.states.len());
        for (i, change) in tile.states.iter().enumerate() {
            let end = match tile.states.get(i + 1) {
                Some(next) => reals.cell(axis.x(next.tick)?)?,
                None => reals.cell(axis.end())?,
            };
            let row = match tile.kind {
                PlayerKind::Robust => rows.iter().position(|r| *r == change.state).unwrap_or(0),
                PlayerKind::Concise => 0,
            };
            segments.push(PlacedSegment {
                start: reals.cell(axis.x(change.tick)?)?,
                end,
                state: change.state.clone(),
                color: change.color,
                row,
            });
        }
        let top = tile.signal_top(bounder)?.unwrap_or_default();
        Ok(PlacedPlayer {
            code: tile.code.clone(),
            display: tile.display.clone(),
            kind: tile.kind,
            top: top as usize,
            rows,
            segments,
        })
    }

    fn place_notes(
        &self,
        tile: &PlayerTile,
        axis: &TimeAxis,
        reals: &ResolvedReals,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Vec<PlacedNote>> {
        tile.notes
            .iter()
            .map(|note| {
                let size = note.dimension(bounder)?;
                Ok(PlacedNote {
                    player: tile.code.clone(),
                    position: note.position(),
                    x: reals.cell(axis.x(note.when())?)?,
                    y: tile.note_y(note, bounder)?.max(0.0) as usize,
                    width: size.width as usize,
                    height: size.height as usize,
                    lines: note.lines(),
                    padding: note.padding() as usize,
                    fill: note.background(),
                    border: note.border(),
                    alignment: note.alignment(),
                    shadow: note.shadowing(),
                })
            })
            .collect()
    }
}

impl LayoutAlgorithm<TimingDatabase> for TimingLayoutAlgorithm {
    type Output = TimingLayout;

    fn layout(
        &self,
        database: &TimingDatabase,
        bounder: &dyn StringBounder,
    ) -> DiagramResult<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_timing",
            players = database.players().len()
        );
        let _enter = layout_span.enter();

        let mut line = RealLine::new();
        let label_width = self.label_width(database);
        let gap = 2.0 * database.skin().padding_for(PaddingRole::TimingTick);
        let axis = TimeAxis::new(database.ticks(), &mut line, label_width, gap);

        for tick in axis.ticks() {
            let label = tick.to_string();
            line.ensure_bigger_than(axis.next(*tick)?, axis.x(*tick)?, text_width(&label) + 1.0)?;
        }

        let mut tiles = self.build_tiles(database, &axis);
        collect_constraints(&tiles, &mut line, bounder)?;
        let reals = line.compile()?;

        let start_y = title_height(database.title()) as f64;
        let axis_y = place_bands(&mut tiles, start_y, bounder)?;

        let mut players = Vec::with_capacity(tiles.len());
        let mut notes = Vec::new();
        for tile in &tiles {
            players.push(self.place_player(tile, &axis, &reals, bounder)?);
            notes.extend(self.place_notes(tile, &axis, &reals, bounder)?);
        }

        let mut ticks = Vec::with_capacity(axis.ticks().len());
        for tick in axis.ticks() {
            ticks.push((*tick, reals.cell(axis.x(*tick)?)?));
        }
        let width = reals.cell(axis.end())? + 1;

        debug!(ticks = ticks.len(), notes = notes.len(), "Timing columns resolved");
        info!(width, height = axis_y + 2.0, "Timing layout complete");

        Ok(TimingLayout {
            title: database.title().map(str::to_string),
            label_width: label_width as usize,
            ticks,
            players,
            notes,
            axis_y: axis_y as usize,
            width,
            height: axis_y as usize + 2,
        })
    }

    fn name(&self) -> &'static str {
        "timing"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
