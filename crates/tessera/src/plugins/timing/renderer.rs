//! Timing diagram renderer

use tracing::{debug, span, Level};
use unicode_width::UnicodeWidthStr;

use super::database::{PlayerKind, TimingDatabase};
use super::layout::{PlacedNote, PlacedPlayer, TimingLayout, TimingLayoutAlgorithm};
use crate::core::{
    display_lines, AsciiBounder, AsciiCanvas, ColorParam, DiagramResult, HorizontalAlignment,
    LayoutAlgorithm, Position, Primitive, RenderConfig, Renderer, SkinParams, Stroke, Surface,
};

/// Timing diagram renderer
#[derive(Debug, Clone, Default)]
pub struct TimingRenderer {
    config: RenderConfig,
    note_width: Option<usize>,
}

impl TimingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            note_width: None,
        }
    }

    /// Wrap note text to at most `width` columns
    pub fn with_note_width(mut self, width: Option<usize>) -> Self {
        self.note_width = width;
        self
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        layout: &TimingLayout,
        skin: &SkinParams,
    ) -> DiagramResult<()> {
        if let Some(title) = &layout.title {
            for (i, line) in display_lines(title).iter().enumerate() {
                let x = layout.width.saturating_sub(UnicodeWidthStr::width(line.as_str())) / 2;
                surface.draw(&Primitive::text(line.clone()), Position::new(x, i))?;
            }
        }

        for player in &layout.players {
            self.draw_player(surface, player, layout, skin)?;
        }
        for note in &layout.notes {
            self.draw_note(surface, note)?;
        }

        if let Some((_, first)) = layout.ticks.first() {
            surface.draw(
                &Primitive::HorizontalLine {
                    length: layout.width - first,
                    stroke: Stroke::Solid,
                    color: Some(skin.color_for(ColorParam::TimingLine)),
                },
                Position::new(*first, layout.axis_y),
            )?;
        }
        for (tick, x) in &layout.ticks {
            surface.draw(&Primitive::text("+"), Position::new(*x, layout.axis_y))?;
            surface.draw(
                &Primitive::text(tick.to_string()),
                Position::new(*x, layout.axis_y + 1),
            )?;
        }
        Ok(())
    }

    fn draw_player(
        &self,
        surface: &mut dyn Surface,
        player: &PlacedPlayer,
        layout: &TimingLayout,
        skin: &SkinParams,
    ) -> DiagramResult<()> {
        let line_color = skin.color_for(ColorParam::TimingLine);
        surface.draw(
            &Primitive::text(player.display.clone()),
            Position::new(0, player.top),
        )?;

        match player.kind {
            PlayerKind::Robust => {
                for (i, state) in player.rows.iter().enumerate() {
                    let width = UnicodeWidthStr::width(state.as_str());
                    let x = layout.label_width.saturating_sub(width + 1);
                    surface.draw(
                        &Primitive::text(state.clone()),
                        Position::new(x, player.top + 1 + i),
                    )?;
                }
                let mut previous: Option<usize> = None;
                for segment in &player.segments {
                    let y = player.top + 1 + segment.row;
                    surface.draw(
                        &Primitive::HorizontalLine {
                            length: segment.end - segment.start,
                            stroke: Stroke::Solid,
                            color: Some(segment.color.unwrap_or(line_color)),
                        },
                        Position::new(segment.start, y),
                    )?;
                    if let Some(row) = previous.filter(|row| *row != segment.row) {
                        let from = row.min(segment.row);
                        let to = row.max(segment.row);
                        surface.draw(
                            &Primitive::VerticalLine {
                                length: to - from + 1,
                                stroke: Stroke::Solid,
                                color: Some(line_color),
                            },
                            Position::new(segment.start, player.top + 1 + from),
                        )?;
                    }
                    previous = Some(segment.row);
                }
            }
            PlayerKind::Concise => {
                let y = player.top + 1;
                for segment in &player.segments {
                    surface.draw(
                        &Primitive::HorizontalLine {
                            length: segment.end - segment.start,
                            stroke: Stroke::Solid,
                            color: Some(segment.color.unwrap_or(line_color)),
                        },
                        Position::new(segment.start, y),
                    )?;
                    surface.draw(&Primitive::text("|"), Position::new(segment.start, y))?;
                    surface.draw(
                        &Primitive::text(segment.state.clone()),
                        Position::new(segment.start + 2, y),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn draw_note(&self, surface: &mut dyn Surface, note: &PlacedNote) -> DiagramResult<()> {
        surface.draw(
            &Primitive::Note {
                width: note.width,
                height: note.height,
                fill: Some(note.fill),
                border: Some(note.border),
            },
            Position::new(note.x, note.y),
        )?;
        if note.shadow {
            let glyph = if self.config.style.is_ascii() { "#" } else { "░" };
            for row in note.y + 1..note.y + note.height {
                surface.draw(&Primitive::text(glyph), Position::new(note.x + note.width, row))?;
            }
        }
        let inner = note.width.saturating_sub(2 + 2 * note.padding);
        for (i, line) in note.lines.iter().enumerate() {
            let slack = inner.saturating_sub(UnicodeWidthStr::width(line.as_str()));
            let shift = match note.alignment {
                HorizontalAlignment::Left => 0,
                HorizontalAlignment::Center => slack / 2,
                HorizontalAlignment::Right => slack,
            };
            surface.draw(
                &Primitive::text(line.clone()),
                Position::new(note.x + 1 + note.padding + shift, note.y + 1 + i),
            )?;
        }
        Ok(())
    }

    pub fn render_canvas(&self, database: &TimingDatabase) -> DiagramResult<AsciiCanvas> {
        let layout = TimingLayoutAlgorithm::new()
            .with_note_width(self.note_width)
            .layout(database, &AsciiBounder)?;
        let width = layout
            .notes
            .iter()
            .map(|note| note.x + note.width)
            .fold(layout.width, usize::max);
        let mut canvas = AsciiCanvas::with_style(width, layout.height, self.config.style);
        self.draw(&mut canvas, &layout, database.skin())?;
        Ok(canvas)
    }
}

impl Renderer<TimingDatabase> for TimingRenderer {
    type Output = String;

    fn render(&self, database: &TimingDatabase) -> DiagramResult<Self::Output> {
        let render_span = span!(Level::DEBUG, "render_timing", colorize = self.config.colorize);
        let _enter = render_span.enter();

        let canvas = self.render_canvas(database)?;
        debug!("Timing diagram rendered");
        Ok(if self.config.colorize {
            canvas.to_ansi_string()
        } else {
            canvas.to_string()
        })
    }

    fn name(&self) -> &'static str {
        "timing-ascii"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "ascii"
    }
}
