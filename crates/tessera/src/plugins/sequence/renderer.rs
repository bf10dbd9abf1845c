//! Sequence diagram renderer
//!
//! Lays the database out, then issues draw primitives page by page against a
//! [`Surface`]. Unset colours are looked up in the diagram's skin here, never
//! earlier.

use tracing::{debug, span, Level};
use unicode_width::UnicodeWidthStr;

use super::database::{ArrowHead, ArrowType, LineStyle, SequenceDatabase};
use super::layout::{
    title_height, PlacedRow, SequenceLayout, SequenceLayoutAlgorithm, SequencePage,
};
use crate::core::{
    display_lines, ArrowDirection, ArrowHeadKind, AsciiBounder, AsciiCanvas, BoxChars,
    ColorParam, DiagramResult, LayoutAlgorithm, Position, Primitive, RenderConfig, Renderer,
    SkinParams, Stroke, Surface,
};

/// Sequence diagram renderer
#[derive(Debug, Clone, Default)]
pub struct SequenceRenderer {
    config: RenderConfig,
}

fn stroke(arrow: &ArrowType) -> Stroke {
    match arrow.line {
        LineStyle::Solid => Stroke::Solid,
        LineStyle::Dotted => Stroke::Dashed,
    }
}

fn head(arrow: &ArrowType) -> ArrowHeadKind {
    match arrow.head {
        ArrowHead::Filled => ArrowHeadKind::Filled,
        ArrowHead::Open => ArrowHeadKind::Open,
    }
}

/// Row offsets of one rendered page
struct PageFrame {
    box_top: usize,
    heads_top: usize,
    body_top: usize,
    bottom: usize,
}

impl SequenceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    fn frame(&self, layout: &SequenceLayout, page: &SequencePage) -> PageFrame {
        let box_top = title_height(page.title.as_deref());
        let heads_top = if layout.has_boxes() { box_top + 2 } else { box_top };
        let body_top = heads_top + layout.head_height + 1;
        PageFrame {
            box_top,
            heads_top,
            body_top,
            bottom: body_top + page.body_height,
        }
    }

    /// Issue every primitive of one page
    pub fn draw_page(
        &self,
        surface: &mut dyn Surface,
        layout: &SequenceLayout,
        page: &SequencePage,
        skin: &SkinParams,
    ) -> DiagramResult<()> {
        let frame = self.frame(layout, page);
        let corners = BoxChars::rectangle(self.config.style);

        if let Some(title) = &page.title {
            for (i, line) in display_lines(title).iter().enumerate() {
                let x = layout.width.saturating_sub(UnicodeWidthStr::width(line.as_str())) / 2;
                surface.draw(&Primitive::text(line.clone()), Position::new(x, i))?;
            }
        }

        for group in &layout.boxes {
            surface.draw(
                &Primitive::Rectangle {
                    width: group.right - group.left + 1,
                    height: frame.bottom - frame.box_top + 2,
                    double: true,
                    fill: Some(group.color.unwrap_or(skin.color_for(ColorParam::BoxBackground))),
                    border: Some(skin.color_for(ColorParam::BoxBorder)),
                },
                Position::new(group.left, frame.box_top),
            )?;
            let inner = group.right - group.left + 1;
            let title_width = UnicodeWidthStr::width(group.title.as_str());
            let x = group.left + inner.saturating_sub(title_width) / 2;
            surface.draw(
                &Primitive::text(group.title.clone()),
                Position::new(x, frame.box_top + 1),
            )?;
        }

        for participant in &layout.participants {
            let start = frame.heads_top + participant.height;
            surface.draw(
                &Primitive::VerticalLine {
                    length: frame.bottom + 1 - start,
                    stroke: Stroke::Dashed,
                    color: Some(skin.color_for(ColorParam::Lifeline)),
                },
                Position::new(participant.center, start),
            )?;
        }

        for participant in &layout.participants {
            surface.draw(
                &Primitive::Rectangle {
                    width: participant.width,
                    height: participant.height,
                    double: false,
                    fill: Some(
                        participant
                            .color
                            .unwrap_or(skin.color_for(ColorParam::ParticipantBackground)),
                    ),
                    border: Some(skin.color_for(ColorParam::ParticipantBorder)),
                },
                Position::new(participant.left, frame.heads_top),
            )?;
            for (i, line) in participant.lines.iter().enumerate() {
                let inner = participant.width.saturating_sub(2);
                let x = participant.left
                    + 1
                    + inner.saturating_sub(UnicodeWidthStr::width(line.as_str())) / 2;
                surface.draw(
                    &Primitive::text(line.clone()),
                    Position::new(x, frame.heads_top + 1 + i),
                )?;
            }
        }

        for row in &page.rows {
            self.draw_row(surface, row, frame.body_top, layout.width, &corners, skin)?;
        }
        Ok(())
    }

    fn draw_row(
        &self,
        surface: &mut dyn Surface,
        row: &PlacedRow,
        body_top: usize,
        width: usize,
        corners: &BoxChars,
        skin: &SkinParams,
    ) -> DiagramResult<()> {
        let arrow_color = Some(skin.color_for(ColorParam::Arrow));
        match row {
            PlacedRow::Message {
                y,
                from_x,
                to_x,
                label,
                arrow,
            } => {
                let top = body_top + y;
                let left = (*from_x).min(*to_x);
                for (i, line) in label.iter().enumerate() {
                    surface.draw(
                        &Primitive::text(line.clone()),
                        Position::new(left + 2, top + i),
                    )?;
                }
                let direction = if from_x < to_x {
                    ArrowDirection::Right
                } else {
                    ArrowDirection::Left
                };
                surface.draw(
                    &Primitive::Arrow {
                        length: from_x.abs_diff(*to_x).saturating_sub(1),
                        direction,
                        stroke: stroke(arrow),
                        head: head(arrow),
                        color: arrow_color,
                    },
                    Position::new(left + 1, top + label.len()),
                )?;
            }
            PlacedRow::SelfMessage { y, x, label, arrow } => {
                let top = body_top + y;
                let span = label.len().max(1);
                let bottom = top + span + 1;
                surface.draw(
                    &Primitive::HorizontalLine {
                        length: 3,
                        stroke: stroke(arrow),
                        color: arrow_color,
                    },
                    Position::new(x + 1, top),
                )?;
                surface.draw(
                    &Primitive::text(corners.top_right.to_string()),
                    Position::new(x + 4, top),
                )?;
                surface.draw(
                    &Primitive::VerticalLine {
                        length: span,
                        stroke: stroke(arrow),
                        color: arrow_color,
                    },
                    Position::new(x + 4, top + 1),
                )?;
                surface.draw(
                    &Primitive::Arrow {
                        length: 3,
                        direction: ArrowDirection::Left,
                        stroke: stroke(arrow),
                        head: head(arrow),
                        color: arrow_color,
                    },
                    Position::new(x + 1, bottom),
                )?;
                surface.draw(
                    &Primitive::text(corners.bottom_right.to_string()),
                    Position::new(x + 4, bottom),
                )?;
                for (i, line) in label.iter().enumerate() {
                    surface.draw(
                        &Primitive::text(line.clone()),
                        Position::new(x + 6, top + i),
                    )?;
                }
            }
            PlacedRow::Note {
                y,
                x,
                width,
                height,
                lines,
                color,
                padding,
            } => {
                let top = body_top + y;
                surface.draw(
                    &Primitive::Note {
                        width: *width,
                        height: *height,
                        fill: Some(color.unwrap_or(skin.color_for(ColorParam::NoteBackground))),
                        border: Some(skin.color_for(ColorParam::NoteBorder)),
                    },
                    Position::new(*x, top),
                )?;
                for (i, line) in lines.iter().enumerate() {
                    surface.draw(
                        &Primitive::text(line.clone()),
                        Position::new(x + 1 + padding, top + 1 + i),
                    )?;
                }
            }
            PlacedRow::Divider { y, text } => {
                let top = body_top + y;
                surface.draw(
                    &Primitive::HorizontalLine {
                        length: width,
                        stroke: Stroke::Solid,
                        color: Some(skin.color_for(ColorParam::Divider)),
                    },
                    Position::new(0, top),
                )?;
                if !text.is_empty() {
                    let label = format!("[ {} ]", text);
                    let x = width.saturating_sub(UnicodeWidthStr::width(label.as_str())) / 2;
                    surface.draw(&Primitive::text(label), Position::new(x, top))?;
                }
            }
        }
        Ok(())
    }

    /// Render every page to a canvas
    pub fn render_pages(&self, database: &SequenceDatabase) -> DiagramResult<Vec<AsciiCanvas>> {
        let layout = SequenceLayoutAlgorithm::new().layout(database, &AsciiBounder)?;
        let mut canvases = Vec::with_capacity(layout.pages.len());
        for page in &layout.pages {
            let frame = self.frame(&layout, page);
            let mut canvas =
                AsciiCanvas::with_style(layout.width, frame.bottom + 2, self.config.style);
            self.draw_page(&mut canvas, &layout, page, database.skin())?;
            canvases.push(canvas);
        }
        Ok(canvases)
    }
}

impl Renderer<SequenceDatabase> for SequenceRenderer {
    type Output = String;

    fn render(&self, database: &SequenceDatabase) -> DiagramResult<Self::Output> {
        let render_span = span!(Level::DEBUG, "render_sequence", colorize = self.config.colorize);
        let _enter = render_span.enter();

        let pages: Vec<String> = self
            .render_pages(database)?
            .iter()
            .map(|canvas| {
                if self.config.colorize {
                    canvas.to_ansi_string()
                } else {
                    canvas.to_string()
                }
            })
            .collect();
        debug!(pages = pages.len(), "Sequence diagram rendered");
        Ok(pages.join("\n\n"))
    }

    fn name(&self) -> &'static str {
        "sequence-ascii"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "ascii"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CharacterSet, Color, DiagramSource, Parser, RecordingSurface};
    use crate::plugins::sequence::SequenceParser;

    fn database(input: &str) -> SequenceDatabase {
        let mut db = SequenceDatabase::new();
        SequenceParser::new()
            .parse(&DiagramSource::single(input), &mut db)
            .unwrap();
        db
    }

    fn ascii(input: &str) -> String {
        SequenceRenderer::with_config(RenderConfig::new(CharacterSet::Ascii))
            .render(&database(input))
            .unwrap()
    }

    #[test]
    fn test_renders_heads_arrow_and_label() {
        let output = ascii("Alice -> Bob : hello");
        assert!(output.contains("Alice"));
        assert!(output.contains("Bob"));
        assert!(output.contains("hello"));
        assert!(output.contains("->"));
    }

    #[test]
    fn test_dotted_left_arrow() {
        let output = ascii("Alice -> Bob\nBob --> Alice");
        assert!(output.contains("<.."));
    }

    #[test]
    fn test_pages_are_separated() {
        let output = ascii("A -> B : one\nnewpage\nB -> A : two");
        let pages: Vec<_> = output.split("\n\n").collect();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("one") && !pages[0].contains("two"));
        assert!(pages[1].contains("two") && pages[1].contains('A'));
    }

    #[test]
    fn test_box_color_is_resolved_from_skin_at_draw_time() {
        let db = database("skinparam BoxBackgroundColor #00FF00\nbox\nparticipant A\nend box");
        let layout = SequenceLayoutAlgorithm::new().layout(&db, &AsciiBounder).unwrap();
        assert_eq!(layout.boxes[0].color, None);

        let mut surface = RecordingSurface::new();
        SequenceRenderer::new()
            .draw_page(&mut surface, &layout, &layout.pages[0], db.skin())
            .unwrap();
        let fill = surface.calls.iter().find_map(|(primitive, _)| match primitive {
            Primitive::Rectangle {
                double: true, fill, ..
            } => *fill,
            _ => None,
        });
        assert_eq!(fill, Some(Color::rgb(0, 0xFF, 0)));
    }

    #[test]
    fn test_note_and_divider() {
        let output = ascii("A -> B\nnote right of B : remember\n== Phase ==");
        assert!(output.contains("remember"));
        assert!(output.contains("[ Phase ]"));
    }

    #[test]
    fn test_self_message() {
        let output = ascii("A -> A : think");
        assert!(output.contains("think"));
        assert!(output.contains("<--+"));
    }

    #[test]
    fn test_title_is_drawn_first() {
        let output = ascii("title Checkout\nA -> B");
        assert!(output.lines().next().unwrap().contains("Checkout"));
    }

    #[test]
    fn test_colorized_output_has_escapes() {
        let db = database("A -> B : hi");
        let output = SequenceRenderer::with_config(RenderConfig::default().with_colors(true))
            .render(&db)
            .unwrap();
        assert!(output.contains('\u{1b}'));
    }
}
