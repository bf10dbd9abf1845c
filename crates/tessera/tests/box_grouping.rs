//! Grouping boxes: pairing, event tagging and colours

use tessera::core::{
    AsciiBounder, Color, ColorParam, Database, DiagramError, DiagramSource, LayoutAlgorithm,
    Parser, SkinParams,
};
use tessera::plugins::sequence::{
    BoxState, Event, SequenceDatabase, SequenceLayoutAlgorithm, SequenceParser,
};

fn parse(input: &str) -> (SequenceDatabase, Result<(), DiagramError>) {
    let mut db = SequenceDatabase::new();
    let result = SequenceParser::new().parse(&DiagramSource::single(input), &mut db);
    (db, result)
}

#[test]
fn test_pairs_return_to_closed_and_tag_members() {
    let (db, result) = parse(
        "participant Outside\n\
         box \"First\"\n\
         participant A\n\
         A -> Outside : inside\n\
         end box\n\
         Outside -> A : after\n\
         box \"Second\"\n\
         participant B\n\
         end box",
    );
    result.unwrap();
    assert_eq!(db.box_state(), BoxState::Closed);

    let mut open = None;
    for tagged in db.tagged_events() {
        match &tagged.event {
            Event::BoxStart(group) => {
                assert_eq!(tagged.enclosing_box, Some(group.id));
                open = Some(group.id);
            }
            Event::BoxEnd(id) => {
                assert_eq!(tagged.enclosing_box, Some(*id));
                open = None;
            }
            _ => assert_eq!(tagged.enclosing_box, open, "{:?}", tagged.event),
        }
    }

    let boxes: Vec<_> = db.boxes().map(|g| g.id).collect();
    assert_eq!(boxes.len(), 2);
    let first: Vec<_> = db.members_of(boxes[0]).map(|p| p.code.as_str()).collect();
    let second: Vec<_> = db.members_of(boxes[1]).map(|p| p.code.as_str()).collect();
    assert_eq!(first, vec!["A"]);
    assert_eq!(second, vec!["B"]);
}

#[test]
fn test_nested_box_is_rejected_without_mutation() {
    let (db, result) = parse("box \"Outer\"\nparticipant A\nbox \"Inner\"\nparticipant B");
    match result.unwrap_err() {
        DiagramError::SemanticViolation {
            message,
            line,
            location,
        } => {
            assert_eq!(message, "Box cannot be nested");
            assert_eq!(line, "box \"Inner\"");
            assert_eq!(location.line, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // BoxStart and the participant; nothing from the rejected line
    assert_eq!(db.event_count(), 2);
    assert_eq!(db.boxes().count(), 1);
    assert!(db.is_box_pending());
}

#[test]
fn test_database_level_nesting_keeps_count() {
    let mut db = SequenceDatabase::new();
    db.box_start("one", None).unwrap();
    let before = db.event_count();
    assert!(db.box_start("two", None).is_err());
    assert_eq!(db.event_count(), before);
}

#[test]
fn test_end_without_start() {
    let (db, result) = parse("A -> B\nend box");
    let error = result.unwrap_err();
    assert!(error.to_string().contains("Missing starting box"));
    assert_eq!(db.box_state(), BoxState::Closed);
}

#[test]
fn test_unclosed_box_at_end_of_input() {
    let (_, result) = parse("box\nparticipant A");
    let error = result.unwrap_err();
    assert!(error.to_string().contains("Box is not closed"));
}

#[test]
fn test_titled_red_box() {
    let (db, result) = parse("box \"Label\" #FF0000\nparticipant A\nend box");
    result.unwrap();
    let group = db.boxes().next().unwrap();
    assert_eq!(group.title, "Label");
    assert_eq!(group.color, Some(Color::RED));
}

#[test]
fn test_bare_box_uses_theme_default() {
    let (db, result) = parse("box\nparticipant A\nend box");
    result.unwrap();
    let group = db.boxes().next().unwrap();
    assert_eq!(group.title, "");
    assert_eq!(group.color, None);

    let resolved = group
        .color
        .unwrap_or(db.skin().color_for(ColorParam::BoxBackground));
    assert_eq!(
        resolved,
        SkinParams::default().color_for(ColorParam::BoxBackground)
    );
}

#[test]
fn test_named_color_and_bare_title() {
    let (db, result) = parse("box Backend #LightBlue\nparticipant A\nend box");
    result.unwrap();
    let group = db.boxes().next().unwrap();
    assert_eq!(group.title, "Backend");
    assert_eq!(group.color, Color::named("LightBlue"));
}

#[test]
fn test_box_frame_encloses_members() {
    let (db, result) = parse(
        "participant Left\nbox \"Group\"\nparticipant A\nparticipant B\nend box\nparticipant Right",
    );
    result.unwrap();
    let layout = SequenceLayoutAlgorithm::new()
        .layout(&db, &AsciiBounder)
        .unwrap();
    let frame = &layout.boxes[0];
    let find = |code: &str| {
        layout
            .participants
            .iter()
            .find(|p| p.code == code)
            .unwrap()
    };
    let (left, a, b, right) = (find("Left"), find("A"), find("B"), find("Right"));
    assert!(frame.left > left.left + left.width - 1);
    assert!(frame.left < a.left);
    assert!(frame.right >= b.left + b.width - 1);
    assert!(frame.right < right.left);
}
