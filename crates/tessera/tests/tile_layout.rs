//! Tile bands, page breaks and deferred values

use proptest::prelude::*;

use tessera::core::{
    bands, place_bands, AsciiBounder, DiagramError, DiagramResult, DiagramSource,
    LayoutAlgorithm, Parser, RealId, RealLine, StringBounder, Tile,
};
use tessera::plugins::sequence::{
    PlacedRow, SequenceDatabase, SequenceLayoutAlgorithm, SequenceParser, SequenceTile,
};

/// Tile with a fixed height
struct Block {
    height: f64,
    parallel: bool,
    x: RealId,
    y: Option<f64>,
}

impl Tile for Block {
    fn preferred_height(&self, _: &dyn StringBounder) -> DiagramResult<f64> {
        Ok(self.height)
    }

    fn add_constraints(&self, _: &mut RealLine, _: &dyn StringBounder) -> DiagramResult<()> {
        Ok(())
    }

    fn min_x(&self) -> RealId {
        self.x
    }

    fn max_x(&self) -> RealId {
        self.x
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

fn blocks_strategy() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((0u8..12, any::<bool>()), 1..24)
}

fn check_band_is_never_underestimated(
    specs: Vec<(u8, bool)>,
    start: f64,
) -> Result<(), TestCaseError> {
    let line = RealLine::new();
    let mut tiles: Vec<Block> = specs
        .iter()
        .map(|(height, parallel)| Block {
            height: f64::from(*height),
            parallel: *parallel,
            x: line.origin(),
            y: None,
        })
        .collect();
    let ranges = bands(&tiles);
    let end = place_bands(&mut tiles, start, &AsciiBounder)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    let mut expected_top = start;
    for range in ranges {
        let tallest = tiles[range.clone()]
            .iter()
            .map(|t| t.height)
            .fold(0.0, f64::max);
        for tile in &tiles[range.clone()] {
            prop_assert_eq!(tile.y, Some(expected_top));
        }
        if let Some(next) = tiles.get(range.end) {
            prop_assert_eq!(next.y, Some(expected_top + tallest));
        }
        expected_top += tallest;
    }
    prop_assert_eq!(end, expected_top);
    Ok(())
}

fn check_compile_is_idempotent(deltas: Vec<(u8, u8)>) -> Result<(), TestCaseError> {
    let mut line = RealLine::new();
    let mut previous = line.origin();
    let mut ids = Vec::new();
    for (i, (delta, gap)) in deltas.iter().enumerate() {
        let id = line.movable(format!("v{}", i), previous, f64::from(*delta));
        if let Some(first) = ids.first() {
            line.ensure_bigger_than(id, *first, f64::from(*gap))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        ids.push(id);
        previous = id;
    }
    let first = line.compile().map_err(|e| TestCaseError::fail(e.to_string()))?;
    let second = line.compile().map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&first, &second);

    let values: Vec<f64> = ids.iter().map(|id| first.get(*id).unwrap_or(-1.0)).collect();
    prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

proptest! {
    #[test]
    fn band_is_never_underestimated(specs in blocks_strategy(), start in 0.0f64..50.0) {
        check_band_is_never_underestimated(specs, start.floor())?;
    }

    #[test]
    fn compile_is_idempotent(deltas in prop::collection::vec((0u8..20, 0u8..40), 1..16)) {
        check_compile_is_idempotent(deltas)?;
    }
}

fn parse(input: &str) -> SequenceDatabase {
    let mut db = SequenceDatabase::new();
    SequenceParser::new()
        .parse(&DiagramSource::single(input), &mut db)
        .unwrap();
    db
}

#[test]
fn test_newpage_tile_is_empty_and_pinned_to_origin() {
    let mut line = RealLine::new();
    let before = line.movable("content", line.origin(), 40.0);
    let tile = SequenceTile::newpage(Some("Part 2".to_string()), &line);
    assert_eq!(tile.preferred_height(&AsciiBounder).unwrap(), 0.0);
    assert_eq!(tile.min_x(), line.origin());
    assert_eq!(tile.max_x(), line.origin());

    let reals = line.compile().unwrap();
    assert_eq!(reals.get(tile.min_x()).unwrap(), 0.0);
    assert_eq!(reals.get(tile.max_x()).unwrap(), 0.0);
    assert_eq!(reals.get(before).unwrap(), 40.0);
}

#[test]
fn test_pages_restart_the_body() {
    let db = parse("A -> B : one\nA -> B : two\nnewpage Second\nB -> A : three");
    let layout = SequenceLayoutAlgorithm::new().layout(&db, &AsciiBounder).unwrap();
    assert_eq!(layout.pages.len(), 2);
    assert_eq!(layout.pages[1].title.as_deref(), Some("Second"));
    assert_eq!(layout.pages[0].rows.len(), 2);
    assert_eq!(layout.pages[1].rows.len(), 1);
    assert_eq!(layout.pages[1].rows[0].y(), 0);
}

#[test]
fn test_parallel_message_shares_band() {
    let db = parse("A -> B : one\n& B -> C : two\nA -> C : three");
    let layout = SequenceLayoutAlgorithm::new().layout(&db, &AsciiBounder).unwrap();
    let ys: Vec<usize> = layout.pages[0].rows.iter().map(PlacedRow::y).collect();
    assert_eq!(ys[0], ys[1]);
    assert!(ys[2] > ys[1]);
}

#[test]
fn test_long_label_widens_participant_gap() {
    let short = parse("A -> B : x");
    let long = parse("A -> B : a considerably longer message label");
    let width = |db: &SequenceDatabase| {
        let layout = SequenceLayoutAlgorithm::new().layout(db, &AsciiBounder).unwrap();
        layout.participants[1].center - layout.participants[0].center
    };
    assert!(width(&long) > width(&short));
    assert!(width(&long) >= "a considerably longer message label".len());
}

#[test]
fn test_cycle_is_unresolvable() {
    let mut line = RealLine::new();
    let a = line.movable("a", line.origin(), 1.0);
    let b = line.movable("b", a, 1.0);
    line.ensure_bigger_than(a, b, 1.0).unwrap();
    let error = line.compile().unwrap_err();
    assert!(matches!(error, DiagramError::LayoutUnresolvable { .. }));
    assert!(error.is_internal());
}

#[test]
fn test_anchored_constraint_moves_its_root() {
    let mut line = RealLine::new();
    let root = line.movable("root", line.origin(), 0.0);
    let anchored = line.anchored("anchored", root, 5.0);
    let wall = line.fixed("wall", 20.0);
    line.ensure_bigger_than(anchored, wall, 0.0).unwrap();
    let reals = line.compile().unwrap();
    assert_eq!(reals.get(root).unwrap(), 15.0);
    assert_eq!(reals.get(anchored).unwrap(), 20.0);
}
