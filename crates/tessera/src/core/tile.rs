//! Tiles and the two layout passes
//!
//! A tile is one row of a diagram timeline. Its horizontal extent lives in a shared
//! [`RealLine`]; its vertical offset is handed to it once every tile of its band
//! has reported a height.
//!
//! Pass one is [`collect_constraints`], which lets every tile register what it
//! needs along x. The caller then compiles the line. Pass two is [`place_bands`],
//! which walks the bands top to bottom and calls back each tile with its final y.

use std::ops::Range;

use tracing::{debug, span, trace, Level};

use super::error::DiagramResult;
use super::real::{RealId, RealLine};
use super::text::StringBounder;

/// A layout unit of a timeline
pub trait Tile {
    /// Height of the content, measured through the bounder
    fn preferred_height(&self, bounder: &dyn StringBounder) -> DiagramResult<f64>;

    /// Register horizontal needs against the shared line
    fn add_constraints(&self, line: &mut RealLine, bounder: &dyn StringBounder)
        -> DiagramResult<()>;

    fn min_x(&self) -> RealId;

    fn max_x(&self) -> RealId;

    /// Receive the resolved top of the band this tile belongs to
    fn callback_y(&mut self, y: f64);

    /// Resolved y, once placed
    fn y(&self) -> Option<f64>;

    /// True when this tile shares the band of the tile before it
    fn is_parallel(&self) -> bool {
        false
    }
}

/// Pass one: gather every tile's horizontal constraints
pub fn collect_constraints<T: Tile>(
    tiles: &[T],
    line: &mut RealLine,
    bounder: &dyn StringBounder,
) -> DiagramResult<()> {
    let collect_span = span!(Level::DEBUG, "collect_constraints", tiles = tiles.len());
    let _enter = collect_span.enter();
    for tile in tiles {
        tile.add_constraints(line, bounder)?;
    }
    debug!(reals = line.len(), "Constraints collected");
    Ok(())
}

/// Index ranges of the bands, in order
///
/// A band starts at every non-parallel tile and takes the parallel tiles after it.
/// A leading parallel tile starts a band of its own.
pub fn bands<T: Tile>(tiles: &[T]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    while start < tiles.len() {
        let mut end = start + 1;
        while end < tiles.len() && tiles[end].is_parallel() {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Pass two: assign y offsets band by band, returning the y below the last band
///
/// Every tile of a band gets the band's top; the next band starts below the
/// tallest member.
pub fn place_bands<T: Tile>(
    tiles: &mut [T],
    start_y: f64,
    bounder: &dyn StringBounder,
) -> DiagramResult<f64> {
    let place_span = span!(Level::DEBUG, "place_bands", tiles = tiles.len(), start_y);
    let _enter = place_span.enter();

    let mut y = start_y;
    for band in bands(tiles) {
        let mut height: f64 = 0.0;
        for tile in &tiles[band.clone()] {
            height = height.max(tile.preferred_height(bounder)?);
        }
        for tile in &mut tiles[band.clone()] {
            tile.callback_y(y);
        }
        trace!(first = band.start, size = band.len(), y, height, "Band placed");
        y += height;
    }
    Ok(y)
}
