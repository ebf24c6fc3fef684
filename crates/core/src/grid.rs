//! Mapping of page points onto the fixed 2 x 4 panel grid.

use serde::{Deserialize, Serialize};

use crate::template::{GridTemplate, ROWS};
use crate::utils::Point;

/// Width and height of a page box in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A logical grid cell.
///
/// `area_id` is `column * 4 + row`, so area ids 0..=3 run down the left
/// column and 4..=7 down the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub column: u8,
    pub row: u8,
    pub area_id: u8,
}

impl GridCell {
    pub const fn new(column: u8, row: u8) -> Self {
        Self {
            column,
            row,
            area_id: area_id(column, row),
        }
    }

    pub const fn from_area(area_id: u8) -> Self {
        Self {
            column: area_id / ROWS,
            row: area_id % ROWS,
            area_id,
        }
    }
}

/// Area id of the cell at (`column`, `row`).
#[inline]
pub const fn area_id(column: u8, row: u8) -> u8 {
    column * ROWS + row
}

/// Row containing `y`.
///
/// Anything above the grid start belongs to row 0 and anything past the last
/// row is clamped into row 3.
pub fn row_of(y: f64, page_height: f64, template: &GridTemplate) -> u8 {
    if y < template.grid_start {
        return 0;
    }
    let row_height = template.row_height(page_height);
    if row_height <= 0.0 {
        return 0;
    }
    let raw = ((y - template.grid_start) / row_height).floor();
    raw.clamp(0.0, f64::from(ROWS - 1)) as u8
}

/// Column containing `x`: 0 left of the midline, 1 otherwise.
#[inline]
pub fn column_of(x: f64, page_width: f64) -> u8 {
    if x < page_width / 2.0 { 0 } else { 1 }
}

/// Classifies a point on a page into its grid cell.
pub fn classify(center: Point, page: PageGeometry, template: &GridTemplate) -> GridCell {
    let (x, y) = center;
    GridCell::new(column_of(x, page.width), row_of(y, page.height, template))
}
