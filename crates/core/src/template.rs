//! Grid template and mark style parameters.
//!
//! All constants here are calibrated against one family of floor-panel
//! diagram sheets. They are plain configuration, not derived geometry: the
//! row offsets in particular are hand-tuned corrections and must not be
//! generalized beyond the four rows they describe.

use serde::{Deserialize, Serialize};

/// Number of grid columns on every page.
pub const COLUMNS: u8 = 2;

/// Number of grid rows on every page.
pub const ROWS: u8 = 4;

/// Number of logical areas per page (`COLUMNS * ROWS`).
pub const AREAS_PER_PAGE: u8 = COLUMNS * ROWS;

/// Per-row y correction applied to the nominal row top edge, indexed by row.
pub const ROW_OFFSETS: [f64; ROWS as usize] = [7.0, -23.0, 1.0, -31.0];

/// Area id of the first row in the right-hand column.
///
/// This cell sits visually below row 0 of the left column, so its
/// horizontal seam is decided against area 0 of the same page.
pub const RIGHT_COLUMN_HEAD: u8 = ROWS;

/// A row whose vertical seam is switched on by a fixed pattern of
/// horizontal seams on the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedRow {
    pub row: u8,
    /// Areas that must all carry a horizontal seam.
    pub when_flagged: &'static [u8],
    /// Areas that must not carry a horizontal seam.
    pub unless_flagged: &'static [u8],
}

/// Vertical seam activations that the flag and propagation rules miss on
/// this template. Row 1 is forced on when areas 4 and 2 both carry a
/// horizontal seam and area 5 does not.
pub const FORCED_ROWS: &[ForcedRow] = &[ForcedRow {
    row: 1,
    when_flagged: &[4, 2],
    unless_flagged: &[5],
}];

/// Row on which adjacent dominant packs (differing by one) are treated as a
/// continuous run rather than a boundary.
pub const CONSECUTIVE_PACK_ROW: u8 = 0;

/// Fixed page template describing where the 2 x 4 grid sits on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTemplate {
    /// Distance from the top of the page to the first row edge.
    pub grid_start: f64,
    /// Height reserved at the bottom of the page.
    pub footer_height: f64,
    /// Per-row y offsets added to a row's nominal top edge.
    pub row_offsets: [f64; ROWS as usize],
    /// Inset of horizontal seams from the page's left and right edges.
    pub side_margin: f64,
    /// Offset of the vertical seam to the right of the page midline.
    pub seam_offset: f64,
    /// Distance a vertical seam reaches past the row edges it joins.
    ///
    /// Also the half-length of the short tick drawn for an isolated row.
    pub seam_overhang: f64,
}

impl Default for GridTemplate {
    fn default() -> Self {
        Self {
            grid_start: 75.0,
            footer_height: 25.0,
            row_offsets: ROW_OFFSETS,
            side_margin: 10.0,
            seam_offset: 4.0,
            seam_overhang: 3.0,
        }
    }
}

impl GridTemplate {
    /// Height of one grid row on a page of height `page_height`.
    ///
    /// May be zero or negative for pages shorter than the header and footer.
    pub fn row_height(&self, page_height: f64) -> f64 {
        (page_height - self.grid_start - self.footer_height) / f64::from(ROWS)
    }

    /// Calibrated y coordinate of the top edge of `row`.
    pub fn row_edge(&self, row: u8, page_height: f64) -> f64 {
        let offset = self.row_offsets.get(row as usize).copied().unwrap_or(0.0);
        self.grid_start + self.row_height(page_height) * f64::from(row) + offset
    }

    /// x coordinate of the vertical seam between the two columns.
    pub fn seam_x(&self, page_width: f64) -> f64 {
        page_width / 2.0 + self.seam_offset
    }

    /// Bottom of the gridded region.
    pub fn grid_bottom(&self, page_height: f64) -> f64 {
        page_height - self.footer_height
    }
}

/// RGB color with components in 0.0..=1.0.
pub type Rgb = (f64, f64, f64);

/// Stroke parameters used when compositing marks onto a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkStyle {
    pub color: Rgb,
    pub line_width: f64,
    pub line_opacity: f64,
    pub circle_radius: f64,
    pub circle_width: f64,
    pub circle_opacity: f64,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            color: (1.0, 0.0, 0.0),
            line_width: 6.0,
            line_opacity: 0.4,
            circle_radius: 25.0,
            circle_width: 1.5,
            circle_opacity: 0.3,
        }
    }
}
