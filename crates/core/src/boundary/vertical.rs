//! Vertical seams between the left and right columns.

use tracing::debug;

use super::{HorizontalFlags, Mark};
use crate::grid::{PageGeometry, area_id};
use crate::pack::Sequence;
use crate::template::{CONSECUTIVE_PACK_ROW, FORCED_ROWS, GridTemplate, ROWS};

const LAST_ROW: u8 = ROWS - 1;

/// True when the left cell of `row` continues the pack of the right column's
/// previous row, so the seam would only trace a diagonal step of one pack.
fn is_diagonal_merge(seq: &Sequence, page: usize, row: u8) -> bool {
    if row == 0 {
        return false;
    }
    let left = seq.dominant_pack(page, area_id(0, row));
    let right = seq.dominant_pack(page, area_id(1, row));
    let upper_right = seq.dominant_pack(page, area_id(1, row - 1));
    matches!((left, right, upper_right), (Some(l), None, Some(ur)) if l == ur)
}

fn is_consecutive(left: Option<u32>, right: Option<u32>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l.abs_diff(r) == 1)
}

fn is_forced(flags: &HorizontalFlags, page: usize, row: u8) -> bool {
    FORCED_ROWS.iter().any(|rule| {
        rule.row == row
            && rule.when_flagged.iter().all(|&a| flags.is_set(page, a))
            && !rule.unless_flagged.iter().any(|&a| flags.is_set(page, a))
    })
}

/// Decides which rows of `page` carry a vertical seam.
///
/// The consecutive-pack check on row 0 runs inside the activation loop, so a
/// row 0 it clears does not propagate into the rows below. Pages where only
/// row 0 had a seam source get no vertical marks at all, not even the row-1
/// tick that a check applied after the loop would leave behind.
pub fn active_rows(seq: &Sequence, flags: &HorizontalFlags, page: usize) -> [bool; ROWS as usize] {
    let mut active = [false; ROWS as usize];

    for row in 0..ROWS {
        let r = row as usize;
        let (left_area, right_area) = (area_id(0, row), area_id(1, row));
        let left = seq.dominant_pack(page, left_area);
        let right = seq.dominant_pack(page, right_area);

        if let (Some(l), Some(rt)) = (left, right)
            && l == rt
        {
            continue;
        }

        if flags.is_set(page, left_area) || flags.is_set(page, right_area) {
            active[r] = true;
        } else if r > 0 && active[r - 1] {
            active[r] = true;
        }

        if is_forced(flags, page, row) {
            active[r] = true;
        }

        if active[r] && is_diagonal_merge(seq, page, row) {
            active[r] = false;
        }

        if row == CONSECUTIVE_PACK_ROW && is_consecutive(left, right) {
            active[r] = false;
        }
    }

    active
}

/// True when nothing on `row` or the row below needs a full seam: no labels
/// in either column and no horizontal seam on the next row.
fn is_isolated(seq: &Sequence, flags: &HorizontalFlags, page: usize, row: u8) -> bool {
    let next = row + 1;
    let any_here = seq.has_cell(page, area_id(0, row)) || seq.has_cell(page, area_id(1, row));
    let any_next = seq.has_cell(page, area_id(0, next)) || seq.has_cell(page, area_id(1, next));
    let seam_next = flags.is_set(page, area_id(0, next)) || flags.is_set(page, area_id(1, next));
    !any_here && !any_next && !seam_next
}

/// Appends the vertical seams of one page to `marks`.
///
/// An isolated active row gets a short tick instead of a seam and ends the
/// scan for the page.
pub fn vertical_pass(
    seq: &Sequence,
    flags: &HorizontalFlags,
    page: usize,
    geometry: PageGeometry,
    template: &GridTemplate,
    marks: &mut Vec<Mark>,
) {
    let active = active_rows(seq, flags, page);
    let x = template.seam_x(geometry.width);
    let overhang = template.seam_overhang;

    for row in 0..ROWS {
        if !active[row as usize] {
            continue;
        }
        let top = template.row_edge(row, geometry.height);

        if row < LAST_ROW && is_isolated(seq, flags, page, row) {
            debug!(page, row, "vertical tick");
            marks.push(Mark::Tick {
                page,
                row,
                from: (x, top - overhang),
                to: (x, top + overhang),
            });
            break;
        }

        let bottom = if row < LAST_ROW {
            template.row_edge(row + 1, geometry.height) + overhang
        } else {
            template.grid_bottom(geometry.height)
        };
        debug!(page, row, "vertical seam");
        marks.push(Mark::VerticalSeam {
            page,
            row,
            from: (x, top - overhang),
            to: (x, bottom),
        });
    }
}
