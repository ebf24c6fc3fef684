//! Horizontal seams and secondary-label circles.

use tracing::debug;

use super::{HorizontalFlags, Mark};
use crate::grid::PageGeometry;
use crate::pack::{AreaCell, Sequence};
use crate::template::{GridTemplate, RIGHT_COLUMN_HEAD};

/// Decides whether `curr` gets a horizontal seam.
///
/// `prev_dominant` is the dominant pack of the preceding sequence entry, or
/// None for the first cell. `flags` must already hold the decisions for
/// every earlier cell.
pub fn needs_seam(
    seq: &Sequence,
    flags: &HorizontalFlags,
    curr: &AreaCell,
    prev_dominant: Option<u32>,
) -> bool {
    let page = curr.page_index;

    // The first cell of the document has nothing above it.
    if page == 0 && curr.area_id == 0 {
        return false;
    }

    if curr.area_id == RIGHT_COLUMN_HEAD {
        let differs = match seq.dominant_pack(page, 0) {
            Some(head) => head != curr.dominant_pack,
            None => prev_dominant != Some(curr.dominant_pack),
        };
        // Left-right linkage: a seam over area 0 is mirrored here.
        return differs || flags.is_set(page, 0);
    }

    prev_dominant != Some(curr.dominant_pack)
}

fn seam_mark(cell: &AreaCell, geometry: PageGeometry, template: &GridTemplate) -> Mark {
    let y = template.row_edge(cell.row, geometry.height);
    let seam_x = template.seam_x(geometry.width);
    let (x0, x1) = if cell.column == 0 {
        (template.side_margin, seam_x)
    } else {
        (seam_x, geometry.width - template.side_margin)
    };
    Mark::HorizontalSeam {
        page: cell.page_index,
        area_id: cell.area_id,
        from: (x0, y),
        to: (x1, y),
    }
}

fn circle_marks(cell: &AreaCell) -> impl Iterator<Item = Mark> + '_ {
    cell.is_mixed()
        .then(|| cell.secondary_occurrences())
        .into_iter()
        .flatten()
        .map(|occ| Mark::Circle {
            page: cell.page_index,
            label: occ.label,
            center: occ.center,
        })
}

/// Walks the whole sequence once, appending seams and circles to `marks`.
///
/// Returns the table of cells that received a seam.
pub fn horizontal_pass(
    seq: &Sequence,
    pages: &[PageGeometry],
    template: &GridTemplate,
    marks: &mut Vec<Mark>,
) -> HorizontalFlags {
    let mut flags = HorizontalFlags::new();
    let mut prev_dominant = None;

    for curr in seq {
        let geometry = pages.get(curr.page_index).copied();

        if needs_seam(seq, &flags, curr, prev_dominant) {
            flags.set(curr.page_index, curr.area_id);
            if let Some(geometry) = geometry {
                debug!(
                    page = curr.page_index,
                    area = curr.area_id,
                    pack = curr.dominant_pack,
                    "horizontal seam"
                );
                marks.push(seam_mark(curr, geometry, template));
            }
        }

        if geometry.is_some() {
            marks.extend(circle_marks(curr));
        }

        prev_dominant = Some(curr.dominant_pack);
    }

    flags
}
