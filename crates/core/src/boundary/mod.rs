//! Boundary mark planning.
//!
//! Planning runs in two passes over the [`Sequence`]:
//!
//! 1. [`horizontal`] walks every cell in order, emitting horizontal seams
//!    where the dominant pack changes and circles around secondary labels.
//!    It records each seam in a [`HorizontalFlags`] table.
//! 2. [`vertical`] then runs page by page, reading that table to decide which
//!    rows get a seam between the two columns.
//!
//! The second pass must see the complete table for its page; reordering the
//! passes changes the output.

pub mod horizontal;
pub mod vertical;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::PageGeometry;
use crate::pack::Sequence;
use crate::template::GridTemplate;
use crate::utils::Point;

pub use horizontal::horizontal_pass;
pub use vertical::{active_rows, vertical_pass};

/// A single overlay primitive in top-left-origin page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mark {
    /// Seam above a cell where the dominant pack changes.
    HorizontalSeam {
        page: usize,
        area_id: u8,
        from: Point,
        to: Point,
    },
    /// Seam between the two columns alongside a row.
    VerticalSeam {
        page: usize,
        row: u8,
        from: Point,
        to: Point,
    },
    /// Short vertical tick marking the end of the seam on a page.
    Tick {
        page: usize,
        row: u8,
        from: Point,
        to: Point,
    },
    /// Circle around a label whose pack differs from its cell's dominant pack.
    Circle {
        page: usize,
        label: u32,
        center: Point,
    },
}

impl Mark {
    pub fn page(&self) -> usize {
        match *self {
            Mark::HorizontalSeam { page, .. }
            | Mark::VerticalSeam { page, .. }
            | Mark::Tick { page, .. }
            | Mark::Circle { page, .. } => page,
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Mark::Circle { .. })
    }
}

/// Cells that received a horizontal seam, keyed by (page, area id).
///
/// Written by the horizontal pass only and handed read-only to the
/// vertical pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalFlags {
    cells: BTreeSet<(usize, u8)>,
}

impl HorizontalFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, page: usize, area_id: u8) {
        self.cells.insert((page, area_id));
    }

    pub fn is_set(&self, page: usize, area_id: u8) -> bool {
        self.cells.contains(&(page, area_id))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.cells.iter().copied()
    }
}

/// Every mark planned for a document, plus the seam table that produced the
/// vertical pass's input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkPlan {
    pub marks: Vec<Mark>,
    pub flags: HorizontalFlags,
}

impl MarkPlan {
    /// Marks that land on `page`, in planning order.
    pub fn page_marks(&self, page: usize) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(move |m| m.page() == page)
    }

    pub fn circles(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(|m| m.is_circle())
    }
}

/// Runs both passes over `seq`.
///
/// `pages[i]` is the geometry of page `i`. Cells on pages without geometry
/// still take part in the seam decisions but produce no marks.
pub fn plan_marks(seq: &Sequence, pages: &[PageGeometry], template: &GridTemplate) -> MarkPlan {
    let mut marks = Vec::new();
    let flags = horizontal_pass(seq, pages, template, &mut marks);
    for (page, geometry) in pages.iter().enumerate() {
        vertical_pass(seq, &flags, page, *geometry, template, &mut marks);
    }
    MarkPlan { marks, flags }
}
