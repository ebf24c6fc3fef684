//! Pack grouping per grid area and the document-wide cell sequence.
//!
//! Every non-empty (page, area) pair becomes one [`AreaCell`]. The cells are
//! laid out in a single [`Sequence`] ordered by page, then area id; the
//! boundary passes walk this order linearly, so "previous cell" always means
//! the preceding sequence entry, even across a page break.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grid::GridCell;
use crate::scan::PanelOccurrence;
use crate::template::AREAS_PER_PAGE;

/// Distinct pack ids of one cell, ascending.
pub type PackSet = SmallVec<[u32; 4]>;

/// All labels of one grid area on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCell {
    pub page_index: usize,
    pub area_id: u8,
    pub row: u8,
    pub column: u8,
    pub dominant_pack: u32,
    pub pack_set: PackSet,
    pub occurrences: Vec<PanelOccurrence>,
}

impl AreaCell {
    /// Builds a cell from the occurrences of one area.
    ///
    /// Returns None when `occurrences` is empty.
    pub fn new(page_index: usize, area_id: u8, occurrences: Vec<PanelOccurrence>) -> Option<Self> {
        let pack_set: PackSet = occurrences
            .iter()
            .map(|o| o.pack_id)
            .sorted_unstable()
            .dedup()
            .collect();
        let dominant_pack = *pack_set.first()?;
        let GridCell { column, row, .. } = GridCell::from_area(area_id);
        Some(Self {
            page_index,
            area_id,
            row,
            column,
            dominant_pack,
            pack_set,
            occurrences,
        })
    }

    /// True when the cell mixes labels from more than one pack.
    pub fn is_mixed(&self) -> bool {
        self.pack_set.len() > 1
    }

    /// Occurrences whose pack is not the cell's dominant pack.
    pub fn secondary_occurrences(&self) -> impl Iterator<Item = &PanelOccurrence> {
        self.occurrences
            .iter()
            .filter(move |o| o.pack_id != self.dominant_pack)
    }
}

/// Document-wide cells ordered by (page, area id).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sequence {
    cells: Vec<AreaCell>,
    #[serde(skip)]
    index: FxHashMap<(usize, u8), usize>,
}

impl Sequence {
    /// Builds the sequence from per-page occurrence lists.
    ///
    /// `pages[i]` must hold the occurrences of page `i`; occurrences are
    /// partitioned by their own `area_id`.
    pub fn build(pages: Vec<Vec<PanelOccurrence>>) -> Self {
        let mut seq = Self::default();
        for (page_index, occurrences) in pages.into_iter().enumerate() {
            let mut areas: [Vec<PanelOccurrence>; AREAS_PER_PAGE as usize] = Default::default();
            for occ in occurrences {
                if let Some(slot) = areas.get_mut(occ.area_id as usize) {
                    slot.push(occ);
                }
            }
            for (area_id, occs) in areas.into_iter().enumerate() {
                if let Some(cell) = AreaCell::new(page_index, area_id as u8, occs) {
                    seq.push(cell);
                }
            }
        }
        seq
    }

    /// Builds a sequence from ready-made cells, restoring (page, area) order.
    ///
    /// A later cell for an already-present (page, area) pair is dropped.
    pub fn from_cells(mut cells: Vec<AreaCell>) -> Self {
        cells.sort_by_key(|c| (c.page_index, c.area_id));
        cells.dedup_by_key(|c| (c.page_index, c.area_id));
        let mut seq = Self::default();
        for cell in cells {
            seq.push(cell);
        }
        seq
    }

    fn push(&mut self, cell: AreaCell) {
        self.index
            .insert((cell.page_index, cell.area_id), self.cells.len());
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[AreaCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AreaCell> {
        self.cells.iter()
    }

    /// Cell at (`page_index`, `area_id`), if that area has any label.
    pub fn cell(&self, page_index: usize, area_id: u8) -> Option<&AreaCell> {
        self.index
            .get(&(page_index, area_id))
            .map(|&i| &self.cells[i])
    }

    /// Dominant pack of (`page_index`, `area_id`), if that area has any label.
    pub fn dominant_pack(&self, page_index: usize, area_id: u8) -> Option<u32> {
        self.cell(page_index, area_id).map(|c| c.dominant_pack)
    }

    /// True if (`page_index`, `area_id`) has at least one label.
    pub fn has_cell(&self, page_index: usize, area_id: u8) -> bool {
        self.index.contains_key(&(page_index, area_id))
    }

    /// Cells of one page, in area order.
    pub fn page_cells(&self, page_index: usize) -> impl Iterator<Item = &AreaCell> {
        self.cells
            .iter()
            .filter(move |c| c.page_index == page_index)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a AreaCell;
    type IntoIter = std::slice::Iter<'a, AreaCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
