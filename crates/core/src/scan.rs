//! Label scanning over positioned text runs.
//!
//! A panel label is three or four digits immediately followed by one marker
//! glyph. The marker set mixes Latin capitals with logic and Greek symbols
//! that the drawing software uses as visual check-marks. It is a heuristic
//! tuned to one template family and will miss labels drawn with any other
//! glyph (and may accept unrelated text such as part numbers ending in a
//! capital letter).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grid::{GridCell, PageGeometry, classify};
use crate::template::GridTemplate;
use crate::utils::{Point, Rect, rect_center};

/// Non-Latin marker glyphs accepted after a label's digits, in addition to
/// `A`..=`Z`.
pub const MARKER_SYMBOLS: [char; 3] = [
    '\u{039B}', // GREEK CAPITAL LETTER LAMDA
    '\u{2227}', // LOGICAL AND
    '\u{2228}', // LOGICAL OR
];

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    let symbols: String = MARKER_SYMBOLS.iter().collect();
    Regex::new(&format!(r"([0-9０-９]{{3,4}})[A-Z{symbols}]")).expect("label pattern compiles")
});

/// A run of text with its bounding box in top-left-origin page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub bbox: Rect,
}

impl TextRun {
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// One panel label found on a page, already placed in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelOccurrence {
    pub label: u32,
    pub pack_id: u32,
    pub center: Point,
    pub page_index: usize,
    pub area_id: u8,
    pub column: u8,
    pub row: u8,
}

/// Pack a label belongs to: its hundreds and above.
#[inline]
pub const fn pack_of(label: u32) -> u32 {
    label / 100
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

/// Finds the label in a run's text, ignoring spaces inside the run.
///
/// Only the first match is reported; a run carries at most one label.
pub fn find_label(text: &str) -> Option<u32> {
    let stripped: String = text.chars().filter(|&c| c != ' ').collect();
    let caps = LABEL_RE.captures(&stripped)?;
    caps.get(1)?
        .as_str()
        .chars()
        .try_fold(0u32, |acc, c| Some(acc * 10 + digit_value(c)?))
}

/// Scans one run, returning the label and the center of the run's box.
pub fn scan_run(run: &TextRun) -> Option<(u32, Point)> {
    find_label(&run.text).map(|label| (label, rect_center(run.bbox)))
}

/// Scans all runs of a page and classifies every hit into the grid.
pub fn scan_page(
    runs: &[TextRun],
    page_index: usize,
    geometry: PageGeometry,
    template: &GridTemplate,
) -> Vec<PanelOccurrence> {
    runs.iter()
        .filter_map(scan_run)
        .map(|(label, center)| {
            let GridCell {
                column,
                row,
                area_id,
            } = classify(center, geometry, template);
            PanelOccurrence {
                label,
                pack_id: pack_of(label),
                center,
                page_index,
                area_id,
                column,
                row,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_value_fullwidth() {
        assert_eq!(digit_value('７'), Some(7));
        assert_eq!(digit_value('x'), None);
    }

    #[test]
    fn test_marker_set() {
        assert!(LABEL_RE.is_match("101Λ"));
        assert!(LABEL_RE.is_match("101Q"));
        assert!(!LABEL_RE.is_match("101λ"));
        assert!(!LABEL_RE.is_match("101a"));
    }
}
