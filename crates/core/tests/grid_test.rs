//! Tests for grid classification.

use panelmark_core::grid::{GridCell, PageGeometry, area_id, classify, column_of, row_of};
use panelmark_core::template::GridTemplate;

// Row height on this page is (500 - 75 - 25) / 4 = 100.
const PAGE: PageGeometry = PageGeometry::new(600.0, 500.0);

#[test]
fn test_area_id_layout() {
    assert_eq!(area_id(0, 0), 0);
    assert_eq!(area_id(0, 3), 3);
    assert_eq!(area_id(1, 0), 4);
    assert_eq!(area_id(1, 3), 7);
    assert_eq!(GridCell::from_area(6), GridCell::new(1, 2));
}

#[test]
fn test_classify_every_cell() {
    let t = GridTemplate::default();
    for column in 0..2u8 {
        for row in 0..4u8 {
            let x = if column == 0 { 150.0 } else { 450.0 };
            let y = 100.0 + f64::from(row) * 100.0;
            let cell = classify((x, y), PAGE, &t);
            assert_eq!(cell.column, column);
            assert_eq!(cell.row, row);
            assert_eq!(cell.area_id, column * 4 + row);
        }
    }
}

#[test]
fn test_header_region_is_row_zero() {
    let t = GridTemplate::default();
    assert_eq!(row_of(0.0, PAGE.height, &t), 0);
    assert_eq!(row_of(74.9, PAGE.height, &t), 0);
}

#[test]
fn test_row_boundaries_use_nominal_edges() {
    let t = GridTemplate::default();
    assert_eq!(row_of(174.9, PAGE.height, &t), 0);
    assert_eq!(row_of(175.0, PAGE.height, &t), 1);
    assert_eq!(row_of(374.9, PAGE.height, &t), 2);
    assert_eq!(row_of(375.0, PAGE.height, &t), 3);
}

#[test]
fn test_rows_clamp_past_grid() {
    let t = GridTemplate::default();
    // Footer and beyond stay in the last row.
    assert_eq!(row_of(490.0, PAGE.height, &t), 3);
    assert_eq!(row_of(5000.0, PAGE.height, &t), 3);
}

#[test]
fn test_short_page_has_single_row() {
    let t = GridTemplate::default();
    // Shorter than header plus footer: no usable row height.
    assert_eq!(row_of(90.0, 80.0, &t), 0);
    assert_eq!(row_of(10_000.0, 100.0, &t), 0);
}

#[test]
fn test_column_split_at_midline() {
    assert_eq!(column_of(299.9, PAGE.width), 0);
    assert_eq!(column_of(300.0, PAGE.width), 1);
    assert_eq!(column_of(-5.0, PAGE.width), 0);
    assert_eq!(column_of(900.0, PAGE.width), 1);
}
