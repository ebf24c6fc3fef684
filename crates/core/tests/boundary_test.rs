//! Tests for the two boundary passes.
//!
//! Every page here is 600 x 500, so rows are 100 units tall starting at
//! y = 75 and the calibrated row edges are 82, 152, 276 and 344. The vertical
//! seam sits at x = 304 and the grid ends at y = 475.

use panelmark_core::boundary::{Mark, MarkPlan, active_rows, horizontal::needs_seam, plan_marks};
use panelmark_core::grid::PageGeometry;
use panelmark_core::pack::Sequence;
use panelmark_core::scan::{TextRun, scan_page};
use panelmark_core::template::GridTemplate;

const PAGE: PageGeometry = PageGeometry::new(600.0, 500.0);

/// Center of `area_id` on [`PAGE`].
fn area_center(area_id: u8) -> (f64, f64) {
    let x = if area_id < 4 { 150.0 } else { 450.0 };
    let y = 100.0 + f64::from(area_id % 4) * 100.0;
    (x, y)
}

/// Builds a sequence from `(label, area_id)` pairs per page.
fn sequence(pages: &[&[(&str, u8)]]) -> Sequence {
    let template = GridTemplate::default();
    let occurrences = pages
        .iter()
        .enumerate()
        .map(|(page_index, labels)| {
            let runs: Vec<TextRun> = labels
                .iter()
                .map(|&(text, area)| {
                    let (x, y) = area_center(area);
                    TextRun::new(text, (x - 10.0, y - 5.0, x + 10.0, y + 5.0))
                })
                .collect();
            scan_page(&runs, page_index, PAGE, &template)
        })
        .collect();
    Sequence::build(occurrences)
}

fn plan_pages(pages: &[&[(&str, u8)]]) -> (Sequence, MarkPlan) {
    let seq = sequence(pages);
    let geometries = vec![PAGE; pages.len()];
    let plan = plan_marks(&seq, &geometries, &GridTemplate::default());
    (seq, plan)
}

fn horizontal_seams(plan: &MarkPlan) -> Vec<(usize, u8)> {
    plan.marks
        .iter()
        .filter_map(|m| match *m {
            Mark::HorizontalSeam { page, area_id, .. } => Some((page, area_id)),
            _ => None,
        })
        .collect()
}

fn vertical_rows(plan: &MarkPlan, page_index: usize) -> Vec<u8> {
    plan.marks
        .iter()
        .filter_map(|m| match *m {
            Mark::VerticalSeam { page, row, .. } if page == page_index => Some(row),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Horizontal pass
// ============================================================================

#[test]
fn test_first_cell_never_gets_a_seam() {
    let (seq, plan) = plan_pages(&[&[("701A", 0)]]);
    assert!(plan.marks.is_empty());
    assert!(plan.flags.is_empty());

    // Even against a predecessor with a different pack.
    let first = seq.cell(0, 0).unwrap();
    assert!(!needs_seam(&seq, &plan.flags, first, Some(3)));
}

#[test]
fn test_seam_on_pack_change_down_the_column() {
    let (_, plan) = plan_pages(&[&[("101A", 0), ("102A", 1), ("301A", 2)]]);
    assert_eq!(horizontal_seams(&plan), vec![(0, 2)]);
    assert_eq!(
        plan.marks[0],
        Mark::HorizontalSeam {
            page: 0,
            area_id: 2,
            from: (10.0, 276.0),
            to: (304.0, 276.0),
        }
    );
}

#[test]
fn test_right_column_seam_spans_to_margin() {
    let (_, plan) = plan_pages(&[&[("101A", 0), ("101A", 4), ("301A", 5)]]);
    assert_eq!(horizontal_seams(&plan), vec![(0, 5)]);
    assert!(plan.marks.contains(&Mark::HorizontalSeam {
        page: 0,
        area_id: 5,
        from: (304.0, 152.0),
        to: (590.0, 152.0),
    }));
}

#[test]
fn test_previous_cell_crosses_page_breaks() {
    let (_, same) = plan_pages(&[&[("101A", 0)], &[("150A", 0)]]);
    assert!(horizontal_seams(&same).is_empty());

    let (_, changed) = plan_pages(&[&[("101A", 0)], &[("201A", 0)]]);
    assert_eq!(horizontal_seams(&changed), vec![(1, 0)]);
    assert_eq!(changed.flags.iter().collect::<Vec<_>>(), vec![(1, 0)]);
}

#[test]
fn test_area_four_compares_with_area_zero() {
    // Area 3 precedes area 4 in the sequence, but area 0 decides.
    let (_, plan) = plan_pages(&[&[("101A", 0), ("301A", 3), ("101A", 4)]]);
    assert_eq!(horizontal_seams(&plan), vec![(0, 3)]);

    let (_, plan) = plan_pages(&[&[("101A", 0), ("201A", 3), ("201A", 4)]]);
    assert_eq!(horizontal_seams(&plan), vec![(0, 3), (0, 4)]);
}

#[test]
fn test_area_four_falls_back_to_previous_cell() {
    let (_, same) = plan_pages(&[&[("101A", 0), ("301A", 3)], &[("301A", 4)]]);
    assert_eq!(horizontal_seams(&same), vec![(0, 3)]);

    let (_, changed) = plan_pages(&[&[("101A", 0), ("301A", 3)], &[("401A", 4)]]);
    assert_eq!(horizontal_seams(&changed), vec![(0, 3), (1, 4)]);
}

#[test]
fn test_area_zero_seam_is_mirrored_on_area_four() {
    let (_, plan) = plan_pages(&[&[("101A", 0)], &[("201A", 0), ("202A", 4)]]);
    assert_eq!(horizontal_seams(&plan), vec![(1, 0), (1, 4)]);
}

#[test]
fn test_circles_only_in_mixed_cells() {
    let (_, single) = plan_pages(&[&[("101Λ", 0), ("102Λ", 0)]]);
    assert_eq!(single.circles().count(), 0);

    let (_, mixed) = plan_pages(&[&[("101Λ", 0), ("205Λ", 0)]]);
    let circles: Vec<&Mark> = mixed.circles().collect();
    assert_eq!(circles.len(), 1);
    assert_eq!(
        *circles[0],
        Mark::Circle {
            page: 0,
            label: 205,
            center: (150.0, 100.0),
        }
    );
}

// ============================================================================
// Vertical pass
// ============================================================================

#[test]
fn test_diagonal_merge_suppresses_row() {
    let (seq, plan) = plan_pages(&[&[("301A", 0), ("501A", 1), ("501A", 4)]]);
    assert!(plan.flags.is_set(0, 1));
    assert_eq!(active_rows(&seq, &plan.flags, 0), [true, false, false, false]);
    assert_eq!(vertical_rows(&plan, 0), vec![0]);
}

#[test]
fn test_no_diagonal_merge_when_upper_right_differs() {
    let (seq, plan) = plan_pages(&[&[("301A", 0), ("501A", 1), ("601A", 4)]]);
    assert_eq!(active_rows(&seq, &plan.flags, 0), [true, true, true, true]);
}

#[test]
fn test_consecutive_packs_suppress_row_zero() {
    let (seq, plan) = plan_pages(&[&[("1201A", 0), ("1301A", 4)]]);
    assert!(plan.flags.is_set(0, 4));
    assert!(!active_rows(&seq, &plan.flags, 0)[0]);
    assert!(vertical_rows(&plan, 0).is_empty());

    let (seq, plan) = plan_pages(&[&[("1201A", 0), ("2001A", 4)]]);
    assert!(active_rows(&seq, &plan.flags, 0)[0]);
}

#[test]
fn test_consecutive_packs_below_row_zero_keep_their_seam() {
    let (seq, plan) = plan_pages(&[&[("101A", 0), ("1201A", 1), ("1301A", 5)]]);
    assert!(plan.flags.is_set(0, 1));
    assert!(plan.flags.is_set(0, 5));
    assert_eq!(active_rows(&seq, &plan.flags, 0), [false, true, true, true]);
    assert!(vertical_rows(&plan, 0).contains(&1));
}

#[test]
fn test_equal_packs_never_get_a_seam() {
    let (seq, plan) = plan_pages(&[&[("101A", 0), ("301A", 1), ("301A", 5)]]);
    // Row 1 carries a horizontal seam but both columns share a pack.
    assert!(plan.flags.is_set(0, 1));
    assert!(!active_rows(&seq, &plan.flags, 0)[1]);
}

#[test]
fn test_activation_propagates_down() {
    let (seq, plan) = plan_pages(&[&[
        ("101A", 0),
        ("501A", 4),
        ("101A", 1),
        ("101A", 2),
        ("101A", 3),
    ]]);
    assert_eq!(active_rows(&seq, &plan.flags, 0), [true, true, true, true]);
    assert_eq!(vertical_rows(&plan, 0), vec![0, 1, 2, 3]);
}

#[test]
fn test_row_one_forced_by_seams_on_areas_two_and_four() {
    let (seq, plan) = plan_pages(&[&[("201A", 0), ("501A", 2), ("301A", 4)]]);
    assert!(plan.flags.is_set(0, 2));
    assert!(plan.flags.is_set(0, 4));
    assert!(!plan.flags.is_set(0, 5));
    assert_eq!(active_rows(&seq, &plan.flags, 0), [false, true, true, true]);

    assert!(plan.marks.contains(&Mark::VerticalSeam {
        page: 0,
        row: 1,
        from: (304.0, 149.0),
        to: (304.0, 279.0),
    }));
    // The last row runs down to the footer.
    assert!(plan.marks.contains(&Mark::VerticalSeam {
        page: 0,
        row: 3,
        from: (304.0, 341.0),
        to: (304.0, 475.0),
    }));
}

#[test]
fn test_row_one_not_forced_when_area_five_has_a_seam() {
    let (seq, plan) = plan_pages(&[&[
        ("201A", 0),
        ("501A", 2),
        ("301A", 4),
        ("701A", 5),
    ]]);
    assert!(plan.flags.is_set(0, 5));
    // Row 1 is still activated by the area 5 seam itself.
    assert!(active_rows(&seq, &plan.flags, 0)[1]);

    let (seq, plan) = plan_pages(&[&[("201A", 0), ("301A", 4)]]);
    assert!(!plan.flags.is_set(0, 2));
    assert_eq!(active_rows(&seq, &plan.flags, 0), [false; 4]);
}

#[test]
fn test_isolated_row_gets_tick_and_stops() {
    let (seq, plan) = plan_pages(&[&[("101A", 0), ("501A", 4)]]);
    // Propagation would carry on through every row.
    assert_eq!(active_rows(&seq, &plan.flags, 0), [true; 4]);

    let vertical: Vec<&Mark> = plan
        .marks
        .iter()
        .filter(|m| matches!(m, Mark::VerticalSeam { .. } | Mark::Tick { .. }))
        .collect();
    assert_eq!(
        vertical,
        vec![
            &Mark::VerticalSeam {
                page: 0,
                row: 0,
                from: (304.0, 79.0),
                to: (304.0, 155.0),
            },
            &Mark::Tick {
                page: 0,
                row: 1,
                from: (304.0, 149.0),
                to: (304.0, 155.0),
            },
        ]
    );
}

#[test]
fn test_pages_decide_independently() {
    // Page 1 continues page 0's last pack, so it has no seam of its own and
    // does not inherit page 0's active rows.
    let (_, plan) = plan_pages(&[
        &[("101A", 0), ("501A", 4), ("101A", 1), ("101A", 2), ("101A", 3)],
        &[("501A", 1)],
    ]);
    assert_eq!(vertical_rows(&plan, 0), vec![0, 1, 2, 3]);
    assert!(vertical_rows(&plan, 1).is_empty());
    assert_eq!(plan.page_marks(1).count(), 0);
    assert_eq!(plan.page_marks(0).count(), plan.marks.len());
}

#[test]
fn test_cells_without_geometry_set_flags_only() {
    let seq = sequence(&[&[("101A", 0)], &[("201A", 0), ("305A", 0)]]);
    let plan = plan_marks(&seq, &[PAGE], &GridTemplate::default());
    assert!(plan.flags.is_set(1, 0));
    assert!(plan.marks.iter().all(|m| m.page() == 0));
}

// ============================================================================
// End to end over text runs
// ============================================================================

#[test]
fn test_single_page_two_labels() {
    let (_, plan) = plan_pages(&[&[("101Λ", 0), ("205Λ", 4)]]);
    assert_eq!(plan.circles().count(), 0);
    assert_eq!(
        plan.marks,
        vec![Mark::HorizontalSeam {
            page: 0,
            area_id: 4,
            from: (304.0, 82.0),
            to: (590.0, 82.0),
        }]
    );
}
