//! Replaying a mark plan onto a drawing surface.

use crate::boundary::{Mark, MarkPlan};
use crate::error::Result;
use crate::template::{MarkStyle, Rgb};
use crate::utils::Point;

/// Stroke parameters for a single primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
}

impl Stroke {
    pub fn line(style: &MarkStyle) -> Self {
        Self {
            color: style.color,
            width: style.line_width,
            opacity: style.line_opacity,
        }
    }

    pub fn circle(style: &MarkStyle) -> Self {
        Self {
            color: style.color,
            width: style.circle_width,
            opacity: style.circle_opacity,
        }
    }
}

/// A surface that can stroke lines and circles onto pages.
///
/// Coordinates are in top-left-origin page space, as produced by the
/// planner. Drawing never removes existing page content.
pub trait MarkCanvas {
    fn draw_line(&mut self, page: usize, from: Point, to: Point, stroke: &Stroke) -> Result<()>;

    fn draw_circle(&mut self, page: usize, center: Point, radius: f64, stroke: &Stroke)
    -> Result<()>;
}

/// Draws every mark of `plan` onto `canvas` in plan order.
pub fn compose<C: MarkCanvas + ?Sized>(
    plan: &MarkPlan,
    style: &MarkStyle,
    canvas: &mut C,
) -> Result<()> {
    let line = Stroke::line(style);
    let circle = Stroke::circle(style);

    for mark in &plan.marks {
        match *mark {
            Mark::HorizontalSeam { page, from, to, .. }
            | Mark::VerticalSeam { page, from, to, .. }
            | Mark::Tick { page, from, to, .. } => canvas.draw_line(page, from, to, &line)?,
            Mark::Circle { page, center, .. } => {
                canvas.draw_circle(page, center, style.circle_radius, &circle)?
            }
        }
    }
    Ok(())
}
