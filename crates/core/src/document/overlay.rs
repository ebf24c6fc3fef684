//! Stroke primitives as PDF content-stream operations.

use lopdf::Object;
use lopdf::content::Operation;

use crate::compose::Stroke;
use crate::utils::Point;

/// Control-point distance for a quarter circle drawn as one cubic Bezier.
const KAPPA: f64 = 0.552_284_749_830_793_4;

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Resource name of the ExtGState carrying `opacity`.
pub(crate) fn gstate_name(opacity: f64) -> String {
    format!("PanelMarkGS{}", (opacity.clamp(0.0, 1.0) * 1000.0).round() as u32)
}

fn stroke_setup(stroke: &Stroke) -> Vec<Operation> {
    let (r, g, b) = stroke.color;
    vec![
        op("q", vec![]),
        op("gs", vec![Object::Name(gstate_name(stroke.opacity).into_bytes())]),
        op("RG", vec![real(r), real(g), real(b)]),
        op("w", vec![real(stroke.width)]),
    ]
}

/// Operations stroking a straight line. Points are in PDF user space.
pub(crate) fn line_ops(from: Point, to: Point, stroke: &Stroke) -> Vec<Operation> {
    let mut ops = stroke_setup(stroke);
    ops.push(op("m", vec![real(from.0), real(from.1)]));
    ops.push(op("l", vec![real(to.0), real(to.1)]));
    ops.push(op("S", vec![]));
    ops.push(op("Q", vec![]));
    ops
}

/// Operations stroking an unfilled circle. The center is in PDF user space.
pub(crate) fn circle_ops(center: Point, radius: f64, stroke: &Stroke) -> Vec<Operation> {
    let (cx, cy) = center;
    let k = radius * KAPPA;
    let mut ops = stroke_setup(stroke);
    ops.push(op("m", vec![real(cx + radius), real(cy)]));
    let quarters = [
        [(cx + radius, cy + k), (cx + k, cy + radius), (cx, cy + radius)],
        [(cx - k, cy + radius), (cx - radius, cy + k), (cx - radius, cy)],
        [(cx - radius, cy - k), (cx - k, cy - radius), (cx, cy - radius)],
        [(cx + k, cy - radius), (cx + radius, cy - k), (cx + radius, cy)],
    ];
    for [c1, c2, end] in quarters {
        ops.push(op(
            "c",
            vec![
                real(c1.0),
                real(c1.1),
                real(c2.0),
                real(c2.1),
                real(end.0),
                real(end.1),
            ],
        ));
    }
    ops.push(op("h", vec![]));
    ops.push(op("S", vec![]));
    ops.push(op("Q", vec![]));
    ops
}
