use std::fmt::Write;

use crate::model::{EdgeKind, EdgeSignature, Rect};

pub type Point = (f32, f32);

/// Depth of the tab head, as a fraction of the edge length.
pub const TAB_DEPTH: f32 = 0.25;
/// Height of the neck where the tab leaves the edge line.
pub const TAB_NECK: f32 = 0.05;
/// Head control points overshoot the depth to round the knob.
pub const TAB_HEAD_OVERSHOOT: f32 = 1.2;
pub const FLATTEN_STEPS_DEFAULT: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
    Close,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PiecePath {
    commands: Vec<PathCommand>,
}

impl PiecePath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Samples every cubic into `steps` line segments.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(self.commands.len() * steps);
        let mut cursor = (0.0, 0.0);
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                    points.push(p);
                    cursor = p;
                }
                PathCommand::CubicTo(c1, c2, end) => {
                    for i in 1..=steps {
                        let t = i as f32 / steps as f32;
                        points.push(cubic_point(cursor, c1, c2, end, t));
                    }
                    cursor = end;
                }
                PathCommand::Close => {}
            }
        }
        points
    }

    /// Even-odd point test against the flattened outline.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let polygon = self.flatten(FLATTEN_STEPS_DEFAULT);
        let mut inside = false;
        let mut j = polygon.len().wrapping_sub(1);
        for i in 0..polygon.len() {
            let (xi, yi) = polygon[i];
            let (xj, yj) = polygon[j];
            if (yi > y) != (yj > y) {
                let cross_x = xi + (y - yi) * (xj - xi) / (yj - yi);
                if x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = match *command {
                PathCommand::MoveTo((x, y)) => write!(out, "M {} {}", fmt_f32(x), fmt_f32(y)),
                PathCommand::LineTo((x, y)) => write!(out, "L {} {}", fmt_f32(x), fmt_f32(y)),
                PathCommand::CubicTo(c1, c2, end) => write!(
                    out,
                    "C {} {} {} {} {} {}",
                    fmt_f32(c1.0),
                    fmt_f32(c1.1),
                    fmt_f32(c2.0),
                    fmt_f32(c2.1),
                    fmt_f32(end.0),
                    fmt_f32(end.1)
                ),
                PathCommand::Close => write!(out, "Z"),
            };
        }
        out
    }
}

pub fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}

pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    let uuu = uu * u;
    let ttt = tt * t;
    (
        uuu * p0.0 + 3.0 * uu * t * p1.0 + 3.0 * u * tt * p2.0 + ttt * p3.0,
        uuu * p0.1 + 3.0 * uu * t * p1.1 + 3.0 * u * tt * p2.1 + ttt * p3.1,
    )
}

/// Closed outline of a piece whose cell starts at (`x`, `y`), traced
/// clockwise from the top-left corner.
pub fn piece_path(x: f32, y: f32, w: f32, h: f32, edges: &EdgeSignature) -> PiecePath {
    let top_left = (x, y);
    let top_right = (x + w, y);
    let bottom_right = (x + w, y + h);
    let bottom_left = (x, y + h);
    let mut commands = Vec::with_capacity(18);
    commands.push(PathCommand::MoveTo(top_left));
    push_edge(&mut commands, top_left, top_right, edges.top);
    push_edge(&mut commands, top_right, bottom_right, edges.right);
    push_edge(&mut commands, bottom_right, bottom_left, edges.bottom);
    push_edge(&mut commands, bottom_left, top_left, edges.left);
    commands.push(PathCommand::Close);
    PiecePath { commands }
}

fn push_edge(commands: &mut Vec<PathCommand>, from: Point, to: Point, kind: EdgeKind) {
    if kind.is_flat() {
        commands.push(PathCommand::LineTo(to));
        return;
    }
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    // (along, out) in edge-length units; out is left of the travel direction.
    let at = |along: f32, out: f32| {
        (
            from.0 + dx * along + dy * out,
            from.1 + dy * along - dx * out,
        )
    };
    let t = kind.sign();
    let a = TAB_DEPTH * t;
    let neck = TAB_NECK * t;
    let third = 1.0 / 3.0;
    let two_thirds = 2.0 / 3.0;
    commands.push(PathCommand::CubicTo(
        at(0.20, 0.0),
        at(0.25, 0.0),
        at(third, neck),
    ));
    commands.push(PathCommand::CubicTo(
        at(third + 0.05, a * TAB_HEAD_OVERSHOOT),
        at(0.5 - 0.05, a),
        at(0.5, a),
    ));
    commands.push(PathCommand::CubicTo(
        at(0.5 + 0.05, a),
        at(two_thirds - 0.05, a * TAB_HEAD_OVERSHOOT),
        at(two_thirds, neck),
    ));
    commands.push(PathCommand::CubicTo(at(0.75, 0.0), at(0.80, 0.0), to));
}

/// World-space box used by the default hit test: the cell grown by `bleed` on every side.
pub fn hit_box(x: f32, y: f32, w: f32, h: f32, bleed: f32) -> Rect {
    Rect::new(x, y, w, h).inflate(bleed, bleed)
}
